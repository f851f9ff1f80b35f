//! Abandonment detection.
//!
//! There is no cancel signal from the renderer, so a canceled or crashed
//! render shows up only as silence: frames stop landing. A job counts as
//! abandoned once the gap since the last new frame exceeds a threshold
//! scaled to the job's own pace, with a floor that keeps slow renders from
//! being shot down early.

use std::time::Duration;

use framewatch_core::IdleConfig;

#[derive(Debug, Clone, Copy)]
pub struct IdlePolicy {
    floor: Duration,
    avg_factor: f64,
}

impl IdlePolicy {
    pub fn new(floor: Duration, avg_factor: f64) -> Self {
        Self { floor, avg_factor }
    }

    pub fn from_config(config: &IdleConfig) -> Self {
        Self::new(config.floor(), config.avg_factor)
    }

    /// Idle gap beyond which the job is presumed dead.
    ///
    /// The larger of the floor and `avg_factor` times the average frame
    /// time. Before any average exists the floor stands alone.
    pub fn threshold(&self, average: Option<Duration>) -> Duration {
        match average {
            Some(avg) if avg > Duration::ZERO => self.floor.max(avg.mul_f64(self.avg_factor)),
            _ => self.floor,
        }
    }

    pub fn is_abandoned(&self, idle: Duration, average: Option<Duration>) -> bool {
        idle >= self.threshold(average)
    }
}
