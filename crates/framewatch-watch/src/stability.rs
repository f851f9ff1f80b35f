//! Write-stability probe for the final output file.
//!
//! Existence alone is not completion: the renderer creates the last file
//! and then streams pixels into it for a while. The probe watches the file
//! size across ticks and calls the file stable once the size has held still
//! for a configured quiet period. Any size change, or any failure to stat
//! the file, restarts the clock.

use std::path::PathBuf;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct StabilityProbe {
    target: PathBuf,
    quiet_for: Duration,
    last_size: Option<u64>,
    last_change: Option<Instant>,
}

impl StabilityProbe {
    pub fn new(target: PathBuf, quiet_for: Duration) -> Self {
        Self {
            target,
            quiet_for,
            last_size: None,
            last_change: None,
        }
    }

    /// Sample the target once. Returns true when the size has held still
    /// for at least the quiet period.
    pub fn check(&mut self, now: Instant) -> bool {
        let size = std::fs::metadata(&self.target).ok().map(|meta| meta.len());
        match (size, self.last_size) {
            (Some(current), Some(previous)) if current == previous => match self.last_change {
                Some(since) => now.duration_since(since) >= self.quiet_for,
                None => false,
            },
            _ => {
                self.last_size = size;
                self.last_change = Some(now);
                false
            }
        }
    }
}
