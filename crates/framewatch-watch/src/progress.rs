//! Frame census and per-frame timing.
//!
//! The renderer is a black box; the only evidence of progress is which
//! output files exist on disk. A frame counts as completed when its file
//! exists, is non-empty, and was modified after the watch started, so stale
//! frames from an earlier run in the same directory never inflate the count.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Utc};
use tracing::debug;

/// Count how many of `paths` look completed relative to `started_at`.
pub fn count_completed(paths: &[PathBuf], started_at: SystemTime) -> usize {
    paths
        .iter()
        .filter(|path| is_completed(path, started_at))
        .count()
}

fn is_completed(path: &Path, started_at: SystemTime) -> bool {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            // Absent files are the normal case while rendering; anything
            // else (permissions, transient NFS errors) counts as pending.
            if e.kind() != std::io::ErrorKind::NotFound {
                debug!(path = %path.display(), error = %e, "stat failed; frame counted as pending");
            }
            return false;
        }
    };
    if meta.len() == 0 {
        return false;
    }
    match meta.modified() {
        Ok(mtime) => {
            if mtime < started_at {
                debug!(
                    path = %path.display(),
                    mtime = %DateTime::<Utc>::from(mtime).to_rfc3339(),
                    "file predates this watch; ignoring"
                );
                return false;
            }
            true
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "no mtime available; frame counted as pending");
            false
        }
    }
}

/// Tracks when frames land and derives per-frame timing from the gaps.
///
/// The tracked count only ever rises. Each tick where it rises records one
/// inter-frame duration, measured from the previous rise, so a burst of
/// several frames in one tick contributes a single sample.
#[derive(Debug, Default)]
pub struct FrameTimer {
    seen: usize,
    durations: Vec<Duration>,
    last_frame_at: Option<Instant>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the latest census. Returns true when the count advanced.
    pub fn observe(&mut self, count: usize, now: Instant) -> bool {
        if count <= self.seen {
            return false;
        }
        if let Some(prev) = self.last_frame_at {
            self.durations.push(now.duration_since(prev));
        }
        self.last_frame_at = Some(now);
        self.seen = count;
        true
    }

    /// Highest census observed so far.
    pub fn seen(&self) -> usize {
        self.seen
    }

    /// True once at least one frame has ever been observed.
    pub fn started(&self) -> bool {
        self.last_frame_at.is_some()
    }

    /// Instant of the most recent census advance.
    pub fn idle_since(&self) -> Option<Instant> {
        self.last_frame_at
    }

    /// Duration of the most recent inter-frame gap.
    pub fn last_duration(&self) -> Option<Duration> {
        self.durations.last().copied()
    }

    /// Mean inter-frame duration over the whole job.
    pub fn average(&self) -> Option<Duration> {
        if self.durations.is_empty() {
            return None;
        }
        let total: Duration = self.durations.iter().sum();
        Some(total / self.durations.len() as u32)
    }

    /// Projected time to finish `remaining` frames at the average pace.
    pub fn eta(&self, remaining: usize) -> Option<Duration> {
        self.average().map(|avg| avg * remaining as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_census_is_monotonic_as_files_land() {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = (1..=3)
            .map(|n| dir.path().join(format!("f_{n:04}.png")))
            .collect();
        // A start stamp safely in the past sidesteps mtime granularity.
        let started = SystemTime::now() - secs(60);

        let mut counts = vec![count_completed(&paths, started)];
        for path in &paths {
            fs::write(path, b"pixels").unwrap();
            counts.push(count_completed(&paths, started));
        }
        assert_eq!(counts, vec![0, 1, 2, 3]);
        assert!(counts.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_empty_file_is_pending() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f_0001.png");
        fs::write(&path, b"").unwrap();
        let started = SystemTime::now() - secs(60);
        assert_eq!(count_completed(&[path], started), 0);
    }

    #[test]
    fn test_stale_file_is_pending() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("f_0001.png");
        fs::write(&path, b"pixels").unwrap();
        // Watch "starts" in the future, so the file predates it.
        let started = SystemTime::now() + secs(3600);
        assert_eq!(count_completed(&[path], started), 0);
    }

    #[test]
    fn test_average_over_three_gaps() {
        let base = Instant::now();
        let mut timer = FrameTimer::new();
        timer.observe(1, base);
        timer.observe(2, base + secs(2));
        timer.observe(3, base + secs(6));
        timer.observe(4, base + secs(12));
        assert_eq!(timer.last_duration(), Some(secs(6)));
        assert_eq!(timer.average(), Some(secs(4)));
    }

    #[test]
    fn test_eta_is_average_times_remaining() {
        let base = Instant::now();
        let mut timer = FrameTimer::new();
        timer.observe(1, base);
        timer.observe(2, base + secs(2));
        timer.observe(3, base + secs(6));
        timer.observe(4, base + secs(12));
        assert_eq!(timer.eta(3), Some(secs(12)));
        assert_eq!(timer.eta(0), Some(secs(0)));
    }

    #[test]
    fn test_no_average_before_second_frame() {
        let base = Instant::now();
        let mut timer = FrameTimer::new();
        assert!(!timer.started());
        assert_eq!(timer.average(), None);
        timer.observe(1, base);
        assert!(timer.started());
        assert_eq!(timer.average(), None);
        assert_eq!(timer.eta(10), None);
    }

    #[test]
    fn test_burst_records_single_sample() {
        let base = Instant::now();
        let mut timer = FrameTimer::new();
        timer.observe(1, base);
        timer.observe(4, base + secs(6));
        assert_eq!(timer.seen(), 4);
        assert_eq!(timer.durations.len(), 1);
        assert_eq!(timer.average(), Some(secs(6)));
    }

    #[test]
    fn test_census_never_regresses() {
        let base = Instant::now();
        let mut timer = FrameTimer::new();
        timer.observe(3, base);
        assert!(!timer.observe(2, base + secs(1)));
        assert_eq!(timer.seen(), 3);
        assert_eq!(timer.idle_since(), Some(base));
    }
}
