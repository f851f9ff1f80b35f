//! Human-readable duration formatting for status cards and alerts.

use std::time::Duration;

/// Format an optional duration for display, using an em dash when the value
/// is not yet known (no frames finished, ETA undefined, and so on).
pub fn human_duration(d: Option<Duration>) -> String {
    match d {
        Some(d) => human_secs(d.as_secs()),
        None => "—".to_string(),
    }
}

/// Format whole seconds as `1h 02m 03s`, `5m 03s`, or `42s`.
pub fn human_secs(total: u64) -> String {
    let h = total / 3600;
    let m = (total % 3600) / 60;
    let s = total % 60;
    if h > 0 {
        format!("{h}h {m:02}m {s:02}s")
    } else if m > 0 {
        format!("{m}m {s:02}s")
    } else {
        format!("{s}s")
    }
}
