//! Logging infrastructure for framewatch.
//!
//! Structured logging via the `tracing` ecosystem: JSON lines to a daily
//! rolling file under `~/.framewatch/logs/` plus a compact human-readable
//! layer on stderr. The watcher also narrates frame progress to its log at
//! debug level, which is the first place to look when a job cancels
//! unexpectedly.
//!
//! ## Example
//!
//! ```no_run
//! use framewatch_core::logging;
//!
//! // Initialize logging (call once at startup)
//! let _guard = logging::init_logging(None, false).expect("logging init");
//!
//! tracing::info!(job = "shot_040", "watch armed");
//! ```

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

use crate::error::{Result, WatchError};

/// Guard that must be held to ensure log flushing on shutdown.
///
/// Dropping the guard flushes pending entries; keep it alive for the
/// lifetime of the process.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the framewatch logging system.
///
/// Sets up file logging (JSON lines, daily rolling) and console logging to
/// stderr. `log_dir` defaults to `~/.framewatch/logs/`; `verbose` switches
/// the default level from INFO to DEBUG. `RUST_LOG` overrides both.
///
/// Returns a [`LogGuard`] that must be held for the application lifetime.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    std::fs::create_dir_all(&log_dir).map_err(|e| WatchError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "framewatch.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("framewatch={default_level}")));

    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json()
        .with_span_events(FmtSpan::CLOSE)
        .with_current_span(true);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for tests.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Default log directory (`~/.framewatch/logs/`).
pub fn default_log_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| WatchError::Internal {
        message: "home directory could not be determined".into(),
    })?;
    Ok(home.join(".framewatch").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_dir_under_home() {
        let dir = default_log_dir().unwrap();
        assert!(dir.ends_with(".framewatch/logs"));
    }

    #[test]
    fn test_init_test_logging() {
        // Repeated calls must not panic
        init_test_logging();
        init_test_logging();
    }
}
