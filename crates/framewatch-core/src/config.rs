//! Configuration for framewatch.
//!
//! Configuration lives in a YAML file (default `~/.framewatch/config.yaml`)
//! and is merged with defaults, so a partial file only overrides the keys it
//! names. Values are validated after load; out-of-range timings are rejected
//! with the allowed range in the message rather than silently clamped.
//!
//! ## Example
//!
//! ```no_run
//! use framewatch_core::Config;
//!
//! fn main() -> framewatch_core::Result<()> {
//!     let config = Config::load(None)?;
//!     println!("polling every {:?}", config.timing.check_interval());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, WatchError};

/// Default polling cadence in seconds.
pub const DEFAULT_CHECK_INTERVAL_SECS: f64 = 1.0;
/// Minimum polling cadence in seconds.
pub const MIN_CHECK_INTERVAL_SECS: f64 = 0.1;
/// Maximum polling cadence in seconds.
pub const MAX_CHECK_INTERVAL_SECS: f64 = 5.0;

/// Default quiet period before the last frame counts as settled, in seconds.
pub const DEFAULT_STABLE_DELAY_SECS: f64 = 1.5;
/// Minimum stable delay in seconds.
pub const MIN_STABLE_DELAY_SECS: f64 = 0.5;
/// Maximum stable delay in seconds.
pub const MAX_STABLE_DELAY_SECS: f64 = 10.0;

/// Default minimum spacing between Discord progress edits, in seconds.
pub const DEFAULT_UPDATE_INTERVAL_SECS: f64 = 5.0;
/// Minimum progress edit spacing in seconds.
pub const MIN_UPDATE_INTERVAL_SECS: f64 = 2.0;
/// Maximum progress edit spacing in seconds.
pub const MAX_UPDATE_INTERVAL_SECS: f64 = 120.0;

/// Default idle floor before a stalled job is declared canceled, in seconds.
pub const DEFAULT_IDLE_FLOOR_SECS: f64 = 120.0;
/// Default multiplier applied to the average frame time for the idle threshold.
pub const DEFAULT_IDLE_AVG_FACTOR: f64 = 5.0;

/// Default webhook username shown on posted messages.
pub const DEFAULT_USERNAME: &str = "Render Watcher";

/// Top-level framewatch configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Discord webhook reporting
    pub discord: DiscordConfig,

    /// Local sound and toast notifications
    pub desktop: DesktopConfig,

    /// Polling, stability, and throttle timings
    pub timing: TimingConfig,

    /// Adaptive idle cancellation thresholds
    pub idle: IdleConfig,
}

/// Discord webhook settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    /// Webhook URL; empty disables posting until one is provided
    pub webhook_url: String,

    /// Username override shown on posted messages
    pub username: String,

    /// Avatar URL override for posted messages
    pub avatar_url: Option<String>,

    /// Whether Discord reporting is enabled at all
    pub enabled: bool,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            username: DEFAULT_USERNAME.to_string(),
            avatar_url: None,
            enabled: true,
        }
    }
}

impl DiscordConfig {
    /// True when reporting is enabled and a webhook URL is present.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.webhook_url.is_empty()
    }
}

/// Local desktop notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DesktopConfig {
    /// Play a sound on completion/cancellation
    pub sound: bool,

    /// Use `sound_file` instead of the stock system sound
    pub custom_sound: bool,

    /// Audio file played when `custom_sound` is set; missing file falls back
    /// to the stock sound
    pub sound_file: Option<PathBuf>,

    /// Show a desktop toast on completion/cancellation
    pub toast: bool,
}

impl Default for DesktopConfig {
    fn default() -> Self {
        Self {
            sound: true,
            custom_sound: false,
            sound_file: None,
            toast: true,
        }
    }
}

/// Polling and reporting timings, in seconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How often the output directory is polled
    pub check_interval_secs: f64,

    /// How long the final file's size must hold still before the job is done
    pub stable_delay_secs: f64,

    /// Minimum spacing between Discord progress edits
    pub update_interval_secs: f64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: DEFAULT_CHECK_INTERVAL_SECS,
            stable_delay_secs: DEFAULT_STABLE_DELAY_SECS,
            update_interval_secs: DEFAULT_UPDATE_INTERVAL_SECS,
        }
    }
}

impl TimingConfig {
    /// Polling cadence as a [`Duration`].
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs_f64(self.check_interval_secs)
    }

    /// Stability quiet period as a [`Duration`].
    pub fn stable_delay(&self) -> Duration {
        Duration::from_secs_f64(self.stable_delay_secs)
    }

    /// Progress edit spacing as a [`Duration`].
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs_f64(self.update_interval_secs)
    }
}

/// Idle cancellation thresholds.
///
/// A running job with no new frames for `max(floor_secs, avg_factor × average
/// frame time)` is declared canceled. Widen these for scenes with wildly
/// uneven frame times.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleConfig {
    /// Minimum idle time before cancellation, in seconds
    pub floor_secs: f64,

    /// Multiplier applied to the average frame time
    pub avg_factor: f64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            floor_secs: DEFAULT_IDLE_FLOOR_SECS,
            avg_factor: DEFAULT_IDLE_AVG_FACTOR,
        }
    }
}

impl IdleConfig {
    /// Idle floor as a [`Duration`].
    pub fn floor(&self) -> Duration {
        Duration::from_secs_f64(self.floor_secs)
    }
}

impl Config {
    /// Default configuration file path (`~/.framewatch/config.yaml`).
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".framewatch").join("config.yaml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. With no path, the default location is
    /// used when present, otherwise built-in defaults apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_yaml(p),
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_yaml(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Load configuration from a YAML file and validate it.
    pub fn from_yaml(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                WatchError::ConfigNotFound {
                    path: path.to_path_buf(),
                    source: Some(e),
                }
            } else {
                WatchError::io("reading config", path, e)
            }
        })?;
        let config: Self =
            serde_yaml::from_str(&content).map_err(|e| WatchError::ConfigInvalid {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configured values against their allowed ranges.
    pub fn validate(&self) -> Result<()> {
        check_range(
            "timing.check_interval_secs",
            self.timing.check_interval_secs,
            MIN_CHECK_INTERVAL_SECS,
            MAX_CHECK_INTERVAL_SECS,
        )?;
        check_range(
            "timing.stable_delay_secs",
            self.timing.stable_delay_secs,
            MIN_STABLE_DELAY_SECS,
            MAX_STABLE_DELAY_SECS,
        )?;
        check_range(
            "timing.update_interval_secs",
            self.timing.update_interval_secs,
            MIN_UPDATE_INTERVAL_SECS,
            MAX_UPDATE_INTERVAL_SECS,
        )?;
        if !self.idle.floor_secs.is_finite() || self.idle.floor_secs < 0.0 {
            return Err(WatchError::validation(
                "idle.floor_secs",
                format!("{} is not a non-negative number", self.idle.floor_secs),
            ));
        }
        if !self.idle.avg_factor.is_finite() || self.idle.avg_factor < 1.0 {
            return Err(WatchError::validation(
                "idle.avg_factor",
                format!("{} must be at least 1.0", self.idle.avg_factor),
            ));
        }
        Ok(())
    }

    /// Set the webhook URL.
    pub fn with_webhook_url(mut self, url: impl Into<String>) -> Self {
        self.discord.webhook_url = url.into();
        self
    }

    /// Set the polling cadence in seconds.
    pub fn with_check_interval(mut self, secs: f64) -> Self {
        self.timing.check_interval_secs = secs;
        self
    }

    /// Set the stability quiet period in seconds.
    pub fn with_stable_delay(mut self, secs: f64) -> Self {
        self.timing.stable_delay_secs = secs;
        self
    }

    /// Set the progress edit spacing in seconds.
    pub fn with_update_interval(mut self, secs: f64) -> Self {
        self.timing.update_interval_secs = secs;
        self
    }

    /// Set the idle cancellation thresholds.
    pub fn with_idle(mut self, floor_secs: f64, avg_factor: f64) -> Self {
        self.idle.floor_secs = floor_secs;
        self.idle.avg_factor = avg_factor;
        self
    }

    /// Disable Discord reporting.
    pub fn disable_discord(mut self) -> Self {
        self.discord.enabled = false;
        self
    }

    /// Disable local sound and toast notifications.
    pub fn disable_desktop(mut self) -> Self {
        self.desktop.sound = false;
        self.desktop.toast = false;
        self
    }
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !value.is_finite() || value < min || value > max {
        return Err(WatchError::validation(
            field,
            format!("{value} is outside the allowed range {min}..={max}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timing.check_interval(), Duration::from_secs(1));
        assert_eq!(config.timing.update_interval(), Duration::from_secs(5));
        assert_eq!(config.idle.floor(), Duration::from_secs(120));
        assert!(config.discord.enabled);
        assert!(!config.discord.is_active(), "no URL means inactive");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = "discord:\n  webhook_url: \"https://example.invalid/hook\"\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert!(config.discord.is_active());
        assert_eq!(config.discord.username, DEFAULT_USERNAME);
        assert_eq!(
            config.timing.check_interval_secs,
            DEFAULT_CHECK_INTERVAL_SECS
        );
        assert_eq!(config.idle.avg_factor, DEFAULT_IDLE_AVG_FACTOR);
    }

    #[test]
    fn test_check_interval_out_of_range() {
        let config = Config::default().with_check_interval(9.0);
        let err = config.validate().unwrap_err();
        assert!(err.is_config_error());
        assert!(err.to_string().contains("timing.check_interval_secs"));
    }

    #[test]
    fn test_update_interval_below_minimum() {
        let config = Config::default().with_update_interval(1.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_idle_factor_must_be_at_least_one() {
        let config = Config::default().with_idle(120.0, 0.5);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("idle.avg_factor"));
    }

    #[test]
    fn test_from_yaml_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "timing:").unwrap();
        writeln!(file, "  update_interval_secs: 10.0").unwrap();
        writeln!(file, "desktop:").unwrap();
        writeln!(file, "  toast: false").unwrap();

        let config = Config::from_yaml(&path).unwrap();
        assert_eq!(config.timing.update_interval_secs, 10.0);
        assert!(!config.desktop.toast);
        assert!(config.desktop.sound);
    }

    #[test]
    fn test_from_yaml_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::from_yaml(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, WatchError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_from_yaml_rejects_out_of_range() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "timing:\n  check_interval_secs: 0.01\n").unwrap();
        let err = Config::from_yaml(&path).unwrap_err();
        assert!(matches!(err, WatchError::ConfigValidation { .. }));
    }
}
