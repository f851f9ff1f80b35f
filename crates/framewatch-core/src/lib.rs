//! # framewatch-core
//!
//! Errors, configuration, and logging shared across the framewatch crates.
//!
//! This crate provides:
//! - [`WatchError`] - Error types for watcher and configuration failures
//! - [`config`] - YAML configuration with validation
//! - [`logging`] - Tracing setup and log management
//! - [`timefmt`] - Human-readable duration formatting for status cards
//!
//! ## Example
//!
//! ```no_run
//! use framewatch_core::{Config, logging};
//!
//! fn main() -> framewatch_core::Result<()> {
//!     let _guard = logging::init_logging(None, false)?;
//!
//!     let config = Config::load(None)?;
//!     config.validate()?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod timefmt;

// Re-export main types for convenience
pub use config::{Config, DesktopConfig, DiscordConfig, IdleConfig, TimingConfig};
pub use error::{Result, WatchError};
pub use logging::{LogGuard, init_logging};
