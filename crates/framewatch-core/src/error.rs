//! Error types for framewatch operations.
//!
//! This module defines [`WatchError`], the error enum shared by the watcher
//! core and the configuration layer. Errors are designed for visibility:
//! arming a job fails loudly, while per-frame filesystem hiccups during a
//! running watch are handled (and logged) where they occur instead of being
//! raised through this type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`WatchError`].
pub type Result<T> = std::result::Result<T, WatchError>;

/// Error type for configuration and watcher lifecycle operations.
#[derive(Debug, Error)]
pub enum WatchError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration value outside its allowed range
    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidation { field: String, message: String },

    /// Discord reporting enabled but no webhook URL configured
    #[error("Discord reporting is enabled but no webhook URL is configured")]
    WebhookUrlMissing,

    // =========================================================================
    // Job Setup Errors
    // =========================================================================
    /// Output template expands to zero frame paths
    #[error("Output template {template} expands to no frame paths ({first}..={last})")]
    EmptyFrameRange {
        template: PathBuf,
        first: i64,
        last: i64,
    },

    /// Output template cannot be expanded (e.g. non-UTF-8 file name)
    #[error("Cannot expand output template {template}: {message}")]
    TemplateUnresolvable { template: PathBuf, message: String },

    /// A job is already being watched
    #[error("A watch is already armed for {job}; one job at a time")]
    AlreadyArmed { job: String },

    /// Operation requires an armed job
    #[error("No watch is armed")]
    NotArmed,

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in framewatch)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl WatchError {
    /// Create a ConfigNotFound error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a ConfigValidation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create a TemplateUnresolvable error
    pub fn template(template: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::TemplateUnresolvable {
            template: template.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. }
                | Self::ConfigInvalid { .. }
                | Self::ConfigValidation { .. }
                | Self::WebhookUrlMissing
        )
    }

    /// Returns true if this error concerns arming a job
    pub fn is_arm_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyFrameRange { .. }
                | Self::TemplateUnresolvable { .. }
                | Self::AlreadyArmed { .. }
        )
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. } => {
                Some("Check the YAML at ~/.framewatch/config.yaml")
            }
            Self::WebhookUrlMissing => {
                Some("Set discord.webhook_url in the config or pass --webhook-url")
            }
            Self::EmptyFrameRange { .. } => {
                Some("Check that the frame range start does not exceed the end")
            }
            Self::AlreadyArmed { .. } => {
                Some("Wait for the running watch to finish before arming another")
            }
            _ => None,
        }
    }
}
