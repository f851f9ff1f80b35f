//! Error types for the notification sinks.

use thiserror::Error;

/// Result type for notification operations.
pub type Result<T> = std::result::Result<T, NotifyError>;

/// How much of a webhook error body is kept in the error message. Failed
/// requests behind proxies often return whole HTML pages.
const BODY_EXCERPT_CHARS: usize = 300;

/// Notification sink errors.
///
/// Every variant here is survivable: the watcher logs these and keeps
/// ticking. They only surface as hard failures from the CLI test commands.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Discord reporting was requested without a webhook URL
    #[error("Discord reporting is disabled or has no webhook URL")]
    NotConfigured,

    /// HTTP transport failure (connect, timeout, TLS)
    #[error("Webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Webhook responded with a non-success status
    #[error("Webhook returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// A notification helper process could not be launched
    #[error("Failed to launch {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// No usable sound player was found on this system
    #[error("No sound player available on this system")]
    NoPlayer,
}

impl NotifyError {
    /// Create a Status error, keeping only an excerpt of the body.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        let body: String = body.into();
        Self::Status {
            status,
            body: body.chars().take(BODY_EXCERPT_CHARS).collect(),
        }
    }

    /// Create a Spawn error.
    pub fn spawn(command: impl Into<String>, source: std::io::Error) -> Self {
        Self::Spawn {
            command: command.into(),
            source,
        }
    }

    /// Returns true for failures that may clear up on a later attempt
    /// (timeouts, connection resets, rate limiting, server errors).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(e) => e.is_timeout() || e.is_connect(),
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
