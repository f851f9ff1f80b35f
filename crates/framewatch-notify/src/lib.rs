//! # framewatch-notify
//!
//! Notification sinks for framewatch: the Discord webhook client with its
//! live-updating status card, and local desktop sound/toast delivery.
//!
//! This crate provides:
//! - [`DiscordWebhook`] - webhook client (create, edit, plain text)
//! - [`Embed`] / [`CardStage`] - the status card model
//! - [`LiveCard`] - create-once/edit-thereafter card lifecycle
//! - [`DesktopNotifier`] - capability trait for sound and toast sinks
//!
//! ## Example
//!
//! ```no_run
//! use framewatch_core::DiscordConfig;
//! use framewatch_notify::DiscordWebhook;
//!
//! # async fn example() -> framewatch_notify::Result<()> {
//! let config = DiscordConfig {
//!     webhook_url: "https://discord.com/api/webhooks/123/abc".into(),
//!     ..Default::default()
//! };
//! let hook = DiscordWebhook::from_config(&config)?;
//! hook.post_text("render finished").await?;
//! # Ok(())
//! # }
//! ```

pub mod card;
pub mod desktop;
pub mod error;
pub mod live_card;
pub mod webhook;

// Re-export main types for convenience
pub use card::{CardStage, Embed, EmbedField, JobType, RenderStats};
pub use desktop::{DesktopNotifier, MockNotifier, SystemNotifier};
pub use error::{NotifyError, Result};
pub use live_card::LiveCard;
pub use webhook::DiscordWebhook;
