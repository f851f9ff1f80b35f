//! Discord webhook client.
//!
//! Three operations, all bounded by a 15 second timeout: create a card
//! message (asking Discord to return the created message so its id can be
//! captured for later edits), edit an existing card in place, and post a
//! plain text message. Payloads carry the configured username and optional
//! avatar override.
//!
//! ## Example
//!
//! ```no_run
//! use framewatch_core::DiscordConfig;
//! use framewatch_notify::{CardStage, DiscordWebhook, Embed};
//! # use framewatch_notify::RenderStats;
//!
//! # async fn example(stats: RenderStats) -> framewatch_notify::Result<()> {
//! let config = DiscordConfig {
//!     webhook_url: "https://discord.com/api/webhooks/123/abc".into(),
//!     ..Default::default()
//! };
//! let hook = DiscordWebhook::from_config(&config)?;
//!
//! let embed = Embed::build(CardStage::Start, &stats);
//! if let Some(id) = hook.create_card(&embed).await? {
//!     hook.edit_card(&id, &Embed::build(CardStage::Progress, &stats)).await?;
//! }
//! # Ok(())
//! # }
//! ```

use serde::Serialize;
use tokio::time::Duration;
use tracing::debug;

use framewatch_core::DiscordConfig;

use crate::card::Embed;
use crate::error::{NotifyError, Result};

/// Timeout applied to every outbound webhook call.
pub const WEBHOOK_TIMEOUT_SECS: u64 = 15;

// Webhook hosts behind Cloudflare reject unknown user agents with error 1010
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/120.0.0.0 Safari/537.36";

#[derive(Serialize)]
struct TextPayload<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
    content: &'a str,
}

#[derive(Serialize)]
struct EmbedPayload<'a> {
    username: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<&'a str>,
    embeds: [&'a Embed; 1],
}

/// Client for one Discord-compatible webhook URL.
pub struct DiscordWebhook {
    client: reqwest::Client,
    url: String,
    username: String,
    avatar_url: Option<String>,
}

impl DiscordWebhook {
    /// Create a client from the Discord section of the config.
    ///
    /// Fails with [`NotifyError::NotConfigured`] when the webhook URL is
    /// empty; the enabled flag is the caller's concern.
    pub fn from_config(config: &DiscordConfig) -> Result<Self> {
        let url = config.webhook_url.trim().trim_end_matches('/').to_string();
        if url.is_empty() {
            return Err(NotifyError::NotConfigured);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(WEBHOOK_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()?;

        let avatar_url = config
            .avatar_url
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        Ok(Self {
            client,
            url,
            username: config.username.clone(),
            avatar_url,
        })
    }

    /// Post a plain text message.
    pub async fn post_text(&self, content: &str) -> Result<()> {
        let payload = TextPayload {
            username: &self.username,
            avatar_url: self.avatar_url.as_deref(),
            content,
        };

        let response = self.client.post(&self.url).json(&payload).send().await?;
        Self::ok_or_status(response).await?;
        debug!("text message posted");
        Ok(())
    }

    /// Create a new card message.
    ///
    /// Posts with `?wait=true` so Discord returns the created message, and
    /// extracts its id for later edits. A success response without a usable
    /// id yields `Ok(None)`: the message exists but can never be edited.
    pub async fn create_card(&self, embed: &Embed) -> Result<Option<String>> {
        let payload = EmbedPayload {
            username: &self.username,
            avatar_url: self.avatar_url.as_deref(),
            embeds: [embed],
        };

        let response = self
            .client
            .post(format!("{}?wait=true", self.url))
            .json(&payload)
            .send()
            .await?;
        let response = Self::ok_or_status(response).await?;

        let body: serde_json::Value = match response.json().await {
            Ok(v) => v,
            Err(e) => {
                debug!(error = %e, "card created but response body was not JSON");
                return Ok(None);
            }
        };
        let id = body
            .get("id")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        debug!(message_id = ?id, "card created");
        Ok(id)
    }

    /// Edit an existing card message in place.
    pub async fn edit_card(&self, message_id: &str, embed: &Embed) -> Result<()> {
        let payload = EmbedPayload {
            username: &self.username,
            avatar_url: self.avatar_url.as_deref(),
            embeds: [embed],
        };

        let response = self
            .client
            .patch(format!("{}/messages/{}", self.url, message_id))
            .json(&payload)
            .send()
            .await?;
        Self::ok_or_status(response).await?;
        debug!(message_id, "card edited");
        Ok(())
    }

    async fn ok_or_status(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::status(status, body))
    }
}
