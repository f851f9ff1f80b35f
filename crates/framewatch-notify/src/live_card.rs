//! Create-once/edit-thereafter lifecycle for the live status card.
//!
//! [`LiveCard`] owns the remote side of one job: whether the start card has
//! been posted, the captured message id, and the throttle clock for progress
//! edits. Webhook failures are logged and swallowed here; a failed create
//! leaves the id unset so the next progress pass retries creation instead of
//! editing a message that never existed.

use std::time::{Duration, Instant};
use tracing::{debug, error, warn};

use crate::card::{CardStage, Embed, RenderStats};
use crate::error::NotifyError;
use crate::webhook::DiscordWebhook;

/// Remote card state for a single watched job.
#[derive(Debug, Default)]
pub struct LiveCard {
    message_id: Option<String>,
    last_posted: Option<Instant>,
    started_posted: bool,
}

impl LiveCard {
    /// Fresh card state; reset on every arm.
    pub fn new() -> Self {
        Self::default()
    }

    /// Id of the created message, once known. Set at most once.
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// True once the start card has been attempted.
    pub fn start_posted(&self) -> bool {
        self.started_posted
    }

    fn remember_id(&mut self, id: Option<String>) {
        match id {
            Some(id) => {
                debug!(message_id = %id, "card message id captured");
                self.message_id = Some(id);
            }
            None => warn!("card created but no message id returned; edits will re-create"),
        }
    }

    /// Post the start card. Runs once; later calls are no-ops.
    ///
    /// Also stamps the throttle clock so the first progress edit comes a
    /// full update interval after the start card.
    pub async fn post_start(&mut self, hook: &DiscordWebhook, stats: &RenderStats, now: Instant) {
        if self.started_posted {
            return;
        }
        self.started_posted = true;
        self.last_posted = Some(now);

        let embed = Embed::build(CardStage::Start, stats);
        match hook.create_card(&embed).await {
            Ok(id) => self.remember_id(id),
            Err(e) => log_failure("start card creation", &e),
        }
    }

    /// Edit the card with fresh progress, throttled to `interval`.
    ///
    /// Does nothing until the start card has been attempted. When the create
    /// failed and no id is known, creation is retried here.
    pub async fn post_progress(
        &mut self,
        hook: &DiscordWebhook,
        stats: &RenderStats,
        now: Instant,
        interval: Duration,
    ) {
        if !self.started_posted {
            return;
        }
        let due = match self.last_posted {
            Some(t) => now.duration_since(t) >= interval,
            None => true,
        };
        if !due {
            return;
        }

        let embed = Embed::build(CardStage::Progress, stats);
        match &self.message_id {
            Some(id) => {
                if let Err(e) = hook.edit_card(id, &embed).await {
                    log_failure("progress edit", &e);
                }
            }
            None => match hook.create_card(&embed).await {
                Ok(id) => self.remember_id(id),
                Err(e) => log_failure("progress card creation", &e),
            },
        }
        // Failures count against the throttle too; no hammering the webhook
        self.last_posted = Some(now);
    }

    /// Push the terminal card (done or canceled), ignoring the throttle.
    pub async fn finalize(&mut self, hook: &DiscordWebhook, stage: CardStage, stats: &RenderStats) {
        let embed = Embed::build(stage, stats);
        match &self.message_id {
            Some(id) => {
                if let Err(e) = hook.edit_card(id, &embed).await {
                    log_failure(&format!("final {stage} card edit"), &e);
                }
            }
            None => {
                if let Err(e) = hook.create_card(&embed).await {
                    log_failure(&format!("final {stage} card creation"), &e);
                }
            }
        }
    }
}

/// Log a swallowed webhook failure, louder when it will not clear up on
/// its own (a transient timeout or 5xx reads differently from a deleted
/// webhook returning 404).
fn log_failure(what: &str, e: &NotifyError) {
    if e.is_transient() {
        warn!(error = %e, "{what} failed; a later attempt may go through");
    } else {
        error!(error = %e, "{what} failed");
    }
}
