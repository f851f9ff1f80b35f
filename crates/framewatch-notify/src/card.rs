//! The Discord status card model.
//!
//! One card accompanies a render job through its whole life: posted when the
//! first frame lands, edited in place as frames accumulate, and recolored on
//! the terminal edit. [`Embed::build`] renders a [`RenderStats`] snapshot
//! into the wire shape Discord expects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use framewatch_core::timefmt::human_duration;

/// Embed sidebar color while rendering.
pub const COLOR_IN_PROGRESS: u32 = 0x1E88E5;
/// Embed sidebar color for a finished render.
pub const COLOR_COMPLETE: u32 = 0x43A047;
/// Embed sidebar color for a canceled or interrupted render.
pub const COLOR_CANCELED: u32 = 0xE53935;

/// Lifecycle stage a card is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardStage {
    /// First frame observed, card created
    Start,
    /// Frames accumulating, card edited in place
    Progress,
    /// All frames present and settled
    Done,
    /// Job declared abandoned by the idle heuristic
    Canceled,
}

impl CardStage {
    /// Embed sidebar color for this stage.
    pub fn color(&self) -> u32 {
        match self {
            Self::Start | Self::Progress => COLOR_IN_PROGRESS,
            Self::Done => COLOR_COMPLETE,
            Self::Canceled => COLOR_CANCELED,
        }
    }

    /// True for the stages a job can end in.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Canceled)
    }

    /// Lowercase stage name for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Progress => "progress",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }
}

impl fmt::Display for CardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Whether a job covers a frame range or one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    Animation,
    SingleFrame,
}

impl JobType {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Animation => "Animation",
            Self::SingleFrame => "Single Frame",
        }
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Display-ready snapshot of a running job, rebuilt by the watcher each tick.
#[derive(Debug, Clone)]
pub struct RenderStats {
    pub job_label: String,
    pub job_type: JobType,
    pub total_frames: usize,
    pub first_frame: i64,
    pub last_frame: i64,
    pub current_frame: i64,
    pub completed: usize,
    pub last_frame_time: Option<Duration>,
    pub average: Option<Duration>,
    pub eta: Option<Duration>,
    pub elapsed: Duration,
}

impl RenderStats {
    /// Progress string in the form `12/40 (30.0%)`.
    pub fn progress(&self) -> String {
        let pct = if self.total_frames > 0 {
            self.completed as f64 / self.total_frames as f64 * 100.0
        } else {
            100.0
        };
        format!("{}/{} ({:.1}%)", self.completed, self.total_frames, pct)
    }
}

/// One field of a status card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

impl EmbedField {
    fn inline(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline: true,
        }
    }

    fn block(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: value.into(),
            inline: false,
        }
    }
}

/// A Discord embed: the wire shape of the status card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    pub fields: Vec<EmbedField>,
}

impl Embed {
    /// Render a stats snapshot as the card for the given stage.
    pub fn build(stage: CardStage, stats: &RenderStats) -> Self {
        let (title, description) = match stage {
            CardStage::Start => (
                format!("{} — Render starting", stats.job_label),
                format!(
                    "Job type: {}\nFrames: {} | Range: {}–{}",
                    stats.job_type, stats.total_frames, stats.first_frame, stats.last_frame
                ),
            ),
            CardStage::Progress => (
                format!("{} — Rendering…", stats.job_label),
                format!("Job type: {}", stats.job_type),
            ),
            CardStage::Done => (
                format!("{} — Complete", stats.job_label),
                format!("Job type: {}", stats.job_type),
            ),
            CardStage::Canceled => (
                format!("{} — Render canceled ⛔", stats.job_label),
                format!(
                    "Job type: {}\nRender appears to have been canceled or interrupted.",
                    stats.job_type
                ),
            ),
        };

        let fields = vec![
            EmbedField::inline(
                "Frame Range",
                format!("{}–{}", stats.first_frame, stats.last_frame),
            ),
            EmbedField::inline("Total frames", stats.total_frames.to_string()),
            EmbedField::inline("Current frame", stats.current_frame.to_string()),
            EmbedField::block("Progress", stats.progress()),
            EmbedField::inline("Last frame time", human_duration(stats.last_frame_time)),
            EmbedField::inline("Average per frame", human_duration(stats.average)),
            EmbedField::inline("ETA (remaining)", human_duration(stats.eta)),
            EmbedField::inline("Time elapsed", human_duration(Some(stats.elapsed))),
        ];

        Self {
            title,
            description,
            color: stage.color(),
            fields,
        }
    }
}
