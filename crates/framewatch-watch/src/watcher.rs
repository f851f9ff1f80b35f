//! The render watch state machine.
//!
//! [`RenderWatcher`] owns at most one job at a time. Arming expands the
//! output template into the set of files the renderer is expected to
//! produce; after that every tick is a pure read of the filesystem, and the
//! job moves through waiting, in progress, and exactly one of done or
//! canceled. The renderer itself is never consulted because nothing can be:
//! the render runs in a process this tool does not control.
//!
//! Reporting sinks (webhook, sound, toast) are best effort. A sink failure
//! is logged and the watch carries on; only arming can fail.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use tracing::{debug, info, warn};

use framewatch_core::{Config, DesktopConfig, Result, WatchError};
use framewatch_notify::{
    CardStage, DesktopNotifier, DiscordWebhook, JobType, LiveCard, NotifyError, RenderStats,
};

use crate::frames;
use crate::idle::IdlePolicy;
use crate::progress::{FrameTimer, count_completed};
use crate::stability::StabilityProbe;

/// What a job covers: a frame range or a single still.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchMode {
    Animation { first: i64, last: i64 },
    SingleFrame { frame: i64 },
}

impl WatchMode {
    pub fn job_type(&self) -> JobType {
        match self {
            Self::Animation { .. } => JobType::Animation,
            Self::SingleFrame { .. } => JobType::SingleFrame,
        }
    }
}

/// Everything needed to arm a watch.
#[derive(Debug, Clone)]
pub struct ArmRequest {
    /// Output path template, `#` runs marking the frame number slot.
    pub template: PathBuf,
    pub mode: WatchMode,
    /// Overrides the label derived from the template file stem.
    pub label: Option<String>,
}

/// Lifecycle position of the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Disarmed,
    Waiting,
    InProgress,
    Done,
    Canceled,
}

impl WatchState {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Disarmed => "disarmed",
            Self::Waiting => "waiting for first frame",
            Self::InProgress => "in progress",
            Self::Done => "done",
            Self::Canceled => "canceled",
        }
    }
}

/// How a finished job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Completed,
    Canceled,
}

/// What the driving loop should do after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Poll again after this delay.
    Reschedule(Duration),
    /// The job reached a terminal state (or none is armed).
    Stop,
}

/// State for one armed job.
#[derive(Debug)]
struct WatchJob {
    label: String,
    mode: WatchMode,
    expected: Vec<PathBuf>,
    first_frame: i64,
    last_frame: i64,
    /// Wall-clock arm time; files modified before this are stale.
    started_at: SystemTime,
    /// Monotonic arm time; elapsed is measured from here.
    armed_at: Instant,
    timer: FrameTimer,
    probe: StabilityProbe,
    card: LiveCard,
}

impl WatchJob {
    fn build_stats(&self, exist_count: usize, now: Instant) -> RenderStats {
        let total = self.expected.len();
        RenderStats {
            job_label: self.label.clone(),
            job_type: self.mode.job_type(),
            total_frames: total,
            first_frame: self.first_frame,
            last_frame: self.last_frame,
            current_frame: self.current_frame(exist_count),
            completed: exist_count,
            last_frame_time: self.timer.last_duration(),
            average: self.timer.average(),
            eta: self.timer.eta(total.saturating_sub(exist_count)),
            elapsed: now.duration_since(self.armed_at),
        }
    }

    fn current_frame(&self, exist_count: usize) -> i64 {
        match self.mode {
            // Frames land in order, so the newest one is first + count - 1.
            WatchMode::Animation { .. } => self.first_frame + exist_count.saturating_sub(1) as i64,
            WatchMode::SingleFrame { frame } => frame,
        }
    }
}

/// Polls the filesystem and reports render progress.
pub struct RenderWatcher {
    config: Config,
    idle: IdlePolicy,
    hook: Option<DiscordWebhook>,
    desktop: Arc<dyn DesktopNotifier>,
    job: Option<WatchJob>,
    outcome: Option<WatchOutcome>,
}

impl RenderWatcher {
    /// Build a watcher from validated configuration.
    ///
    /// Fails with [`WatchError::WebhookUrlMissing`] when Discord reporting
    /// is enabled without a webhook URL, so a misconfigured watch dies
    /// before the render loop starts instead of silently reporting nowhere.
    pub fn new(config: Config, desktop: Arc<dyn DesktopNotifier>) -> Result<Self> {
        let hook = if config.discord.enabled {
            match DiscordWebhook::from_config(&config.discord) {
                Ok(hook) => Some(hook),
                Err(NotifyError::NotConfigured) => return Err(WatchError::WebhookUrlMissing),
                Err(e) => {
                    return Err(WatchError::internal(format!(
                        "webhook client setup failed: {e}"
                    )));
                }
            }
        } else {
            None
        };
        Ok(Self {
            idle: IdlePolicy::from_config(&config.idle),
            config,
            hook,
            desktop,
            job: None,
            outcome: None,
        })
    }

    /// Arm a watch for one render job.
    pub fn arm(&mut self, request: ArmRequest) -> Result<()> {
        self.arm_at(request, SystemTime::now(), Instant::now())
    }

    /// Clock-injected variant of [`arm`](Self::arm).
    ///
    /// `started_at` is the stale-file cutoff compared against mtimes;
    /// `armed_at` anchors elapsed time and must come from the same clock
    /// that later feeds [`tick`](Self::tick).
    pub fn arm_at(
        &mut self,
        request: ArmRequest,
        started_at: SystemTime,
        armed_at: Instant,
    ) -> Result<()> {
        if let Some(job) = &self.job {
            return Err(WatchError::AlreadyArmed {
                job: job.label.clone(),
            });
        }

        let template = frames::absolutize(&request.template)?;
        let (first_frame, last_frame, expected) = match request.mode {
            WatchMode::Animation { first, last } => {
                let paths = frames::expected_frame_paths(&template, first, last)?;
                (first, last, paths)
            }
            WatchMode::SingleFrame { frame } => {
                (frame, frame, vec![frames::frame_path(&template, frame)?])
            }
        };

        let label = request
            .label
            .filter(|label| !label.trim().is_empty())
            .unwrap_or_else(|| frames::job_label(&template));

        // Watch the file that finishes last for write stability.
        let probe_target = match expected.last() {
            Some(path) => path.clone(),
            None => {
                return Err(WatchError::EmptyFrameRange {
                    template,
                    first: first_frame,
                    last: last_frame,
                });
            }
        };

        info!(
            job = %label,
            frames = expected.len(),
            template = %template.display(),
            "watch armed"
        );

        self.outcome = None;
        self.job = Some(WatchJob {
            label,
            mode: request.mode,
            expected,
            first_frame,
            last_frame,
            started_at,
            armed_at,
            timer: FrameTimer::new(),
            probe: StabilityProbe::new(probe_target, self.config.timing.stable_delay()),
            card: LiveCard::new(),
        });
        Ok(())
    }

    /// Run one poll cycle at the given instant.
    ///
    /// Ordering inside a tick is fixed: census, cancellation, start card,
    /// stability, progress card, completion. Cancellation runs before the
    /// completion check so a tie goes to canceled.
    pub async fn tick(&mut self, now: Instant) -> TickOutcome {
        let check_interval = self.config.timing.check_interval();
        let update_interval = self.config.timing.update_interval();

        let Some(job) = self.job.as_mut() else {
            return TickOutcome::Stop;
        };

        let exist_count = count_completed(&job.expected, job.started_at);
        let all_present = exist_count >= job.expected.len();

        let was_started = job.timer.started();
        if job.timer.observe(exist_count, now) {
            debug!(job = %job.label, frames_done = exist_count, "frame census advanced");
        }
        if !job.timer.started() {
            // Renderer has not produced anything yet.
            return TickOutcome::Reschedule(check_interval);
        }
        if !was_started {
            info!(job = %job.label, "first frame observed; render underway");
        }

        let stats = job.build_stats(exist_count, now);

        if !all_present {
            if let Some(last_advance) = job.timer.idle_since() {
                let idle = now.duration_since(last_advance);
                if self.idle.is_abandoned(idle, job.timer.average()) {
                    warn!(
                        job = %job.label,
                        idle_secs = idle.as_secs(),
                        "no new frames; treating render as canceled"
                    );
                    notify_desktop(&*self.desktop, &self.config.desktop, "Render canceled").await;
                    if let Some(hook) = self.hook.as_ref() {
                        job.card.finalize(hook, CardStage::Canceled, &stats).await;
                        let text =
                            format!("⛔ Render canceled — {} ({})", job.label, stats.progress());
                        if let Err(e) = hook.post_text(&text).await {
                            warn!(error = %e, "cancellation alert failed");
                        }
                    }
                    self.outcome = Some(WatchOutcome::Canceled);
                    self.job = None;
                    return TickOutcome::Stop;
                }
            }
        }

        if let Some(hook) = self.hook.as_ref() {
            job.card.post_start(hook, &stats, now).await;
        }

        // Only probe the final file once every frame is on disk.
        let all_stable = all_present && job.probe.check(now);

        if !all_stable {
            if let Some(hook) = self.hook.as_ref() {
                job.card
                    .post_progress(hook, &stats, now, update_interval)
                    .await;
            }
            return TickOutcome::Reschedule(check_interval);
        }

        info!(
            job = %job.label,
            elapsed_secs = stats.elapsed.as_secs(),
            "render complete"
        );
        notify_desktop(&*self.desktop, &self.config.desktop, "Render complete").await;
        if let Some(hook) = self.hook.as_ref() {
            job.card.finalize(hook, CardStage::Done, &stats).await;
            let text = format!("✅ Render complete — {} ({})", job.label, stats.progress());
            if let Err(e) = hook.post_text(&text).await {
                warn!(error = %e, "completion alert failed");
            }
        }
        self.outcome = Some(WatchOutcome::Completed);
        self.job = None;
        TickOutcome::Stop
    }

    /// Poll until the armed job reaches a terminal state.
    pub async fn run(&mut self) -> Result<WatchOutcome> {
        if self.job.is_none() {
            return Err(WatchError::NotArmed);
        }
        let mut delay = self.config.timing.check_interval();
        loop {
            tokio::time::sleep(delay).await;
            match self.tick(Instant::now()).await {
                TickOutcome::Reschedule(next) => delay = next,
                TickOutcome::Stop => break,
            }
        }
        self.outcome
            .ok_or_else(|| WatchError::internal("watch loop stopped without a terminal outcome"))
    }

    pub fn is_armed(&self) -> bool {
        self.job.is_some()
    }

    /// Label of the armed job, if any.
    pub fn job_label(&self) -> Option<&str> {
        self.job.as_ref().map(|job| job.label.as_str())
    }

    /// Terminal outcome of the most recent job.
    pub fn outcome(&self) -> Option<WatchOutcome> {
        self.outcome
    }

    pub fn state(&self) -> WatchState {
        match (&self.job, self.outcome) {
            (Some(job), _) if job.timer.started() => WatchState::InProgress,
            (Some(_), _) => WatchState::Waiting,
            (None, Some(WatchOutcome::Completed)) => WatchState::Done,
            (None, Some(WatchOutcome::Canceled)) => WatchState::Canceled,
            (None, None) => WatchState::Disarmed,
        }
    }
}

/// Fire the local sinks the configuration asks for.
async fn notify_desktop(desktop: &dyn DesktopNotifier, config: &DesktopConfig, message: &str) {
    if config.sound {
        if let Err(e) = desktop.play_sound().await {
            warn!(error = %e, "notification sound failed");
        }
    }
    if config.toast {
        if let Err(e) = desktop.show_toast(message).await {
            warn!(error = %e, "desktop toast failed");
        }
    }
}
