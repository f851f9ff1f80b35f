//! Render-output watching for framewatch.
//!
//! This crate turns a directory of slowly-appearing image files into a
//! render progress signal. The renderer writing those files is outside our
//! control, so everything is inferred from the filesystem: which expected
//! frames exist, how fast they land, whether the last one has stopped
//! growing, and whether the stream of new frames has gone quiet.
//!
//! [`RenderWatcher`] is the entry point. Arm it with an [`ArmRequest`] and
//! drive it with [`RenderWatcher::run`], or call
//! [`RenderWatcher::tick`] directly with your own clock and schedule.

pub mod frames;
pub mod idle;
pub mod progress;
pub mod stability;
pub mod watcher;

pub use idle::IdlePolicy;
pub use progress::FrameTimer;
pub use stability::StabilityProbe;
pub use watcher::{
    ArmRequest, RenderWatcher, TickOutcome, WatchMode, WatchOutcome, WatchState,
};
