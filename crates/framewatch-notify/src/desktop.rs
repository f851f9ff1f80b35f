//! Local desktop notification sinks: completion sound and toast popup.
//!
//! Everything here shells out to whatever the platform offers (PulseAudio or
//! ALSA and notify-send on Linux, afplay and osascript on macOS, PowerShell
//! with BurntToast on Windows) and never waits for the helper to finish.
//! A configured custom sound file is tried through ffplay first since that
//! covers mp3/flac on every platform.

use ::async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

use framewatch_core::DesktopConfig;

use crate::error::{NotifyError, Result};

/// Title used for toast popups.
const TOAST_TITLE: &str = "framewatch";

/// Capability interface for local notifications.
///
/// The watcher holds this as a trait object so tests can swap in
/// [`MockNotifier`] and assert on delivery without making noise.
#[async_trait]
pub trait DesktopNotifier: Send + Sync {
    /// Play the completion sound: the configured custom file when enabled
    /// and present, otherwise the stock system sound.
    async fn play_sound(&self) -> Result<()>;

    /// Show a desktop toast with the given message.
    async fn show_toast(&self, message: &str) -> Result<()>;
}

/// Real platform-backed notifier.
pub struct SystemNotifier {
    config: DesktopConfig,
}

impl SystemNotifier {
    pub fn new(config: DesktopConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DesktopNotifier for SystemNotifier {
    async fn play_sound(&self) -> Result<()> {
        if self.config.custom_sound {
            if let Some(path) = self.config.sound_file.as_deref() {
                if path.is_file() {
                    return spawn_first(custom_sound_players(path));
                }
                warn!(
                    path = %path.display(),
                    "custom sound file missing; falling back to the stock sound"
                );
            }
        }
        play_stock_sound()
    }

    async fn show_toast(&self, message: &str) -> Result<()> {
        let (program, args) = toast_command(message);
        spawn_quiet(program, args)
    }
}

/// Spawn a helper detached, with its output discarded.
fn spawn_quiet(program: &'static str, args: Vec<OsString>) -> Result<()> {
    match Command::new(program)
        .args(&args)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(_child) => {
            debug!(command = program, "notification helper spawned");
            Ok(())
        }
        Err(e) => Err(NotifyError::spawn(program, e)),
    }
}

/// Try candidate players in order, skipping ones not on PATH.
fn spawn_first(candidates: Vec<(&'static str, Vec<OsString>)>) -> Result<()> {
    for (program, args) in candidates {
        match Command::new(program)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
        {
            Ok(_child) => {
                debug!(command = program, "sound player spawned");
                return Ok(());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(command = program, "player not on PATH");
            }
            Err(e) => return Err(NotifyError::spawn(program, e)),
        }
    }
    Err(NotifyError::NoPlayer)
}

fn os_args<const N: usize>(args: [&str; N]) -> Vec<OsString> {
    args.iter().map(OsString::from).collect()
}

// ---------------------------------------------------------------------------
// Linux and other unixes
// ---------------------------------------------------------------------------

#[cfg(all(unix, not(target_os = "macos")))]
fn play_stock_sound() -> Result<()> {
    const FREEDESKTOP: &str = "/usr/share/sounds/freedesktop/stereo/complete.oga";
    const ALSA: &str = "/usr/share/sounds/alsa/Front_Center.wav";

    let mut candidates = Vec::new();
    if Path::new(FREEDESKTOP).is_file() {
        candidates.push(("paplay", os_args([FREEDESKTOP])));
    }
    if Path::new(ALSA).is_file() {
        candidates.push(("aplay", os_args([ALSA])));
    }
    spawn_first(candidates)
}

#[cfg(all(unix, not(target_os = "macos")))]
fn custom_sound_players(path: &Path) -> Vec<(&'static str, Vec<OsString>)> {
    vec![
        (
            "ffplay",
            vec!["-nodisp".into(), "-autoexit".into(), path.into()],
        ),
        ("paplay", vec![path.into()]),
        ("aplay", vec![path.into()]),
    ]
}

#[cfg(all(unix, not(target_os = "macos")))]
fn toast_command(message: &str) -> (&'static str, Vec<OsString>) {
    (
        "notify-send",
        vec![TOAST_TITLE.into(), OsString::from(message)],
    )
}

// ---------------------------------------------------------------------------
// macOS
// ---------------------------------------------------------------------------

#[cfg(target_os = "macos")]
fn play_stock_sound() -> Result<()> {
    spawn_first(vec![(
        "afplay",
        os_args(["/System/Library/Sounds/Glass.aiff"]),
    )])
}

#[cfg(target_os = "macos")]
fn custom_sound_players(path: &Path) -> Vec<(&'static str, Vec<OsString>)> {
    vec![
        (
            "ffplay",
            vec!["-nodisp".into(), "-autoexit".into(), path.into()],
        ),
        ("afplay", vec![path.into()]),
    ]
}

#[cfg(target_os = "macos")]
fn toast_command(message: &str) -> (&'static str, Vec<OsString>) {
    let safe = message.replace('"', "\\\"");
    let script = format!("display notification \"{safe}\" with title \"{TOAST_TITLE}\"");
    ("osascript", vec!["-e".into(), script.into()])
}

// ---------------------------------------------------------------------------
// Windows
// ---------------------------------------------------------------------------

#[cfg(windows)]
fn play_stock_sound() -> Result<()> {
    spawn_first(vec![(
        "powershell",
        os_args([
            "-NoProfile",
            "-ExecutionPolicy",
            "Bypass",
            "-Command",
            "[console]::beep(880,300)",
        ]),
    )])
}

#[cfg(windows)]
fn custom_sound_players(path: &Path) -> Vec<(&'static str, Vec<OsString>)> {
    // MediaPlayer waits roughly for the clip length, capped at 30 seconds
    let safe = path.display().to_string().replace('\'', "''");
    let script = format!(
        "$u='{safe}';\
         Add-Type -AssemblyName PresentationCore;\
         $m=New-Object System.Windows.Media.MediaPlayer;\
         $m.Open([uri]$u); $m.Play();\
         $max=[datetime]::UtcNow.AddSeconds(30);\
         while(-not $m.NaturalDuration.HasTimeSpan -and [datetime]::UtcNow -lt $max){{ Start-Sleep -Milliseconds 100 }}\
         if($m.NaturalDuration.HasTimeSpan){{\
           $dur=$m.NaturalDuration.TimeSpan.TotalSeconds;\
           Start-Sleep -Seconds ([Math]::Min([double]$dur,30));\
         }} else {{ Start-Sleep -Seconds 2 }}"
    );
    vec![
        (
            "ffplay",
            vec!["-nodisp".into(), "-autoexit".into(), path.into()],
        ),
        (
            "powershell",
            vec![
                "-NoProfile".into(),
                "-ExecutionPolicy".into(),
                "Bypass".into(),
                "-Command".into(),
                script.into(),
            ],
        ),
    ]
}

#[cfg(windows)]
fn toast_command(message: &str) -> (&'static str, Vec<OsString>) {
    let safe = message.replace('\'', "''");
    let script = format!(
        "try {{ Import-Module BurntToast -ErrorAction Stop; \
         New-BurntToastNotification -Text '{TOAST_TITLE}', '{safe}' ; exit 0 }} \
         catch {{ exit 0 }}"
    );
    (
        "powershell",
        vec![
            "-NoProfile".into(),
            "-ExecutionPolicy".into(),
            "Bypass".into(),
            "-Command".into(),
            script.into(),
        ],
    )
}

// ---------------------------------------------------------------------------
// Test double
// ---------------------------------------------------------------------------

/// Recording notifier for tests in this and downstream crates.
#[derive(Debug, Default)]
pub struct MockNotifier {
    sounds: std::sync::atomic::AtomicUsize,
    toasts: std::sync::Mutex<Vec<String>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sounds played so far.
    pub fn sound_count(&self) -> usize {
        self.sounds.load(std::sync::atomic::Ordering::SeqCst)
    }

    /// Toast messages shown so far, in order.
    pub fn toast_messages(&self) -> Vec<String> {
        self.toasts.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl DesktopNotifier for MockNotifier {
    async fn play_sound(&self) -> Result<()> {
        self.sounds
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }

    async fn show_toast(&self, message: &str) -> Result<()> {
        if let Ok(mut toasts) = self.toasts.lock() {
            toasts.push(message.to_string());
        }
        Ok(())
    }
}
