//! framewatch - Render completion notifier
//!
//! Watches the image files an external renderer writes and reports
//! progress, completion, and apparent cancellation to a Discord webhook
//! and the local desktop. The renderer is never touched; everything is
//! inferred from the output directory.
//!
//! ## Usage
//!
//! ```bash
//! # Watch an animation's output
//! framewatch watch --template /renders/shot_####.png --start 1 --end 240
//!
//! # Watch a single still
//! framewatch watch --template /renders/beauty.png --frame 42
//!
//! # Exercise the sinks without rendering anything
//! framewatch test discord
//! framewatch test sound
//! framewatch test toast
//! ```
//!
//! `watch` exits 0 when the render completes and 2 when it is judged
//! canceled, so wrapper scripts can tell the two apart.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgGroup, Args, Parser, Subcommand};
use tracing::{error, info};

use framewatch_core::{Config, LogGuard, WatchError, init_logging};
use framewatch_notify::{DesktopNotifier, DiscordWebhook, SystemNotifier};
use framewatch_watch::{ArmRequest, RenderWatcher, WatchMode, WatchOutcome};

/// Exit code for a render judged canceled, distinct from plain failure.
const EXIT_CANCELED: u8 = 2;

/// framewatch render watcher
///
/// Polls an output directory for the frames an external renderer is
/// expected to produce and keeps one live status card updated.
#[derive(Parser, Debug)]
#[command(name = "framewatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging (increases log level)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Directory for log files (defaults to ~/.framewatch/logs/)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Watch one render job until it completes or stalls out
    Watch(WatchArgs),

    /// Send a test through one reporting sink, then exit
    Test {
        #[command(subcommand)]
        sink: TestSink,

        #[command(flatten)]
        overrides: ConfigOverrides,
    },
}

#[derive(Args, Debug)]
#[command(group = ArgGroup::new("mode").required(true).args(["start", "frame"]))]
struct WatchArgs {
    /// Output path template; a run of `#` marks the frame number slot
    #[arg(long)]
    template: PathBuf,

    /// First frame of an animation
    #[arg(long, requires = "end")]
    start: Option<i64>,

    /// Last frame of an animation
    #[arg(long, requires = "start")]
    end: Option<i64>,

    /// Single still frame to watch instead of a range
    #[arg(long)]
    frame: Option<i64>,

    /// Label shown on notifications (defaults to the template file stem)
    #[arg(long)]
    label: Option<String>,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

#[derive(Subcommand, Debug)]
enum TestSink {
    /// Post a test message to the configured webhook
    Discord,
    /// Play the completion sound
    Sound,
    /// Show a desktop toast
    Toast,
}

/// Config-file settings that can be overridden from the command line.
#[derive(Args, Debug)]
struct ConfigOverrides {
    /// Configuration file (defaults to ~/.framewatch/config.yaml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Discord webhook URL, overriding the config file
    #[arg(long)]
    webhook_url: Option<String>,

    /// Seconds between filesystem polls
    #[arg(long)]
    check_interval: Option<f64>,

    /// Seconds the final file must hold still before the job counts as done
    #[arg(long)]
    stable_delay: Option<f64>,

    /// Minimum seconds between progress card edits
    #[arg(long)]
    update_interval: Option<f64>,
}

impl ConfigOverrides {
    fn load(&self) -> framewatch_core::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(url) = &self.webhook_url {
            config = config.with_webhook_url(url.clone());
        }
        if let Some(secs) = self.check_interval {
            config = config.with_check_interval(secs);
        }
        if let Some(secs) = self.stable_delay {
            config = config.with_stable_delay(secs);
        }
        if let Some(secs) = self.update_interval {
            config = config.with_update_interval(secs);
        }
        // CLI values go through the same range checks as the file.
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard: LogGuard = match init_logging(cli.log_dir.clone(), cli.verbose > 0) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            return ExitCode::from(1);
        }
    };

    match cli.command {
        Command::Watch(args) => run_watch(args).await,
        Command::Test { sink, overrides } => run_test(sink, overrides).await,
    }
}

async fn run_watch(args: WatchArgs) -> ExitCode {
    let config = match args.overrides.load() {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };

    let mode = if let (Some(first), Some(last)) = (args.start, args.end) {
        WatchMode::Animation { first, last }
    } else if let Some(frame) = args.frame {
        WatchMode::SingleFrame { frame }
    } else {
        // The arg group makes this unreachable, but degrade politely.
        eprintln!("Error: provide --start and --end, or --frame");
        return ExitCode::from(1);
    };

    let desktop = Arc::new(SystemNotifier::new(config.desktop.clone()));
    let mut watcher = match RenderWatcher::new(config, desktop) {
        Ok(watcher) => watcher,
        Err(e) => return fail(&e),
    };
    if let Err(e) = watcher.arm(ArmRequest {
        template: args.template,
        mode,
        label: args.label,
    }) {
        return fail(&e);
    }

    tokio::select! {
        outcome = watcher.run() => match outcome {
            Ok(WatchOutcome::Completed) => {
                info!("watch finished: render completed");
                ExitCode::SUCCESS
            }
            Ok(WatchOutcome::Canceled) => {
                info!("watch finished: render canceled");
                ExitCode::from(EXIT_CANCELED)
            }
            Err(e) => fail(&e),
        },
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted; the render itself is unaffected");
            eprintln!("Interrupted.");
            ExitCode::from(130)
        }
    }
}

async fn run_test(sink: TestSink, overrides: ConfigOverrides) -> ExitCode {
    let config = match overrides.load() {
        Ok(config) => config,
        Err(e) => return fail(&e),
    };
    match run_sink_test(sink, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "sink test failed");
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}

async fn run_sink_test(sink: TestSink, config: &Config) -> anyhow::Result<()> {
    match sink {
        TestSink::Discord => {
            if !config.discord.enabled {
                println!("Discord notifications are disabled in the config.");
                return Ok(());
            }
            let hook = DiscordWebhook::from_config(&config.discord)?;
            hook.post_text("framewatch: **Discord test successful**")
                .await?;
            println!("Webhook accepted the test message.");
        }
        TestSink::Sound => {
            // Ignores desktop.sound on purpose so a muted config can
            // still be auditioned.
            let notifier = SystemNotifier::new(config.desktop.clone());
            notifier.play_sound().await?;
            println!("Sound command dispatched.");
        }
        TestSink::Toast => {
            if !config.desktop.toast {
                println!("Desktop toasts are disabled in the config.");
                return Ok(());
            }
            let notifier = SystemNotifier::new(config.desktop.clone());
            notifier
                .show_toast("Test notification from framewatch")
                .await?;
            println!("Toast command dispatched.");
        }
    }
    Ok(())
}

/// Log, print, and turn a watch error into an exit code.
fn fail(e: &WatchError) -> ExitCode {
    error!(error = %e, "framewatch failed");
    eprintln!("Error: {e}");
    if let Some(guidance) = e.guidance() {
        eprintln!("  {guidance}");
    }
    ExitCode::from(1)
}
