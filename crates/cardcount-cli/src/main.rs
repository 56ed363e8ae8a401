use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;

use anyhow::{Context, Result};
use cardcount_cli::capture::{
    CaptureLoop, DiskFrames, FrameSource, HttpBackend, PlaceholderFrames, RecognitionBackend,
    SessionClock, SimulatedBackend,
};
use cardcount_cli::config::{BackendKind, CardCountConfig, HudOutput};
use cardcount_cli::logging::init_logging;
use cardcount_cli::replay::replay_trace;
use cardcount_core::session::CountingSession;
use cardcount_hud::HudFrame;
use clap::{Parser, Subcommand};

/// Card-counting overlay driver: confirms cards from noisy recognitions and
/// keeps a running count.
#[derive(Debug, Parser)]
#[command(name = "cardcount", author, version, about = "Debounced card counting")]
struct Cli {
    /// Path to the YAML configuration file (built-in defaults when omitted).
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Override the tracing level (trace, debug, info, warn, error).
    #[arg(long, value_name = "LEVEL", global = true)]
    log_level: Option<String>,

    /// Print the HUD as JSON instead of text.
    #[arg(long, global = true)]
    json: bool,

    /// Exit after validating the configuration.
    #[arg(long, global = true)]
    validate_only: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Capture on demand: every line on stdin triggers one cycle, `q` quits.
    Run {
        /// Recognition backend to use.
        #[arg(long, value_parser = ["http", "simulated"])]
        backend: Option<String>,

        /// Override the recognition server URL (implies the http backend).
        #[arg(long, value_name = "URL")]
        server: Option<String>,

        /// Image file or directory standing in for the camera.
        #[arg(long, value_name = "PATH")]
        frames: Option<PathBuf>,

        /// Override the simulation seed.
        #[arg(long, value_name = "SEED")]
        seed: Option<u64>,

        /// Run this many cycles without waiting for input, on a stepped clock.
        #[arg(long, value_name = "CYCLES")]
        auto: Option<usize>,
    },
    /// Replay a JSONL detection trace and print the resulting HUD.
    Replay {
        #[arg(value_name = "TRACE")]
        trace: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = match cli.config.as_ref() {
        Some(path) => CardCountConfig::from_path(path)?,
        None => CardCountConfig::default(),
    };

    if let Some(level) = cli.log_level.clone() {
        config.logging.tracing_level = level;
    }
    if cli.json {
        config.hud.output = HudOutput::Json;
    }
    if let Some(Command::Run {
        backend,
        server,
        frames,
        seed,
        ..
    }) = cli.command.as_ref()
    {
        if let Some(server) = server {
            config.capture.server_url = Some(server.clone());
            config.capture.backend = BackendKind::Http;
        }
        match backend.as_deref() {
            Some("http") => config.capture.backend = BackendKind::Http,
            Some("simulated") => config.capture.backend = BackendKind::Simulated,
            _ => {}
        }
        if let Some(frames) = frames {
            config.capture.frames = Some(frames.clone());
        }
        if let Some(seed) = seed {
            config.simulation.seed = Some(*seed);
        }
    }

    config.validate()?;

    if cli.validate_only {
        println!(
            "Configuration '{}' is valid ({} backend).",
            config.session_id,
            backend_label(config.capture.backend)
        );
        return Ok(());
    }

    let _logging_guard = init_logging(&config.logging, &config.resolved_log_dir())?;
    let session = CountingSession::new(config.recognizer_config())?;

    match cli.command {
        Some(Command::Replay { trace }) => replay(&config, session, trace),
        Some(Command::Run { auto, .. }) => run(&config, session, auto),
        None => run(&config, session, None),
    }
}

fn run(config: &CardCountConfig, session: CountingSession, auto: Option<usize>) -> Result<()> {
    let (frames, backend): (Box<dyn FrameSource>, Box<dyn RecognitionBackend>) =
        match config.capture.backend {
            BackendKind::Http => {
                let url = config
                    .capture
                    .server_url
                    .clone()
                    .context("http backend requires a server URL")?;
                let path = config
                    .capture
                    .frames
                    .clone()
                    .context("http backend requires a frames path")?;
                let frames = DiskFrames::open(&path)
                    .with_context(|| format!("opening frames at {}", path.display()))?;
                let backend = HttpBackend::new(url, config.capture.timeout())?;
                (
                    Box::new(frames) as Box<dyn FrameSource>,
                    Box::new(backend) as Box<dyn RecognitionBackend>,
                )
            }
            BackendKind::Simulated => (
                Box::new(PlaceholderFrames::default()) as Box<dyn FrameSource>,
                Box::new(SimulatedBackend::new(&config.simulation)) as Box<dyn RecognitionBackend>,
            ),
        };

    let clock = if auto.is_some() {
        SessionClock::stepped(config.capture.interval())
    } else {
        SessionClock::wall()
    };
    let mut capture = CaptureLoop::new(session, frames, backend, clock)
        .with_hud(config.hud.saturation, config.hud.output);

    let stdout = io::stdout();
    match auto {
        Some(cycles) => capture.run_auto(cycles, stdout.lock())?,
        None => {
            eprintln!("Press Enter to capture, q to quit.");
            capture.run_triggers(io::stdin().lock(), stdout.lock())?;
        }
    }

    let stats = capture.stats();
    eprintln!(
        "Session '{}' finished: {} cycles, {} detections, {} rejected replies, {} rejected entries, {} cards registered, running count {}",
        config.session_id,
        stats.cycles,
        stats.detections,
        stats.rejected,
        stats.rejected_entries,
        stats.registrations,
        capture.session().running_count()
    );
    Ok(())
}

fn replay(config: &CardCountConfig, mut session: CountingSession, trace: PathBuf) -> Result<()> {
    let file = File::open(&trace).with_context(|| format!("opening trace {}", trace.display()))?;
    let summary = replay_trace(BufReader::new(file), &mut session)?;

    let frame = HudFrame::from_session(&session, config.hud.saturation);
    match config.hud.output {
        HudOutput::Text => print!("{}", frame.to_text()),
        HudOutput::Json => println!("{}", frame.to_json()?),
    }
    eprintln!(
        "Replayed {} entries ({} observations, {} rejected replies): {} cards registered",
        summary.entries, summary.observations, summary.rejected_replies, summary.registrations
    );
    Ok(())
}

fn backend_label(kind: BackendKind) -> &'static str {
    match kind {
        BackendKind::Http => "http",
        BackendKind::Simulated => "simulated",
    }
}
