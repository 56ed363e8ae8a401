//! One capture cycle: grab a frame, send it for recognition, decode the reply
//! and feed the detections to the session. Every failure degrades to "no new
//! information this cycle".

pub mod frames;
pub mod http;
pub mod simulated;

use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use cardcount_core::detection::{ParseError, parse_response};
use cardcount_core::model::Card;
use cardcount_core::recognizer::Timestamp;
use cardcount_core::session::{CountingSession, SessionUpdate};
use cardcount_hud::HudFrame;
use serde::Serialize;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::HudOutput;

pub use frames::{DiskFrames, Frame, FrameError, FrameSource, PlaceholderFrames};
pub use http::HttpBackend;
pub use simulated::SimulatedBackend;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("recognition request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("recognition server {url} answered HTTP {status}")]
    Status { status: u16, url: String },
}

/// Anything that turns a frame into a recognition reply body.
pub trait RecognitionBackend {
    fn name(&self) -> &str;
    fn recognize(&mut self, frame: &Frame) -> Result<String, TransportError>;
}

/// Source of observation timestamps. Wall time for interactive use, or a fixed
/// step per capture for scripted runs.
#[derive(Debug, Clone)]
pub enum SessionClock {
    Wall { started: Instant },
    Stepped { now: Timestamp, step: Duration },
}

impl SessionClock {
    pub fn wall() -> Self {
        SessionClock::Wall {
            started: Instant::now(),
        }
    }

    pub fn stepped(step: Duration) -> Self {
        SessionClock::Stepped {
            now: Timestamp::ZERO,
            step,
        }
    }

    /// Timestamp for the capture about to happen.
    pub fn tick(&mut self) -> Timestamp {
        match self {
            SessionClock::Wall { started } => Timestamp::from_duration(started.elapsed()),
            SessionClock::Stepped { now, step } => {
                let current = *now;
                *now = Timestamp::from_duration(now.offset() + *step);
                current
            }
        }
    }
}

#[derive(Debug)]
pub enum CaptureOutcome {
    Detected {
        cards: Vec<Card>,
        rejected: usize,
    },
    /// Nothing usable in the reply. `rejected` counts batch entries that
    /// failed to decode.
    Empty {
        rejected: usize,
    },
    Rejected(ParseError),
    TransportFailure(TransportError),
    FrameUnavailable(FrameError),
}

impl CaptureOutcome {
    pub fn cards(&self) -> &[Card] {
        match self {
            CaptureOutcome::Detected { cards, .. } => cards,
            _ => &[],
        }
    }
}

#[derive(Debug)]
pub struct CycleReport {
    pub at: Timestamp,
    pub outcome: CaptureOutcome,
    pub update: SessionUpdate,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct CycleStats {
    pub cycles: u64,
    pub detections: u64,
    pub empty: u64,
    pub rejected: u64,
    pub rejected_entries: u64,
    pub transport_failures: u64,
    pub frame_failures: u64,
    pub registrations: u64,
}

impl CycleStats {
    fn record(&mut self, report: &CycleReport) {
        self.cycles += 1;
        match &report.outcome {
            CaptureOutcome::Detected { cards, rejected } => {
                self.detections += cards.len() as u64;
                self.rejected_entries += *rejected as u64;
            }
            CaptureOutcome::Empty { rejected } => {
                self.empty += 1;
                self.rejected_entries += *rejected as u64;
            }
            CaptureOutcome::Rejected(_) => self.rejected += 1,
            CaptureOutcome::TransportFailure(_) => self.transport_failures += 1,
            CaptureOutcome::FrameUnavailable(_) => self.frame_failures += 1,
        }
        self.registrations += report.update.newly_registered.len() as u64;
    }
}

/// Owns the session and runs capture cycles strictly one after another.
pub struct CaptureLoop {
    session: CountingSession,
    frames: Box<dyn FrameSource>,
    backend: Box<dyn RecognitionBackend>,
    clock: SessionClock,
    saturation: u32,
    output: HudOutput,
    stats: CycleStats,
}

impl CaptureLoop {
    pub fn new(
        session: CountingSession,
        frames: Box<dyn FrameSource>,
        backend: Box<dyn RecognitionBackend>,
        clock: SessionClock,
    ) -> Self {
        event!(
            target: "cardcount::capture",
            Level::INFO,
            backend = backend.name(),
            "capture loop ready"
        );
        Self {
            session,
            frames,
            backend,
            clock,
            saturation: cardcount_hud::DEFAULT_SATURATION,
            output: HudOutput::Text,
            stats: CycleStats::default(),
        }
    }

    pub fn with_hud(mut self, saturation: u32, output: HudOutput) -> Self {
        self.saturation = saturation;
        self.output = output;
        self
    }

    pub fn session(&self) -> &CountingSession {
        &self.session
    }

    pub fn stats(&self) -> CycleStats {
        self.stats
    }

    pub fn hud_frame(&self) -> HudFrame {
        HudFrame::from_session(&self.session, self.saturation)
    }

    /// Run exactly one capture, recognize, decode, observe cycle.
    pub fn run_cycle(&mut self) -> CycleReport {
        let at = self.clock.tick();
        let outcome = self.capture();
        let update = self.session.observe(at, outcome.cards().iter().copied());
        log_outcome(at, &outcome, &update);

        let report = CycleReport {
            at,
            outcome,
            update,
        };
        self.stats.record(&report);
        report
    }

    /// One cycle per input line until EOF or a line reading `q`. The HUD is
    /// redrawn after every cycle that registered a card.
    pub fn run_triggers<R: BufRead, W: Write>(&mut self, input: R, mut out: W) -> io::Result<()> {
        self.render(&mut out)?;
        for line in input.lines() {
            let line = line?;
            if line.trim().eq_ignore_ascii_case("q") {
                break;
            }
            let report = self.run_cycle();
            if report.update.changed() {
                self.render(&mut out)?;
            }
        }
        Ok(())
    }

    /// Run `cycles` captures back to back and render once at the end.
    pub fn run_auto<W: Write>(&mut self, cycles: usize, mut out: W) -> io::Result<()> {
        for _ in 0..cycles {
            self.run_cycle();
        }
        self.render(&mut out)
    }

    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let frame = self.hud_frame();
        match self.output {
            HudOutput::Text => write!(out, "{}", frame.to_text())?,
            HudOutput::Json => {
                let json = frame.to_json().map_err(io::Error::other)?;
                writeln!(out, "{json}")?;
            }
        }
        out.flush()
    }

    fn capture(&mut self) -> CaptureOutcome {
        let frame = match self.frames.next_frame() {
            Ok(frame) => frame,
            Err(err) => return CaptureOutcome::FrameUnavailable(err),
        };
        let body = match self.backend.recognize(&frame) {
            Ok(body) => body,
            Err(err) => return CaptureOutcome::TransportFailure(err),
        };
        match parse_response(&body) {
            Ok(parsed) if parsed.is_empty() => CaptureOutcome::Empty {
                rejected: parsed.rejected.len(),
            },
            Ok(parsed) => CaptureOutcome::Detected {
                rejected: parsed.rejected.len(),
                cards: parsed.cards,
            },
            Err(err) => CaptureOutcome::Rejected(err),
        }
    }
}

fn log_outcome(at: Timestamp, outcome: &CaptureOutcome, update: &SessionUpdate) {
    match outcome {
        CaptureOutcome::Detected { cards, rejected } => {
            let seen = cards
                .iter()
                .map(Card::to_string)
                .collect::<Vec<_>>()
                .join(",");
            event!(
                target: "cardcount::capture",
                Level::DEBUG,
                %at,
                cards = %seen,
                rejected,
                "detections observed"
            );
        }
        CaptureOutcome::Empty { rejected: 0 } => {
            event!(target: "cardcount::capture", Level::INFO, %at, "no card recognized");
        }
        CaptureOutcome::Empty { rejected } => {
            event!(
                target: "cardcount::capture",
                Level::WARN,
                %at,
                rejected,
                "every detection in the reply was rejected"
            );
        }
        CaptureOutcome::Rejected(error) => {
            event!(
                target: "cardcount::capture",
                Level::WARN,
                %at,
                %error,
                "recognition reply rejected"
            );
        }
        CaptureOutcome::TransportFailure(error) => {
            event!(
                target: "cardcount::capture",
                Level::ERROR,
                %at,
                %error,
                "upload failed"
            );
        }
        CaptureOutcome::FrameUnavailable(error) => {
            event!(
                target: "cardcount::capture",
                Level::ERROR,
                %at,
                %error,
                "frame capture failed"
            );
        }
    }

    if update.changed() {
        let registered = update
            .newly_registered
            .iter()
            .map(|card| card.name())
            .collect::<Vec<_>>()
            .join(", ");
        event!(
            target: "cardcount::capture",
            Level::INFO,
            %at,
            registered = %registered,
            running_count = update.running_count,
            "count updated"
        );
    }
}
