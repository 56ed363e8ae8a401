//! Replays a recorded detection trace through a session.
//!
//! Each non-empty line is a JSON object with `at_ms` and either a raw
//! recognition `response` or an explicit `cards` list:
//!
//! ```text
//! {"at_ms": 0, "response": {"result": [{"suit": "H", "rank": "K"}]}}
//! {"at_ms": 1500, "cards": ["KH", "10S"]}
//! ```

use std::io::BufRead;

use cardcount_core::detection::{ParseError, parse_value};
use cardcount_core::model::Card;
use cardcount_core::recognizer::Timestamp;
use cardcount_core::session::CountingSession;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{Level, event};

#[derive(Debug, Deserialize)]
struct TraceLine {
    at_ms: u64,
    #[serde(default)]
    response: Option<Value>,
    #[serde(default)]
    cards: Option<Vec<String>>,
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("line {line}: failed to read trace: {source}")]
    Io {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("line {line}: invalid trace entry: {source}")]
    Json {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("line {line}: at_ms {at_ms} is earlier than the previous entry ({previous_ms})")]
    OutOfOrder {
        line: usize,
        at_ms: u64,
        previous_ms: u64,
    },
    #[error("line {line}: entry needs exactly one of \"response\" or \"cards\"")]
    Payload { line: usize },
    #[error("line {line}: {source}")]
    Card {
        line: usize,
        #[source]
        source: ParseError,
    },
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct ReplaySummary {
    pub entries: usize,
    pub observations: usize,
    pub empty_replies: usize,
    pub rejected_replies: usize,
    pub registrations: usize,
}

/// Feed every trace entry into `session`. Reply decoding failures are counted
/// and skipped, as they would be live; malformed trace lines abort the replay.
pub fn replay_trace<R: BufRead>(
    reader: R,
    session: &mut CountingSession,
) -> Result<ReplaySummary, ReplayError> {
    let mut summary = ReplaySummary::default();
    let mut previous_ms: Option<u64> = None;

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|source| ReplayError::Io {
            line: line_no,
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let entry: TraceLine = serde_json::from_str(&line).map_err(|source| ReplayError::Json {
            line: line_no,
            source,
        })?;
        if let Some(previous) = previous_ms
            && entry.at_ms < previous
        {
            return Err(ReplayError::OutOfOrder {
                line: line_no,
                at_ms: entry.at_ms,
                previous_ms: previous,
            });
        }
        previous_ms = Some(entry.at_ms);

        let cards = match (entry.response, entry.cards) {
            (Some(response), None) => match parse_value(&response) {
                Ok(parsed) => {
                    if parsed.is_empty() {
                        summary.empty_replies += 1;
                    }
                    parsed.cards
                }
                Err(error) => {
                    event!(
                        target: "cardcount::replay",
                        Level::WARN,
                        line = line_no,
                        %error,
                        "skipping undecodable reply"
                    );
                    summary.rejected_replies += 1;
                    Vec::new()
                }
            },
            (None, Some(codes)) => codes
                .iter()
                .map(|code| code.parse::<Card>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| ReplayError::Card {
                    line: line_no,
                    source,
                })?,
            _ => return Err(ReplayError::Payload { line: line_no }),
        };

        summary.entries += 1;
        summary.observations += cards.len();
        let update = session.observe(Timestamp::from_millis(entry.at_ms), cards);
        summary.registrations += update.newly_registered.len();
    }

    Ok(summary)
}
