use crate::model::card::Card;
use crate::recognizer::observation::ObservationLog;
use crate::recognizer::timestamp::Timestamp;
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;
use tracing::{Level, event};

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(30);
pub const DEFAULT_THRESHOLD: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecognizerConfig {
    /// Trailing interval over which observations are tallied.
    pub window: Duration,
    /// A card registers once strictly more than this many observations fall
    /// inside the window.
    pub threshold: usize,
}

impl RecognizerConfig {
    pub fn validate(&self) -> Result<(), RecognizerConfigError> {
        if self.window.is_zero() {
            return Err(RecognizerConfigError::ZeroWindow);
        }
        if self.threshold == 0 {
            return Err(RecognizerConfigError::ZeroThreshold);
        }
        Ok(())
    }
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RecognizerConfigError {
    #[error("confirmation window must be greater than zero")]
    ZeroWindow,
    #[error("confirmation threshold must be at least 1")]
    ZeroThreshold,
}

/// Turns noisy per-frame detections into a set of confirmed cards.
///
/// Assumes a single deck: repeated detections of the same card strengthen the
/// evidence for that card rather than describing distinct cards.
#[derive(Debug, Clone)]
pub struct CardRecognizer {
    config: RecognizerConfig,
    observations: ObservationLog,
    registered: HashSet<Card>,
    last_seen_at: Option<Timestamp>,
}

impl CardRecognizer {
    pub fn new(config: RecognizerConfig) -> Result<Self, RecognizerConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            observations: ObservationLog::new(),
            registered: HashSet::new(),
            last_seen_at: None,
        })
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    /// Record one batch of raw detections captured at `at` and return the cards
    /// that became registered during this call.
    ///
    /// Every element of `raw_cards` is a separate observation, so a card listed
    /// twice in one batch is counted twice.
    pub fn observe<I>(&mut self, at: Timestamp, raw_cards: I) -> HashSet<Card>
    where
        I: IntoIterator<Item = Card>,
    {
        if let Some(previous) = self.last_seen_at
            && at < previous
        {
            event!(
                target: "cardcount::recognizer",
                Level::DEBUG,
                %at,
                %previous,
                "observation timestamp moved backwards"
            );
        }

        let mut newly_registered = HashSet::new();
        for card in raw_cards {
            let recent = self.observations.record(card, at, self.config.window);
            if recent > self.config.threshold && self.registered.insert(card) {
                event!(
                    target: "cardcount::recognizer",
                    Level::INFO,
                    card = %card,
                    recent,
                    %at,
                    "card registered"
                );
                newly_registered.insert(card);
            }
        }

        self.last_seen_at = Some(self.last_seen_at.map_or(at, |previous| previous.max(at)));
        newly_registered
    }

    pub fn registered(&self) -> &HashSet<Card> {
        &self.registered
    }

    pub fn is_registered(&self, card: Card) -> bool {
        self.registered.contains(&card)
    }

    pub fn observations(&self) -> &ObservationLog {
        &self.observations
    }
}

impl Default for CardRecognizer {
    fn default() -> Self {
        Self {
            config: RecognizerConfig::default(),
            observations: ObservationLog::new(),
            registered: HashSet::new(),
            last_seen_at: None,
        }
    }
}
