pub mod snapshot;

use crate::count::{CountEngine, RankHistogram};
use crate::model::card::Card;
use crate::recognizer::{CardRecognizer, RecognizerConfig, RecognizerConfigError, Timestamp};
use std::collections::HashSet;

pub use snapshot::SessionSnapshot;

/// Result of feeding one batch of detections through a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUpdate {
    pub newly_registered: HashSet<Card>,
    pub running_count: i32,
}

impl SessionUpdate {
    pub fn changed(&self) -> bool {
        !self.newly_registered.is_empty()
    }
}

/// One counting session: a recognizer and the count derived from it.
///
/// Starting over means building a new session; there is no reset.
#[derive(Debug, Clone, Default)]
pub struct CountingSession {
    recognizer: CardRecognizer,
    count: CountEngine,
}

impl CountingSession {
    pub fn new(config: RecognizerConfig) -> Result<Self, RecognizerConfigError> {
        Ok(Self {
            recognizer: CardRecognizer::new(config)?,
            count: CountEngine::new(),
        })
    }

    pub fn observe<I>(&mut self, at: Timestamp, raw_cards: I) -> SessionUpdate
    where
        I: IntoIterator<Item = Card>,
    {
        let newly_registered = self.recognizer.observe(at, raw_cards);
        let running_count = self.count.update_on_registration(&newly_registered);
        SessionUpdate {
            newly_registered,
            running_count,
        }
    }

    pub fn running_count(&self) -> i32 {
        self.count.current()
    }

    pub fn histogram(&self) -> RankHistogram {
        RankHistogram::from_cards(self.recognizer.registered())
    }

    pub fn recognizer(&self) -> &CardRecognizer {
        &self.recognizer
    }

    pub fn registered(&self) -> &HashSet<Card> {
        self.recognizer.registered()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }
}
