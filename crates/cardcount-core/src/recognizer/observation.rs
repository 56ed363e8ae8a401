use crate::model::card::Card;
use crate::recognizer::timestamp::Timestamp;
use std::collections::{HashMap, VecDeque};
use std::time::Duration;

/// Per-card observation history, oldest first.
///
/// Only timestamps inside the trailing window are retained: every call to
/// [`ObservationLog::record`] drops entries older than the window relative to
/// the new observation before counting.
#[derive(Debug, Clone, Default)]
pub struct ObservationLog {
    history: HashMap<Card, VecDeque<Timestamp>>,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observation and return how many of the card's retained
    /// observations fall within `window` of `at` (the new one included).
    pub fn record(&mut self, card: Card, at: Timestamp, window: Duration) -> usize {
        let entries = self.history.entry(card).or_default();
        entries.push_back(at);
        while let Some(&oldest) = entries.front() {
            if at.saturating_since(oldest) > window {
                entries.pop_front();
            } else {
                break;
            }
        }
        entries
            .iter()
            .filter(|&&seen| at.saturating_since(seen) <= window)
            .count()
    }

    pub fn recent(&self, card: Card) -> impl Iterator<Item = Timestamp> + '_ {
        self.history
            .get(&card)
            .into_iter()
            .flat_map(|entries| entries.iter().copied())
    }

    pub fn len(&self, card: Card) -> usize {
        self.history.get(&card).map_or(0, VecDeque::len)
    }

    pub fn tracked_cards(&self) -> usize {
        self.history.len()
    }

    pub fn total_observations(&self) -> usize {
        self.history.values().map(VecDeque::len).sum()
    }
}
