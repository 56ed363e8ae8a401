use super::CountingSession;
use crate::count::RankHistogram;
use crate::model::card::Card;
use serde::Serialize;

/// Read-only report of a session's derived state.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSnapshot {
    pub running_count: i32,
    pub registered: Vec<Card>,
    pub histogram: RankHistogram,
    pub tracked_cards: usize,
}

impl SessionSnapshot {
    pub fn capture(session: &CountingSession) -> Self {
        let mut registered: Vec<Card> = session.registered().iter().copied().collect();
        registered.sort_by(|a, b| a.suit.cmp(&b.suit).then(a.rank.cmp(&b.rank)));
        SessionSnapshot {
            running_count: session.running_count(),
            registered,
            histogram: session.histogram(),
            tracked_cards: session.recognizer().observations().tracked_cards(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
