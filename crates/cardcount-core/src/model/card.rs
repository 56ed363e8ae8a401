use crate::detection::ParseError;
use crate::model::rank::Rank;
use crate::model::suit::Suit;
use core::fmt;
use core::str::FromStr;
use serde::{Deserialize, Serialize};

/// A (rank, suit) pair. There is no per-physical-card identity: two values with
/// the same rank and suit are the same card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }

    /// Build a card from the server's suit and rank codes. Either code failing
    /// rejects the whole card.
    pub fn from_codes(suit: &str, rank: &str) -> Result<Self, ParseError> {
        let suit = Suit::from_code(suit)?;
        let rank = Rank::from_code(rank)?;
        Ok(Self::new(rank, suit))
    }

    pub fn name(self) -> String {
        format!("{} of {}", self.rank.name(), self.suit.name())
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank, self.suit)
    }
}

impl FromStr for Card {
    type Err = ParseError;

    /// Parses the `Display` form, e.g. `KH` or `10s`. Hand-written input is
    /// trimmed and upper-cased before the server codes are matched.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        let trimmed = normalized.as_str();
        let Some(split) = trimmed.char_indices().last().map(|(idx, _)| idx) else {
            return Err(ParseError::InvalidCard(s.to_string()));
        };
        if split == 0 {
            return Err(ParseError::InvalidCard(s.to_string()));
        }
        let (rank, suit) = trimmed.split_at(split);
        Card::from_codes(suit, rank)
    }
}
