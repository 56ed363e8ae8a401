use crate::model::card::Card;
use crate::model::rank::Rank;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Registered-card tally per rank. Always reports all 13 ranks, zero included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RankHistogram {
    counts: [u32; 13],
}

impl RankHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards<'a, I>(cards: I) -> Self
    where
        I: IntoIterator<Item = &'a Card>,
    {
        let mut histogram = Self::new();
        for card in cards {
            histogram.counts[card.rank.index()] += 1;
        }
        histogram
    }

    pub fn get(&self, rank: Rank) -> u32 {
        self.counts[rank.index()]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Ranks in ascending order paired with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (Rank, u32)> + '_ {
        Rank::ORDERED
            .iter()
            .map(move |&rank| (rank, self.counts[rank.index()]))
    }
}

impl Serialize for RankHistogram {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Rank::ORDERED.len()))?;
        for (rank, count) in self.iter() {
            map.serialize_entry(rank.name(), &count)?;
        }
        map.end()
    }
}
