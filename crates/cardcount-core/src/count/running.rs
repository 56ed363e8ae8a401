use crate::model::card::Card;

/// Hi-Lo running count over confirmed cards: +1 for Two through Nine, -1 for
/// Ten through Ace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CountEngine {
    running: i32,
}

impl CountEngine {
    pub const fn new() -> Self {
        Self { running: 0 }
    }

    /// Fold newly registered cards into the count and return the new value.
    /// The update is a sum, so batch order does not matter.
    pub fn update_on_registration<'a, I>(&mut self, newly_registered: I) -> i32
    where
        I: IntoIterator<Item = &'a Card>,
    {
        self.running += newly_registered
            .into_iter()
            .map(|card| card.rank.hi_lo_value())
            .sum::<i32>();
        self.running
    }

    pub const fn current(&self) -> i32 {
        self.running
    }
}
