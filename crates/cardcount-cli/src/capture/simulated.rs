use cardcount_core::model::{Card, Deck};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use super::frames::Frame;
use super::{RecognitionBackend, TransportError};
use crate::config::SimulationConfig;

/// Offline stand-in for the recognition server.
///
/// Deals a shuffled deck one card at a time. Each card stays in view for
/// `frames_per_card` captures and each capture misreads it as a random card
/// with probability `misread_rate`. Once the deck runs out every reply is
/// empty.
pub struct SimulatedBackend {
    dealt: Vec<Card>,
    position: usize,
    frames_shown: usize,
    frames_per_card: usize,
    misread_rate: f64,
    rng: StdRng,
}

impl SimulatedBackend {
    pub fn new(config: &SimulationConfig) -> Self {
        let seed = config.seed.unwrap_or(0);
        Self {
            dealt: Deck::shuffled_with_seed(seed).into_cards(),
            position: 0,
            frames_shown: 0,
            frames_per_card: config.frames_per_card.max(1),
            misread_rate: config.misread_rate.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed ^ 0x5eed_cafe),
        }
    }

    /// Card currently in front of the camera.
    pub fn showing(&self) -> Option<Card> {
        self.dealt.get(self.position).copied()
    }

    fn next_detection(&mut self) -> Option<Card> {
        let card = self.showing()?;
        self.frames_shown += 1;
        if self.frames_shown >= self.frames_per_card {
            self.frames_shown = 0;
            self.position += 1;
        }

        if self.misread_rate > 0.0 && self.rng.gen_bool(self.misread_rate) {
            let index = self.rng.gen_range(0..self.dealt.len());
            return Some(self.dealt[index]);
        }
        Some(card)
    }
}

impl RecognitionBackend for SimulatedBackend {
    fn name(&self) -> &str {
        "simulated"
    }

    fn recognize(&mut self, _frame: &Frame) -> Result<String, TransportError> {
        let result: Vec<_> = self
            .next_detection()
            .into_iter()
            .map(|card| json!({ "suit": card.suit.code(), "rank": card.rank.to_string() }))
            .collect();
        Ok(json!({ "result": result }).to_string())
    }
}
