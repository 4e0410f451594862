//! Bot that plays a random symbol from its own card.
//!
//! It often picks a symbol the top card does not carry, which makes it useful
//! for driving the rejection paths of a server under test.

use crate::Bot;
use dobble_engine::game::GameSnapshot;
use dobble_engine::player::{Action, PlayerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone)]
pub struct RandomBot {
    rng: StdRng,
}

impl RandomBot {
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomBot {
    fn default() -> Self {
        Self::new()
    }
}

impl Bot for RandomBot {
    fn choose_action(&mut self, snapshot: &GameSnapshot, me: PlayerId) -> Option<Action> {
        if snapshot.has_finished {
            return None;
        }
        let symbols = snapshot.player(me)?.card.symbols();
        if symbols.is_empty() {
            return None;
        }
        let symbol = symbols[self.rng.random_range(0..symbols.len())];
        Some(Action::PlayCard { symbol })
    }

    fn name(&self) -> &str {
        "RandomBot"
    }
}
