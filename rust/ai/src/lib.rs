//! # dobble-ai: Automated Players
//!
//! Bots that look at a [`GameSnapshot`] and pick the next [`Action`] for one
//! player. They never touch the engine directly, so the same bot drives a
//! local engine in tests or a networked client.
//!
//! ## Core Components
//!
//! - [`Bot`] - Trait every automated player implements
//! - [`baseline`] - Rule-based bot that plays whenever it can
//! - [`random`] - Seeded bot that plays random symbols from its card
//! - [`create_bot`] - Factory by name
//!
//! ## Quick Start
//!
//! ```rust
//! use dobble_ai::create_bot;
//! use dobble_engine::engine::GameEngine;
//! use dobble_engine::player::Seat;
//! use dobble_engine::rules::{GameRules, ReturnCode};
//!
//! let seats = vec![Seat::new(0, "bot"), Seat::new(1, "other")];
//! let mut engine = GameEngine::new(seats, GameRules::default(), Some(42)).unwrap();
//!
//! let mut bot = create_bot("baseline", None).expect("known bot");
//! let action = bot.choose_action(&engine.snapshot(), 0).expect("dealt cards match");
//! assert_eq!(engine.apply_action(0, action), ReturnCode::Success);
//! ```

use dobble_engine::game::GameSnapshot;
use dobble_engine::player::{Action, PlayerId};

pub mod baseline;
pub mod random;

pub use baseline::BaselineBot;
pub use random::RandomBot;

/// Names accepted by [`create_bot`].
pub const BOT_KINDS: &[&str] = &["baseline", "random"];

/// An automated player.
///
/// `choose_action` is called with the latest state the player has seen and
/// returns `None` when the bot prefers to wait for the next state.
pub trait Bot: Send {
    fn choose_action(&mut self, snapshot: &GameSnapshot, me: PlayerId) -> Option<Action>;

    fn name(&self) -> &str;
}

/// Creates a bot by name. `seed` only matters for randomized bots.
///
/// ```rust
/// use dobble_ai::create_bot;
///
/// assert_eq!(create_bot("baseline", None).unwrap().name(), "BaselineBot");
/// assert!(create_bot("oracle", None).is_none());
/// ```
pub fn create_bot(kind: &str, seed: Option<u64>) -> Option<Box<dyn Bot>> {
    match kind {
        "baseline" => Some(Box::new(baseline::BaselineBot::new())),
        "random" => Some(Box::new(match seed {
            Some(seed) => random::RandomBot::with_seed(seed),
            None => random::RandomBot::new(),
        })),
        _ => None,
    }
}
