//! # dobble-engine: Symbol-Matching Game Core
//!
//! Rules engine for a Spot-it style game: every card a player is dealt shares
//! exactly one symbol with the face-up top card, and the first player to clear
//! their hand wins. Players can also spend swap, freeze and reroll abilities
//! that are limited by charges and by cooldowns measured in card plays.
//!
//! ## Core Modules
//!
//! - [`cards`] - Symbol and Card types
//! - [`deck`] - Seeded card generation with the shared-symbol guarantee
//! - [`engine`] - Action validation and application, win detection
//! - [`game`] - Read-only snapshots of the whole game
//! - [`player`] - Player state, abilities and actions
//! - [`rules`] - Tunable rules, their validation, and return codes
//! - [`logger`] - JSONL action log
//! - [`errors`] - Error types for match setup
//!
//! ## Quick Start
//!
//! ```rust
//! use dobble_engine::engine::GameEngine;
//! use dobble_engine::player::{Action, Seat};
//! use dobble_engine::rules::{GameRules, ReturnCode};
//!
//! let seats = vec![Seat::new(0, "ana"), Seat::new(1, "bo")];
//! let mut engine = GameEngine::new(seats, GameRules::default(), Some(42)).unwrap();
//!
//! // abilities start on cooldown
//! assert_eq!(engine.apply_action(1, Action::Reroll), ReturnCode::CooldownActive);
//! ```
//!
//! ## Deterministic Dealing
//!
//! ```rust
//! use dobble_engine::deck::Deck;
//! use dobble_engine::rules::GameRules;
//!
//! let rules = GameRules::default();
//! let mut a = Deck::new_with_seed(42, &rules).unwrap();
//! let mut b = Deck::new_with_seed(42, &rules).unwrap();
//! assert_eq!(a.draw_starting_card(), b.draw_starting_card());
//! ```

pub mod cards;
pub mod deck;
pub mod engine;
pub mod errors;
pub mod game;
pub mod logger;
pub mod player;
pub mod rules;
