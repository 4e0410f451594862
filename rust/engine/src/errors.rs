use thiserror::Error;

use crate::player::PlayerId;

/// Errors raised while setting up a match.
///
/// Rule violations during play are not errors; they are reported as
/// [`crate::rules::ReturnCode`] values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Cards need at least one symbol")]
    EmptyCard,
    #[error("Players need at least one card to clear")]
    NoStartingCards,
    #[error(
        "Symbol universe of {symbols_count} is too small for {symbols_per_card} symbols per card (need {minimum})"
    )]
    UniverseTooSmall {
        symbols_count: u32,
        symbols_per_card: u32,
        minimum: u32,
    },
    #[error("A match needs at least one player")]
    NoPlayers,
    #[error("Player id {0} is used more than once")]
    DuplicatePlayer(PlayerId),
}
