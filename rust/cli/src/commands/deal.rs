//! Deal command handler.
//!
//! Deals a top card and one card per player from a seeded deck and shows
//! the symbol each player shares with the top card. Useful for checking
//! deck generation without starting a server.

use crate::error::CliError;
use crate::formatters::format_card_highlight;
use dobble_engine::deck::Deck;
use dobble_engine::rules::GameRules;
use std::io::Write;

/// Handle the deal command.
///
/// # Arguments
///
/// * `seed` - Optional RNG seed for deterministic dealing
/// * `players` - Number of player cards to deal
/// * `out` - Output stream for command results
///
/// # Examples
///
/// ```ignore
/// // Internal command handler - not part of public API
/// let mut out = Vec::new();
/// handle_deal_command(Some(42), 2, &mut out).unwrap();
/// ```
pub fn handle_deal_command(
    seed: Option<u64>,
    players: usize,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    if players == 0 {
        return Err(CliError::InvalidInput(
            "players must be at least 1".to_string(),
        ));
    }
    let base_seed = seed.unwrap_or_else(rand::random);
    let rules = GameRules::default();
    let mut deck = Deck::new_with_seed(base_seed, &rules)?;

    let top = deck.draw_starting_card();
    writeln!(out, "Seed: {}", base_seed)?;
    writeln!(out, "Top: {}", top)?;
    for p in 0..players {
        let card = deck.draw_player_card(&top);
        let shared = top.shared_symbols(&card);
        let &[symbol] = shared.as_slice() else {
            return Err(CliError::Game(format!(
                "P{p} shares {} symbols with the top card",
                shared.len()
            )));
        };
        writeln!(
            out,
            "P{}: {} shares {}",
            p,
            format_card_highlight(&card, Some(symbol)),
            symbol
        )?;
    }
    Ok(())
}
