//! Terminal rendering of cards, game states and return codes.
//!
//! ## Example
//!
//! ```rust
//! use dobble_engine::cards::{Card, Symbol};
//! use dobble_cli::formatters::format_card_highlight;
//!
//! let card = Card::new(vec![Symbol(3), Symbol(9), Symbol(14)]).unwrap();
//! assert_eq!(format_card_highlight(&card, Some(Symbol(9))), "[3 *9* 14]");
//! ```

use dobble_engine::cards::{Card, Symbol};
use dobble_engine::game::{GameSnapshot, PlayerSnapshot};
use dobble_engine::player::PlayerId;
use dobble_engine::rules::ReturnCode;

/// Card with one symbol marked, e.g. the one it shares with the top card.
pub fn format_card_highlight(card: &Card, highlight: Option<Symbol>) -> String {
    let parts: Vec<String> = card
        .symbols()
        .iter()
        .map(|s| {
            if Some(*s) == highlight {
                format!("*{s}*")
            } else {
                s.to_string()
            }
        })
        .collect();
    format!("[{}]", parts.join(" "))
}

fn format_abilities(p: &PlayerSnapshot) -> String {
    let one = |name: &str, a: &dobble_engine::player::AbilityState| {
        if a.charges == 0 {
            format!("{name}: spent")
        } else if a.cooldown > 0 {
            format!("{name}: {}x, ready in {}", a.charges, a.cooldown)
        } else {
            format!("{name}: {}x, ready", a.charges)
        }
    };
    format!(
        "{}; {}; {}",
        one("swap", &p.swap),
        one("freeze", &p.freeze),
        one("reroll", &p.reroll)
    )
}

/// Multi-line view of a state from `me`'s seat.
pub fn format_state(state: &GameSnapshot, me: PlayerId) -> String {
    let mut lines = vec![format!("Top card: {}", state.top_card)];
    for p in &state.players {
        let marker = if p.id == me { ">" } else { " " };
        let shared = state.top_card.shared_symbols(&p.card).first().copied();
        let frozen = if p.is_frozen() {
            format!(" FROZEN({})", p.is_frozen_count)
        } else {
            String::new()
        };
        lines.push(format!(
            "{marker} #{} {:<12} cards left: {:>2}  {}{}",
            p.id,
            p.name,
            p.cards_in_hand_count,
            format_card_highlight(&p.card, if p.id == me { shared } else { None }),
            frozen
        ));
        if p.id == me {
            lines.push(format!("    {}", format_abilities(p)));
        }
    }
    lines.join("\n")
}

pub fn format_code(code: ReturnCode) -> String {
    if code.is_success() {
        "OK".to_string()
    } else {
        format!("Rejected: {}", code.as_str())
    }
}
