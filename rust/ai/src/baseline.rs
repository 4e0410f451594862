//! Rule-based bot.
//!
//! Priorities, first match wins:
//! 1. play the symbol shared with the top card
//! 2. freeze the opponent closest to winning when they are ahead
//! 3. reroll
//! 4. swap with an opponent whose card matches the top card
//!
//! Freezing is only considered while a reroll is also ready, so the bot can
//! always get back to a matching card without waiting for anyone else.

use crate::Bot;
use dobble_engine::game::{GameSnapshot, PlayerSnapshot};
use dobble_engine::player::{Action, PlayerId};

#[derive(Debug, Clone, Default)]
pub struct BaselineBot;

impl BaselineBot {
    pub fn new() -> Self {
        Self
    }

    fn freeze_target(snapshot: &GameSnapshot, me: &PlayerSnapshot) -> Option<PlayerId> {
        snapshot
            .players
            .iter()
            .filter(|p| p.id != me.id && !p.is_frozen())
            .min_by_key(|p| p.cards_in_hand_count)
            .filter(|p| p.cards_in_hand_count < me.cards_in_hand_count)
            .map(|p| p.id)
    }

    fn swap_target(snapshot: &GameSnapshot, me: &PlayerSnapshot) -> Option<PlayerId> {
        snapshot
            .players
            .iter()
            .filter(|p| p.id != me.id)
            .find(|p| !p.card.shared_symbols(&snapshot.top_card).is_empty())
            .map(|p| p.id)
    }
}

impl Bot for BaselineBot {
    fn choose_action(&mut self, snapshot: &GameSnapshot, me: PlayerId) -> Option<Action> {
        if snapshot.has_finished {
            return None;
        }
        let player = snapshot.player(me)?;
        // every action would bounce
        if player.is_frozen() {
            return None;
        }

        if let Some(symbol) = snapshot.playable_symbol(me) {
            return Some(Action::PlayCard { symbol });
        }

        let can_reroll = player.reroll.is_ready();
        if can_reroll && player.freeze.is_ready() {
            if let Some(target) = Self::freeze_target(snapshot, player) {
                return Some(Action::Freeze { target });
            }
        }
        if can_reroll {
            return Some(Action::Reroll);
        }
        if player.swap.is_ready() {
            if let Some(target) = Self::swap_target(snapshot, player) {
                return Some(Action::Swap { target });
            }
        }
        None
    }

    fn name(&self) -> &str {
        "BaselineBot"
    }
}
