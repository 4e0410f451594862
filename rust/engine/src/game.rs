use serde::{Deserialize, Serialize};

use crate::cards::{Card, Symbol};
use crate::player::{Ability, AbilityState, PlayerId, PlayerState};

/// Read-only copy of one player's state, safe to hand to other threads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub card: Card,
    pub cards_in_hand_count: u32,
    pub swap: AbilityState,
    pub freeze: AbilityState,
    pub reroll: AbilityState,
    pub is_frozen_count: u32,
}

impl PlayerSnapshot {
    pub fn ability(&self, ability: Ability) -> &AbilityState {
        match ability {
            Ability::Swap => &self.swap,
            Ability::Freeze => &self.freeze,
            Ability::Reroll => &self.reroll,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.is_frozen_count > 0
    }
}

impl From<&PlayerState> for PlayerSnapshot {
    fn from(state: &PlayerState) -> Self {
        Self {
            id: state.id(),
            name: state.name().to_string(),
            card: state.card().clone(),
            cards_in_hand_count: state.cards_in_hand_count(),
            swap: *state.ability(Ability::Swap),
            freeze: *state.ability(Ability::Freeze),
            reroll: *state.ability(Ability::Reroll),
            is_frozen_count: state.is_frozen_count(),
        }
    }
}

/// Full game state by value: the top card plus every player, in seat order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub symbols_per_card: u32,
    pub top_card: Card,
    pub players: Vec<PlayerSnapshot>,
    pub has_finished: bool,
    pub winner: Option<PlayerId>,
    /// Successful card plays so far
    pub turn: u64,
}

impl GameSnapshot {
    pub fn player(&self, id: PlayerId) -> Option<&PlayerSnapshot> {
        self.players.iter().find(|p| p.id == id)
    }

    /// The symbol `id` could play right now, if its card matches the top card.
    pub fn playable_symbol(&self, id: PlayerId) -> Option<Symbol> {
        let player = self.player(id)?;
        player.card.shared_symbols(&self.top_card).first().copied()
    }

    /// Player with the fewest cards left to clear (first in seat order on ties).
    pub fn leader(&self) -> Option<&PlayerSnapshot> {
        self.players.iter().min_by_key(|p| p.cards_in_hand_count)
    }
}
