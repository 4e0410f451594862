use crate::cards::{Card, Symbol};
use crate::rules::{AbilityRules, GameRules};
use serde::{Deserialize, Serialize};

/// Stable identity of a player for the whole match.
pub type PlayerId = u32;

/// A participant as known before cards are dealt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub id: PlayerId,
    pub name: String,
}

impl Seat {
    pub fn new(id: PlayerId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// The three abilities every player can spend.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ability {
    Swap,
    Freeze,
    Reroll,
}

/// Remaining charges and cooldown of one ability.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct AbilityState {
    pub charges: u32,
    pub cooldown: u32,
}

impl AbilityState {
    pub fn from_rules(rules: &AbilityRules) -> Self {
        Self {
            charges: rules.charges,
            cooldown: rules.cooldown,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.charges > 0 && self.cooldown == 0
    }

    pub(crate) fn tick(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }
}

/// What a player asks the engine to do.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Play `symbol`, which must be on both the player's card and the top card
    PlayCard { symbol: Symbol },
    /// Exchange cards with `target`
    Swap { target: PlayerId },
    /// Freeze `target` for the configured number of card plays
    Freeze { target: PlayerId },
    /// Replace the player's own card
    Reroll,
}

/// Numeric action kinds as they travel on the wire.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PlayCard = 0,
    Swap = 1,
    Reroll = 2,
    Freeze = 3,
}

impl ActionKind {
    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<ActionKind> {
        match code {
            0 => Some(ActionKind::PlayCard),
            1 => Some(ActionKind::Swap),
            2 => Some(ActionKind::Reroll),
            3 => Some(ActionKind::Freeze),
            _ => None,
        }
    }
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::PlayCard { .. } => ActionKind::PlayCard,
            Action::Swap { .. } => ActionKind::Swap,
            Action::Freeze { .. } => ActionKind::Freeze,
            Action::Reroll => ActionKind::Reroll,
        }
    }

    /// The payload integer sent alongside the kind (0 when the kind has none).
    pub fn argument(&self) -> i64 {
        match self {
            Action::PlayCard { symbol } => symbol.id() as i64,
            Action::Swap { target } | Action::Freeze { target } => *target as i64,
            Action::Reroll => 0,
        }
    }

    /// Rebuilds an action from its wire kind and argument.
    ///
    /// Returns `None` for an unknown kind or an argument that is not a valid
    /// symbol or player id.
    ///
    /// ```
    /// use dobble_engine::player::Action;
    /// use dobble_engine::cards::Symbol;
    ///
    /// assert_eq!(Action::from_parts(0, 17), Some(Action::PlayCard { symbol: Symbol(17) }));
    /// assert_eq!(Action::from_parts(2, 999), Some(Action::Reroll));
    /// assert_eq!(Action::from_parts(9, 0), None);
    /// assert_eq!(Action::from_parts(1, -4), None);
    /// ```
    pub fn from_parts(kind: i64, argument: i64) -> Option<Action> {
        let id = || u32::try_from(argument).ok();
        match ActionKind::from_code(kind)? {
            ActionKind::PlayCard => id().map(|v| Action::PlayCard { symbol: Symbol(v) }),
            ActionKind::Swap => id().map(|target| Action::Swap { target }),
            ActionKind::Freeze => id().map(|target| Action::Freeze { target }),
            ActionKind::Reroll => Some(Action::Reroll),
        }
    }

    pub fn ability(&self) -> Option<Ability> {
        match self {
            Action::PlayCard { .. } => None,
            Action::Swap { .. } => Some(Ability::Swap),
            Action::Freeze { .. } => Some(Ability::Freeze),
            Action::Reroll => Some(Ability::Reroll),
        }
    }
}

/// Mutable per-player record. Only [`crate::engine::GameEngine`] mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    seat: Seat,
    card: Card,
    cards_in_hand_count: u32,
    swap: AbilityState,
    freeze: AbilityState,
    reroll: AbilityState,
    is_frozen_count: u32,
}

impl PlayerState {
    pub fn new(seat: Seat, card: Card, rules: &GameRules) -> Self {
        Self {
            seat,
            card,
            cards_in_hand_count: rules.starting_cards,
            swap: AbilityState::from_rules(&rules.swap),
            freeze: AbilityState::from_rules(&rules.freeze),
            reroll: AbilityState::from_rules(&rules.reroll),
            is_frozen_count: 0,
        }
    }

    pub fn id(&self) -> PlayerId {
        self.seat.id
    }

    pub fn name(&self) -> &str {
        &self.seat.name
    }

    pub fn card(&self) -> &Card {
        &self.card
    }

    pub fn cards_in_hand_count(&self) -> u32 {
        self.cards_in_hand_count
    }

    pub fn ability(&self, ability: Ability) -> &AbilityState {
        match ability {
            Ability::Swap => &self.swap,
            Ability::Freeze => &self.freeze,
            Ability::Reroll => &self.reroll,
        }
    }

    pub fn is_frozen_count(&self) -> u32 {
        self.is_frozen_count
    }

    pub fn is_frozen(&self) -> bool {
        self.is_frozen_count > 0
    }

    pub(crate) fn ability_mut(&mut self, ability: Ability) -> &mut AbilityState {
        match ability {
            Ability::Swap => &mut self.swap,
            Ability::Freeze => &mut self.freeze,
            Ability::Reroll => &mut self.reroll,
        }
    }

    pub(crate) fn card_mut(&mut self) -> &mut Card {
        &mut self.card
    }

    /// Puts `card` in hand and returns the previous one.
    pub(crate) fn replace_card(&mut self, card: Card) -> Card {
        std::mem::replace(&mut self.card, card)
    }

    pub(crate) fn clear_one_card(&mut self) {
        self.cards_in_hand_count = self.cards_in_hand_count.saturating_sub(1);
    }

    pub(crate) fn add_frozen(&mut self, turns: u32) {
        self.is_frozen_count = self.is_frozen_count.saturating_add(turns);
    }

    /// One card play elapsed: cooldowns and freezes move toward zero.
    pub(crate) fn advance(&mut self) {
        self.swap.tick();
        self.freeze.tick();
        self.reroll.tick();
        self.is_frozen_count = self.is_frozen_count.saturating_sub(1);
    }
}
