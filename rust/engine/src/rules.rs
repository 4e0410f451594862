use serde::{Deserialize, Serialize};

use crate::errors::GameError;

pub const DEFAULT_SYMBOLS_COUNT: u32 = 57;
pub const DEFAULT_SYMBOLS_PER_CARD: u32 = 8;
pub const DEFAULT_STARTING_CARDS: u32 = 13;
pub const DEFAULT_ABILITY_CHARGES: u32 = 1;
pub const DEFAULT_ABILITY_COOLDOWN: u32 = 3;
pub const DEFAULT_FREEZE_DURATION: u32 = 1;

/// Charge count and cooldown length for one ability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityRules {
    /// Uses available over the whole match
    pub charges: u32,
    /// Card plays that must elapse between two uses (also the initial wait)
    pub cooldown: u32,
}

impl Default for AbilityRules {
    fn default() -> Self {
        Self {
            charges: DEFAULT_ABILITY_CHARGES,
            cooldown: DEFAULT_ABILITY_COOLDOWN,
        }
    }
}

/// Tunable parameters of a match.
///
/// The defaults describe the classic 57-symbol deck with 8 symbols per card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameRules {
    pub symbols_count: u32,
    pub symbols_per_card: u32,
    pub starting_cards: u32,
    pub swap: AbilityRules,
    pub freeze: AbilityRules,
    pub reroll: AbilityRules,
    /// Card plays a single freeze keeps its target frozen
    pub freeze_duration: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            symbols_count: DEFAULT_SYMBOLS_COUNT,
            symbols_per_card: DEFAULT_SYMBOLS_PER_CARD,
            starting_cards: DEFAULT_STARTING_CARDS,
            swap: AbilityRules::default(),
            freeze: AbilityRules::default(),
            reroll: AbilityRules::default(),
            freeze_duration: DEFAULT_FREEZE_DURATION,
        }
    }
}

impl GameRules {
    /// Smallest universe that can always deal a card sharing exactly one
    /// symbol with the top card: the shared symbol plus
    /// `symbols_per_card - 1` symbols taken from outside the top card.
    pub fn minimum_symbols_count(&self) -> u32 {
        (2 * self.symbols_per_card).saturating_sub(1)
    }

    /// Checks that card generation is guaranteed to terminate.
    ///
    /// # Examples
    ///
    /// ```
    /// use dobble_engine::rules::GameRules;
    /// use dobble_engine::errors::GameError;
    ///
    /// assert!(GameRules::default().validate().is_ok());
    ///
    /// let tight = GameRules { symbols_count: 14, ..GameRules::default() };
    /// assert!(matches!(tight.validate(), Err(GameError::UniverseTooSmall { minimum: 15, .. })));
    /// ```
    pub fn validate(&self) -> Result<(), GameError> {
        if self.symbols_per_card == 0 {
            return Err(GameError::EmptyCard);
        }
        if self.starting_cards == 0 {
            return Err(GameError::NoStartingCards);
        }
        let minimum = self.minimum_symbols_count();
        if self.symbols_count < minimum {
            return Err(GameError::UniverseTooSmall {
                symbols_count: self.symbols_count,
                symbols_per_card: self.symbols_per_card,
                minimum,
            });
        }
        Ok(())
    }
}

/// Outcome of applying an action. Everything except `Success` leaves the game untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnCode {
    Success = 0,
    PlayerNotFound = 1,
    PlayerDoesNotHaveSymbol = 2,
    SymbolNotOnTopCard = 3,
    NoChargesLeft = 4,
    CooldownActive = 5,
    InvalidAction = 6,
    PlayerIsFrozen = 7,
}

impl ReturnCode {
    pub const ALL: [ReturnCode; 8] = [
        ReturnCode::Success,
        ReturnCode::PlayerNotFound,
        ReturnCode::PlayerDoesNotHaveSymbol,
        ReturnCode::SymbolNotOnTopCard,
        ReturnCode::NoChargesLeft,
        ReturnCode::CooldownActive,
        ReturnCode::InvalidAction,
        ReturnCode::PlayerIsFrozen,
    ];

    pub fn code(self) -> i64 {
        self as i64
    }

    pub fn from_code(code: i64) -> Option<ReturnCode> {
        Self::ALL.iter().copied().find(|c| c.code() == code)
    }

    pub fn is_success(self) -> bool {
        self == ReturnCode::Success
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReturnCode::Success => "success",
            ReturnCode::PlayerNotFound => "player_not_found",
            ReturnCode::PlayerDoesNotHaveSymbol => "player_does_not_have_symbol",
            ReturnCode::SymbolNotOnTopCard => "symbol_not_on_top_card",
            ReturnCode::NoChargesLeft => "no_charges_left",
            ReturnCode::CooldownActive => "cooldown_active",
            ReturnCode::InvalidAction => "invalid_action",
            ReturnCode::PlayerIsFrozen => "player_is_frozen",
        }
    }
}

impl std::fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn return_codes_use_stable_wire_numbers() {
        assert_eq!(ReturnCode::Success.code(), 0);
        assert_eq!(ReturnCode::InvalidAction.code(), 6);
        assert_eq!(ReturnCode::PlayerIsFrozen.code(), 7);
        for code in ReturnCode::ALL {
            assert_eq!(ReturnCode::from_code(code.code()), Some(code));
        }
        assert_eq!(ReturnCode::from_code(8), None);
        assert_eq!(ReturnCode::from_code(-1), None);
    }

    #[test]
    fn zero_sized_cards_and_hands_are_rejected() {
        let rules = GameRules {
            symbols_per_card: 0,
            ..GameRules::default()
        };
        assert_eq!(rules.validate(), Err(GameError::EmptyCard));

        let rules = GameRules {
            starting_cards: 0,
            ..GameRules::default()
        };
        assert_eq!(rules.validate(), Err(GameError::NoStartingCards));
    }

    #[test]
    fn minimum_universe_is_accepted() {
        let rules = GameRules {
            symbols_count: 15,
            ..GameRules::default()
        };
        assert_eq!(rules.minimum_symbols_count(), 15);
        assert!(rules.validate().is_ok());
    }

    #[test]
    fn partial_rules_deserialize_with_defaults() {
        let rules: GameRules = serde_json::from_str(r#"{"starting_cards": 3}"#).unwrap();
        assert_eq!(rules.starting_cards, 3);
        assert_eq!(rules.symbols_count, DEFAULT_SYMBOLS_COUNT);
        assert_eq!(rules.swap, AbilityRules::default());
    }
}
