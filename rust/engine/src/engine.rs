use crate::cards::{Card, Symbol};
use crate::deck::Deck;
use crate::errors::GameError;
use crate::game::{GameSnapshot, PlayerSnapshot};
use crate::player::{Ability, Action, PlayerId, PlayerState, Seat};
use crate::rules::{GameRules, ReturnCode};

/// Owns the top card and every player, and applies actions to them.
///
/// All mutation goes through [`GameEngine::apply_action`]; callers that share
/// an engine between threads wrap it in a single lock so actions are applied
/// one at a time.
///
/// # Examples
///
/// ```
/// use dobble_engine::engine::GameEngine;
/// use dobble_engine::player::{Action, Seat};
/// use dobble_engine::rules::{GameRules, ReturnCode};
///
/// let seats = vec![Seat::new(0, "ana"), Seat::new(1, "bo")];
/// let mut engine = GameEngine::new(seats, GameRules::default(), Some(7)).unwrap();
///
/// let symbol = engine.snapshot().playable_symbol(0).expect("dealt cards always match");
/// assert_eq!(engine.apply_action(0, Action::PlayCard { symbol }), ReturnCode::Success);
/// assert_eq!(engine.player(0).unwrap().cards_in_hand_count(), 12);
/// ```
#[derive(Debug)]
pub struct GameEngine {
    rules: GameRules,
    deck: Deck,
    top_card: Card,
    players: Vec<PlayerState>,
    has_finished: bool,
    winner: Option<PlayerId>,
    turn: u64,
}

impl GameEngine {
    /// Deals the starting top card and one matching card per seat.
    ///
    /// Without a seed the deck is seeded from OS randomness.
    pub fn new(seats: Vec<Seat>, rules: GameRules, seed: Option<u64>) -> Result<Self, GameError> {
        if seats.is_empty() {
            return Err(GameError::NoPlayers);
        }
        for (i, seat) in seats.iter().enumerate() {
            if seats[..i].iter().any(|s| s.id == seat.id) {
                return Err(GameError::DuplicatePlayer(seat.id));
            }
        }

        let seed = seed.unwrap_or_else(rand::random);
        let mut deck = Deck::new_with_seed(seed, &rules)?;
        let top_card = deck.draw_starting_card();
        let players = seats
            .into_iter()
            .map(|seat| {
                let card = deck.draw_player_card(&top_card);
                PlayerState::new(seat, card, &rules)
            })
            .collect();

        Ok(Self {
            rules,
            deck,
            top_card,
            players,
            has_finished: false,
            winner: None,
            turn: 0,
        })
    }

    pub fn rules(&self) -> &GameRules {
        &self.rules
    }

    pub fn top_card(&self) -> &Card {
        &self.top_card
    }

    pub fn players(&self) -> &[PlayerState] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&PlayerState> {
        self.players.iter().find(|p| p.id() == id)
    }

    pub fn has_finished(&self) -> bool {
        self.has_finished
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.winner
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            symbols_per_card: self.rules.symbols_per_card,
            top_card: self.top_card.clone(),
            players: self.players.iter().map(PlayerSnapshot::from).collect(),
            has_finished: self.has_finished,
            winner: self.winner,
            turn: self.turn,
        }
    }

    /// Validates and applies `action` on behalf of `player_id`.
    ///
    /// Anything other than [`ReturnCode::Success`] leaves the game unchanged.
    /// A successful card play also advances every cooldown and freeze by one.
    pub fn apply_action(&mut self, player_id: PlayerId, action: Action) -> ReturnCode {
        let Some(actor) = self.index_of(player_id) else {
            return ReturnCode::PlayerNotFound;
        };
        if self.has_finished {
            return ReturnCode::InvalidAction;
        }
        if self.players[actor].is_frozen() {
            return ReturnCode::PlayerIsFrozen;
        }

        match action {
            Action::PlayCard { symbol } => {
                let code = self.play_card(actor, symbol);
                if code.is_success() {
                    self.advance_cooldowns();
                }
                code
            }
            Action::Swap { target } => self.swap(actor, target),
            Action::Freeze { target } => self.freeze(actor, target),
            Action::Reroll => self.reroll(actor),
        }
    }

    fn index_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p.id() == id)
    }

    fn play_card(&mut self, actor: usize, symbol: Symbol) -> ReturnCode {
        if !self.players[actor].card().contains(symbol) {
            return ReturnCode::PlayerDoesNotHaveSymbol;
        }
        if !self.top_card.contains(symbol) {
            return ReturnCode::SymbolNotOnTopCard;
        }

        // the played card goes on top; the fresh card is dealt against it
        let played = self.players[actor].card().clone();
        self.top_card = played;
        let fresh = self.deck.draw_player_card(&self.top_card);
        let player = &mut self.players[actor];
        player.replace_card(fresh);
        player.clear_one_card();
        self.turn += 1;

        if player.cards_in_hand_count() == 0 {
            self.has_finished = true;
            self.winner = Some(player.id());
        }
        ReturnCode::Success
    }

    /// Charge and cooldown gate shared by every ability.
    fn check_ready(&self, actor: usize, ability: Ability) -> Result<(), ReturnCode> {
        let state = self.players[actor].ability(ability);
        if state.charges == 0 {
            return Err(ReturnCode::NoChargesLeft);
        }
        if state.cooldown > 0 {
            return Err(ReturnCode::CooldownActive);
        }
        Ok(())
    }

    /// Uses one charge. Swap and reroll restart their cooldown; freeze only
    /// waits out the cooldown it was dealt with.
    fn spend(&mut self, actor: usize, ability: Ability) {
        let cooldown = match ability {
            Ability::Swap => Some(self.rules.swap.cooldown),
            Ability::Reroll => Some(self.rules.reroll.cooldown),
            Ability::Freeze => None,
        };
        let state = self.players[actor].ability_mut(ability);
        state.charges -= 1;
        if let Some(cooldown) = cooldown {
            state.cooldown = cooldown;
        }
    }

    fn swap(&mut self, actor: usize, target: PlayerId) -> ReturnCode {
        if let Err(code) = self.check_ready(actor, Ability::Swap) {
            return code;
        }
        let Some(other) = self.index_of(target) else {
            return ReturnCode::PlayerNotFound;
        };

        if other != actor {
            let (low, high) = (actor.min(other), actor.max(other));
            let (head, tail) = self.players.split_at_mut(high);
            std::mem::swap(head[low].card_mut(), tail[0].card_mut());
        }
        self.spend(actor, Ability::Swap);
        ReturnCode::Success
    }

    fn freeze(&mut self, actor: usize, target: PlayerId) -> ReturnCode {
        if let Err(code) = self.check_ready(actor, Ability::Freeze) {
            return code;
        }
        let Some(other) = self.index_of(target) else {
            return ReturnCode::PlayerNotFound;
        };

        self.players[other].add_frozen(self.rules.freeze_duration);
        self.spend(actor, Ability::Freeze);
        ReturnCode::Success
    }

    fn reroll(&mut self, actor: usize) -> ReturnCode {
        if let Err(code) = self.check_ready(actor, Ability::Reroll) {
            return code;
        }
        let fresh = self.deck.draw_player_card(&self.top_card);
        self.players[actor].replace_card(fresh);
        self.spend(actor, Ability::Reroll);
        ReturnCode::Success
    }

    /// One card play elapsed for everyone.
    fn advance_cooldowns(&mut self) {
        for player in &mut self.players {
            player.advance();
        }
    }
}
