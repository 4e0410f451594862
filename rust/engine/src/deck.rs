use rand::seq::index;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::cards::{Card, Symbol};
use crate::errors::GameError;
use crate::rules::GameRules;

/// Card generator for one match.
///
/// Owns the RNG so every draw is reproducible from the seed. Both draws
/// sample without replacement, so they always terminate once the rules
/// passed [`GameRules::validate`].
#[derive(Debug, Clone)]
pub struct Deck {
    symbols_count: u32,
    symbols_per_card: u32,
    rng: ChaCha20Rng,
}

impl Deck {
    pub fn new_with_seed(seed: u64, rules: &GameRules) -> Result<Self, GameError> {
        rules.validate()?;
        Ok(Self {
            symbols_count: rules.symbols_count,
            symbols_per_card: rules.symbols_per_card,
            rng: ChaCha20Rng::seed_from_u64(seed),
        })
    }

    pub fn symbols_per_card(&self) -> usize {
        self.symbols_per_card as usize
    }

    /// Draws a card of distinct symbols from the whole universe.
    pub fn draw_starting_card(&mut self) -> Card {
        let picked = index::sample(
            &mut self.rng,
            self.symbols_count as usize,
            self.symbols_per_card as usize,
        );
        Card::from_distinct(picked.into_iter().map(|i| Symbol(i as u32)).collect())
    }

    /// Draws a card sharing exactly one symbol with `top`.
    ///
    /// The shared symbol is chosen uniformly from `top` and placed in the
    /// first slot; the other slots come from symbols not on `top`.
    pub fn draw_player_card(&mut self, top: &Card) -> Card {
        let shared = top.symbols()[self.rng.random_range(0..top.len())];

        let outside: Vec<Symbol> = (0..self.symbols_count)
            .map(Symbol)
            .filter(|s| !top.contains(*s))
            .collect();
        let rest = index::sample(
            &mut self.rng,
            outside.len(),
            self.symbols_per_card as usize - 1,
        );

        let mut symbols = Vec::with_capacity(self.symbols_per_card as usize);
        symbols.push(shared);
        symbols.extend(rest.into_iter().map(|i| outside[i]));
        Card::from_distinct(symbols)
    }
}
