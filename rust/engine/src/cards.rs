use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of one icon in the symbol universe.
/// Values range over `0..GameRules::symbols_count`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(pub u32);

impl Symbol {
    pub fn id(self) -> u32 {
        self.0
    }
}

impl From<u32> for Symbol {
    fn from(v: u32) -> Self {
        Symbol(v)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ordered sequence of distinct symbols.
///
/// Cards are produced by [`crate::deck::Deck`], which guarantees that no symbol
/// repeats. A card built by hand through [`Card::new`] is checked the same way.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Card {
    symbols: Vec<Symbol>,
}

impl Card {
    /// Builds a card from explicit symbols, returning `None` if any symbol repeats.
    ///
    /// ```
    /// use dobble_engine::cards::{Card, Symbol};
    ///
    /// assert!(Card::new(vec![Symbol(1), Symbol(2), Symbol(3)]).is_some());
    /// assert!(Card::new(vec![Symbol(1), Symbol(1)]).is_none());
    /// ```
    pub fn new(symbols: Vec<Symbol>) -> Option<Self> {
        let card = Self { symbols };
        if card.has_distinct_symbols() {
            Some(card)
        } else {
            None
        }
    }

    pub(crate) fn from_distinct(symbols: Vec<Symbol>) -> Self {
        debug_assert!(Self::new(symbols.clone()).is_some());
        Self { symbols }
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Symbols present on both cards, in this card's order.
    pub fn shared_symbols(&self, other: &Card) -> Vec<Symbol> {
        self.symbols
            .iter()
            .copied()
            .filter(|s| other.contains(*s))
            .collect()
    }

    pub fn has_distinct_symbols(&self) -> bool {
        self.symbols
            .iter()
            .enumerate()
            .all(|(i, s)| !self.symbols[..i].contains(s))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.symbols.iter().map(|s| s.to_string()).collect();
        write!(f, "[{}]", parts.join(" "))
    }
}
