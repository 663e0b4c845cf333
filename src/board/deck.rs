//! Card decks: draw, discard and reshuffle.
//!
//! Card contents belong to the presentation layer. The engine only tracks
//! card ids: which are in the draw pile, which are discarded, and which are
//! held by players as release tokens.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::space::DeckKind;

/// Number of cards in each deck.
pub const DECK_SIZE: u16 = 16;

/// One card deck. The top of the draw pile is the end of the vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub kind: DeckKind,
    pub draw_pile: Vec<u16>,
    pub discard_pile: Vec<u16>,
}

impl Deck {
    /// Creates a deck with every card in the draw pile, in id order.
    pub fn new(kind: DeckKind) -> Self {
        Deck {
            kind,
            draw_pile: (0..DECK_SIZE).rev().collect(),
            discard_pile: Vec::new(),
        }
    }

    /// Creates a deck and shuffles it.
    pub fn shuffled<R: Rng>(kind: DeckKind, rng: &mut R) -> Self {
        let mut deck = Deck::new(kind);
        deck.draw_pile.shuffle(rng);
        deck
    }

    /// Draws the top card, reshuffling the discard pile into the draw pile
    /// when it runs out. Returns None only if every card is held by players.
    pub fn draw<R: Rng>(&mut self, rng: &mut R) -> Option<u16> {
        if self.draw_pile.is_empty() {
            if self.discard_pile.is_empty() {
                return None;
            }
            self.draw_pile.append(&mut self.discard_pile);
            self.draw_pile.shuffle(rng);
        }
        self.draw_pile.pop()
    }

    pub fn discard(&mut self, card: u16) {
        self.discard_pile.push(card);
    }

    /// Cards currently in either pile.
    pub fn len(&self) -> usize {
        self.draw_pile.len() + self.discard_pile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
