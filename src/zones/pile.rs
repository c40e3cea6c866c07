//! Deck + discard pile.
//!
//! The top of the deck is the end of the vector, so drawing is a `pop`.
//! Cards never leave a pile except by being drawn, and never enter one except
//! by being discarded, which keeps the room's card ledger balanced.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::shuffle::shuffle;
use crate::cards::CardId;
use crate::core::error::GameError;
use rand::Rng;

/// Which pile a card belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PileKind {
    Prompts,
    Responses,
}

/// Cards taken off a pile.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Draw {
    /// Drawn cards, top of deck first.
    pub cards: Vec<CardId>,

    /// The discard pile was recycled to satisfy this draw.
    pub reshuffled: bool,
}

/// A draw deck with its discard pile.
///
/// ## Example
///
/// ```
/// use party_engine::cards::CardId;
/// use party_engine::core::GameRng;
/// use party_engine::zones::{Pile, PileKind};
///
/// let mut rng = GameRng::new(1);
/// let mut pile = Pile::new(PileKind::Responses, vec![CardId::new(1), CardId::new(2)]);
/// pile.discard_cards([CardId::new(3)]);
///
/// let draw = pile.draw_cards(3, &mut rng).unwrap();
/// assert_eq!(draw.cards.len(), 3);
/// assert!(draw.reshuffled);
/// assert_eq!(pile.available(), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pile {
    kind: PileKind,
    deck: Vec<CardId>,
    discard: Vec<CardId>,
}

impl Pile {
    /// Create a pile with `cards` as the deck, in the given order (last = top).
    #[must_use]
    pub fn new(kind: PileKind, cards: Vec<CardId>) -> Self {
        Self {
            kind,
            deck: cards,
            discard: Vec::new(),
        }
    }

    /// Create a pile with the deck shuffled.
    #[must_use]
    pub fn shuffled<R: Rng + ?Sized>(kind: PileKind, mut cards: Vec<CardId>, rng: &mut R) -> Self {
        shuffle(&mut cards, rng);
        Self::new(kind, cards)
    }

    /// Which pile this is.
    #[must_use]
    pub fn kind(&self) -> PileKind {
        self.kind
    }

    /// Deck contents, bottom first.
    #[must_use]
    pub fn deck(&self) -> &[CardId] {
        &self.deck
    }

    /// Discard contents, oldest first.
    #[must_use]
    pub fn discard(&self) -> &[CardId] {
        &self.discard
    }

    #[must_use]
    pub fn deck_len(&self) -> usize {
        self.deck.len()
    }

    #[must_use]
    pub fn discard_len(&self) -> usize {
        self.discard.len()
    }

    /// Cards that a draw could reach (deck + discard).
    #[must_use]
    pub fn available(&self) -> usize {
        self.deck.len() + self.discard.len()
    }

    /// Iterate over every card held by the pile.
    pub fn all_cards(&self) -> impl Iterator<Item = CardId> + '_ {
        self.deck.iter().chain(self.discard.iter()).copied()
    }

    /// Draw `count` cards from the top of the deck.
    ///
    /// If the deck runs short, the discard is shuffled and placed under the
    /// remaining deck first. Fails with `DeckExhausted` (leaving the pile
    /// untouched) when deck and discard together hold fewer than `count`.
    pub fn draw_cards<R: Rng + ?Sized>(
        &mut self,
        count: usize,
        rng: &mut R,
    ) -> Result<Draw, GameError> {
        if self.available() < count {
            return Err(GameError::DeckExhausted {
                pile: self.kind,
                requested: count,
                available: self.available(),
            });
        }

        let reshuffled = self.deck.len() < count;
        if reshuffled {
            self.reshuffle_discard_into_deck(rng);
        }

        let split = self.deck.len() - count;
        let mut cards = self.deck.split_off(split);
        cards.reverse();

        Ok(Draw { cards, reshuffled })
    }

    /// Put cards on the discard pile.
    pub fn discard_cards(&mut self, cards: impl IntoIterator<Item = CardId>) {
        self.discard.extend(cards);
    }

    /// Shuffle the discard and slide it under the remaining deck.
    pub fn reshuffle_discard_into_deck<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.discard.is_empty() {
            return;
        }

        let mut recycled = std::mem::take(&mut self.discard);
        shuffle(&mut recycled, rng);
        debug!(pile = ?self.kind, recycled = recycled.len(), "reshuffled discard into deck");

        recycled.append(&mut self.deck);
        self.deck = recycled;
    }
}
