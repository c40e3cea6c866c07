//! Card registry for card lookup.
//!
//! The `CardRegistry` stores every card a room plays with. Piles are built
//! from its id lists, and views resolve card text through it.

use rustc_hash::FxHashMap;

use super::card::{Card, CardId};

/// Registry of cards.
///
/// ## Example
///
/// ```
/// use party_engine::cards::{Card, CardId, CardRegistry};
///
/// let mut registry = CardRegistry::new();
/// registry.insert(Card::response(CardId::new(101), "A sad trombone.", "base"));
///
/// let found = registry.get(CardId::new(101)).unwrap();
/// assert_eq!(found.text, "A sad trombone.");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, Card>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a card unless its id is already registered.
    ///
    /// Returns false (and keeps the existing card) on a duplicate id.
    pub fn insert(&mut self, card: Card) -> bool {
        if self.cards.contains_key(&card.id) {
            return false;
        }
        self.cards.insert(card.id, card);
        true
    }

    /// Get a card by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&Card> {
        self.cards.get(&id)
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: CardId) -> bool {
        self.cards.contains_key(&id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Iterate over all cards (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        self.cards.values()
    }

    /// Prompt card ids, sorted.
    ///
    /// Sorted so that seeded shuffles produce the same deck every time.
    #[must_use]
    pub fn prompts(&self) -> Vec<CardId> {
        self.sorted_ids(Card::is_prompt)
    }

    /// Response card ids, sorted.
    #[must_use]
    pub fn responses(&self) -> Vec<CardId> {
        self.sorted_ids(Card::is_response)
    }

    /// Pick count of a prompt, or `None` for unknown ids and responses.
    #[must_use]
    pub fn pick_of(&self, id: CardId) -> Option<usize> {
        self.get(id).filter(|c| c.is_prompt()).map(Card::pick)
    }

    /// Text of a card, if registered.
    #[must_use]
    pub fn text_of(&self, id: CardId) -> Option<&str> {
        self.get(id).map(|c| c.text.as_str())
    }

    fn sorted_ids(&self, predicate: fn(&Card) -> bool) -> Vec<CardId> {
        let mut ids: Vec<_> = self.cards.values().filter(|c| predicate(c)).map(|c| c.id).collect();
        ids.sort();
        ids
    }
}

impl FromIterator<Card> for CardRegistry {
    fn from_iter<I: IntoIterator<Item = Card>>(iter: I) -> Self {
        let mut registry = Self::new();
        for card in iter {
            registry.insert(card);
        }
        registry
    }
}
