//! Card packs and pack merging.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::card::{Card, PackId};
use super::registry::CardRegistry;

/// A named bundle of cards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardPack {
    pub id: PackId,
    pub name: String,
    pub cards: Vec<Card>,
}

impl CardPack {
    /// Create an empty pack.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: PackId::new(id),
            name: name.into(),
            cards: Vec::new(),
        }
    }

    /// Add a card.
    #[must_use]
    pub fn with_card(mut self, card: Card) -> Self {
        self.cards.push(card);
        self
    }

    /// Number of prompt cards.
    #[must_use]
    pub fn prompt_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_prompt()).count()
    }

    /// Number of response cards.
    #[must_use]
    pub fn response_count(&self) -> usize {
        self.cards.iter().filter(|c| c.is_response()).count()
    }
}

/// Merge packs into one registry, de-duplicating by card id.
///
/// Packs are read in order and the first card seen with a given id wins;
/// later duplicates are dropped.
#[must_use]
pub fn combine_packs(packs: &[CardPack]) -> CardRegistry {
    let mut registry = CardRegistry::new();
    for pack in packs {
        for card in &pack.cards {
            if !registry.insert(card.clone()) {
                debug!(pack = %pack.id.as_str(), card = %card.id, "skipping duplicate card");
            }
        }
    }
    registry
}
