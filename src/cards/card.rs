//! Card data.
//!
//! A `Card` is immutable once loaded. Prompts carry the number of response
//! cards a submission must contain; responses are plain text.

use serde::{Deserialize, Serialize};

/// Unique identifier for a card.
///
/// Serializes as a bare number, which is also how clients refer to cards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Identifier of the pack a card came from.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackId(pub String);

impl PackId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Prompt or response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardKind {
    /// Shown to everyone; submissions must contain `pick` response cards.
    Prompt { pick: u8 },
    /// Dealt into hands and submitted.
    Response,
}

/// Static card data.
///
/// ## Example
///
/// ```
/// use party_engine::cards::{Card, CardId};
///
/// let prompt = Card::prompt(CardId::new(1), "Step one: ____. Step two: ____.", "base", 2);
/// assert!(prompt.is_prompt());
/// assert_eq!(prompt.pick(), 2);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub kind: CardKind,
    pub text: String,
    pub pack: PackId,
}

impl Card {
    /// Create a prompt card. A pick of zero is raised to one.
    #[must_use]
    pub fn prompt(id: CardId, text: impl Into<String>, pack: impl Into<String>, pick: u8) -> Self {
        Self {
            id,
            kind: CardKind::Prompt { pick: pick.max(1) },
            text: text.into(),
            pack: PackId::new(pack),
        }
    }

    /// Create a response card.
    #[must_use]
    pub fn response(id: CardId, text: impl Into<String>, pack: impl Into<String>) -> Self {
        Self {
            id,
            kind: CardKind::Response,
            text: text.into(),
            pack: PackId::new(pack),
        }
    }

    #[must_use]
    pub fn is_prompt(&self) -> bool {
        matches!(self.kind, CardKind::Prompt { .. })
    }

    #[must_use]
    pub fn is_response(&self) -> bool {
        matches!(self.kind, CardKind::Response)
    }

    /// Number of response cards a prompt asks for (0 for responses).
    #[must_use]
    pub fn pick(&self) -> usize {
        match self.kind {
            CardKind::Prompt { pick } => usize::from(pick),
            CardKind::Response => 0,
        }
    }
}
