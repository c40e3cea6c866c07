//! Player identification, presence, and per-player game data.
//!
//! ## PlayerId
//!
//! Opaque participant identifier handed to the core by the join-registration
//! step. The engine never interprets it beyond equality.
//!
//! ## Player
//!
//! One roster entry: display name, presence, private hand, score and the lead
//! (judge) flag. Hands and scores survive disconnects so rejoining is lossless.

use chrono::{DateTime, Utc};
use im::Vector;
use serde::{Deserialize, Serialize};

use crate::cards::CardId;

/// Opaque participant identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Whether a player currently has a live connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Presence {
    Connected,
    Disconnected,
}

/// A player in a room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Participant identifier.
    pub id: PlayerId,

    /// Display name.
    pub name: String,

    /// Current presence.
    pub presence: Presence,

    /// Private hand (response card ids).
    pub hand: Vector<CardId>,

    /// Rounds won.
    pub score: u32,

    /// Lead/judge for the current round.
    pub is_lead: bool,

    /// When the player last dropped, if currently disconnected.
    pub disconnected_at: Option<DateTime<Utc>>,
}

impl Player {
    /// Create a connected player with an empty hand.
    #[must_use]
    pub fn new(id: impl Into<PlayerId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            presence: Presence::Connected,
            hand: Vector::new(),
            score: 0,
            is_lead: false,
            disconnected_at: None,
        }
    }

    /// Check if the player is connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.presence == Presence::Connected
    }

    /// Check if a card is in this player's hand.
    #[must_use]
    pub fn holds(&self, card: CardId) -> bool {
        self.hand.contains(&card)
    }

    /// Number of cards in hand.
    #[must_use]
    pub fn hand_size(&self) -> usize {
        self.hand.len()
    }

    /// Remove a card from the hand.
    ///
    /// Returns true if the card was found and removed.
    pub fn remove_from_hand(&mut self, card: CardId) -> bool {
        if let Some(pos) = self.hand.index_of(&card) {
            self.hand.remove(pos);
            true
        } else {
            false
        }
    }

    /// Mark the player disconnected at `at`.
    pub fn disconnect(&mut self, at: DateTime<Utc>) {
        self.presence = Presence::Disconnected;
        self.disconnected_at = Some(at);
    }

    /// Mark the player connected again.
    pub fn reconnect(&mut self) {
        self.presence = Presence::Connected;
        self.disconnected_at = None;
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}
