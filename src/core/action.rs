//! Action representation: who acted, what they did, and when.
//!
//! Actions are the sole unit of mutation. The room host stamps each inbound
//! action with its actor and arrival time; the engine derives an
//! `IdempotencyKey` from it so a retried message is applied at most once.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::config::PhaseId;
use super::player::PlayerId;
use crate::cards::CardId;

/// Discriminant of an `ActionKind`, used in definitions and keys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionType {
    StartGame,
    Deal,
    Submit,
    JudgePick,
    Reveal,
    Score,
    Advance,
    Timeout,
}

/// What an action does, with its payload.
///
/// This is also the `ACTION` payload on the wire:
///
/// ```
/// use party_engine::core::ActionKind;
///
/// let kind: ActionKind = serde_json::from_str(r#"{"kind":"SUBMIT","cards":[101]}"#).unwrap();
/// assert!(matches!(kind, ActionKind::Submit { .. }));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    /// Leave the lobby and start round one.
    StartGame,
    /// Refill hands and draw a prompt.
    Deal,
    /// Play response cards against the visible prompt.
    /// SmallVec covers the usual pick counts (1-3) without heap allocation.
    Submit { cards: SmallVec<[CardId; 3]> },
    /// Judge picks the winning submission by its slot.
    JudgePick { slot: usize },
    /// Reveal every submission with its author.
    Reveal,
    /// Award the picked winner.
    Score,
    /// Explicitly move on (satisfies `MANUAL` transitions).
    Advance,
    /// A phase timer elapsed. Only the host may issue this.
    Timeout { phase: PhaseId, round: u32 },
}

impl ActionKind {
    /// Get the discriminant.
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        match self {
            Self::StartGame => ActionType::StartGame,
            Self::Deal => ActionType::Deal,
            Self::Submit { .. } => ActionType::Submit,
            Self::JudgePick { .. } => ActionType::JudgePick,
            Self::Reveal => ActionType::Reveal,
            Self::Score => ActionType::Score,
            Self::Advance => ActionType::Advance,
            Self::Timeout { .. } => ActionType::Timeout,
        }
    }

    /// Create a submit action from card ids.
    #[must_use]
    pub fn submit(cards: &[CardId]) -> Self {
        Self::Submit {
            cards: SmallVec::from_slice(cards),
        }
    }
}

/// Who originated an action.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actor {
    /// A participant.
    Player(PlayerId),
    /// The room host itself (timers).
    System,
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player(id) => write!(f, "{}", id),
            Self::System => f.write_str("system"),
        }
    }
}

/// A complete action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Originator.
    pub actor: Actor,

    /// Type and payload.
    pub kind: ActionKind,

    /// Arrival time, stamped by the host.
    pub at: DateTime<Utc>,
}

impl Action {
    /// Create a player action.
    #[must_use]
    pub fn by(player: impl Into<PlayerId>, kind: ActionKind, at: DateTime<Utc>) -> Self {
        Self {
            actor: Actor::Player(player.into()),
            kind,
            at,
        }
    }

    /// Create a host timeout for `(phase, round)`.
    #[must_use]
    pub fn timeout(phase: PhaseId, round: u32, at: DateTime<Utc>) -> Self {
        Self {
            actor: Actor::System,
            kind: ActionKind::Timeout { phase, round },
            at,
        }
    }

    /// Get the action type.
    #[must_use]
    pub fn action_type(&self) -> ActionType {
        self.kind.action_type()
    }

    /// Get the acting player, if any.
    #[must_use]
    pub fn player(&self) -> Option<&PlayerId> {
        match &self.actor {
            Actor::Player(id) => Some(id),
            Actor::System => None,
        }
    }

    /// Derive the idempotency key for this action at `(round, phase)`.
    #[must_use]
    pub fn idempotency_key(&self, round: u32, phase: Option<PhaseId>) -> IdempotencyKey {
        IdempotencyKey {
            actor: self.actor.clone(),
            action: self.action_type(),
            round,
            phase,
        }
    }
}

/// Identity of an action for duplicate suppression.
///
/// Two actions with equal keys have the same effect, so only the first is applied.
/// The phase is part of the key so one actor may `Advance` through several
/// phases of the same round.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey {
    pub actor: Actor,
    pub action: ActionType,
    pub round: u32,
    pub phase: Option<PhaseId>,
}

/// A recorded action with metadata for history tracking.
///
/// Payloads are not kept: history must never leak hand contents.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Who acted.
    pub actor: Actor,

    /// What kind of action it was.
    pub action: ActionType,

    /// Round when the action was taken.
    pub round: u32,

    /// When it arrived.
    pub at: DateTime<Utc>,
}

impl ActionRecord {
    /// Create a record for an applied action.
    #[must_use]
    pub fn new(action: &Action, round: u32) -> Self {
        Self {
            actor: action.actor.clone(),
            action: action.action_type(),
            round,
            at: action.at,
        }
    }
}
