//! Typed failures for engine, validator and pile operations.
//!
//! Nothing in the pure layers panics on player input; every rejection is a
//! `GameError` value. The room host decides who gets told about it.

use thiserror::Error;

use super::action::{ActionType, IdempotencyKey};
use super::config::PhaseId;
use super::player::PlayerId;
use crate::zones::PileKind;

/// Errors produced by game operations.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    /// Malformed or illegal action payload.
    #[error("invalid action: {0}")]
    Validation(String),

    /// Action type not permitted in the current phase.
    #[error("{action:?} is not allowed during {phase}")]
    IllegalPhase { action: ActionType, phase: String },

    /// Actor lacks the authority the action requires.
    #[error("{player} may not {action:?} right now")]
    NotYourTurn { player: String, action: ActionType },

    /// Deck and discard together hold fewer cards than requested.
    #[error("{pile:?} exhausted: requested {requested}, only {available} left")]
    DeckExhausted { pile: PileKind, requested: usize, available: usize },

    /// Roster is full.
    #[error("room is full ({max} players)")]
    CapacityExceeded { max: usize },

    /// Player id already in the roster.
    #[error("player {0} already joined")]
    DuplicatePlayer(PlayerId),

    /// Player id not in the roster.
    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    /// Idempotency key already applied this round.
    #[error("action already applied: {0:?}")]
    DuplicateAction(IdempotencyKey),

    /// Settings rejected at room creation.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Definition references a phase it does not declare.
    #[error("definition has no {0}")]
    MissingPhase(PhaseId),

    /// Definition transitions never settle.
    #[error("transitions out of {0} never settle")]
    TransitionCycle(PhaseId),

    /// Snapshot encode/decode failed.
    #[error("snapshot error: {0}")]
    Snapshot(String),
}

impl GameError {
    /// Errors that end the room: the authoritative state can no longer
    /// progress, so clients must not keep acting on it. A pile is only
    /// fatally exhausted once deck and discard are both empty.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingPhase(_) | Self::TransitionCycle(_) | Self::DeckExhausted { available: 0, .. }
        )
    }

    /// Errors resolved without telling anyone.
    #[must_use]
    pub fn is_silent(&self) -> bool {
        matches!(self, Self::DuplicateAction(_))
    }

    /// Stable machine-readable code for `ERROR` messages.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION",
            Self::IllegalPhase { .. } => "ILLEGAL_PHASE",
            Self::NotYourTurn { .. } => "NOT_YOUR_TURN",
            Self::DeckExhausted { .. } => "DECK_EXHAUSTED",
            Self::CapacityExceeded { .. } => "CAPACITY_EXCEEDED",
            Self::DuplicatePlayer(_) => "DUPLICATE_PLAYER",
            Self::UnknownPlayer(_) => "UNKNOWN_PLAYER",
            Self::DuplicateAction(_) => "DUPLICATE_ACTION",
            Self::InvalidSettings(_) => "INVALID_SETTINGS",
            Self::MissingPhase(_) | Self::TransitionCycle(_) => "DEFINITION",
            Self::Snapshot(_) => "SNAPSHOT",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(GameError::MissingPhase(PhaseId::new(9)).is_fatal());
        assert!(GameError::DeckExhausted {
            pile: PileKind::Responses,
            requested: 3,
            available: 0
        }
        .is_fatal());
        assert!(!GameError::DeckExhausted {
            pile: PileKind::Responses,
            requested: 7,
            available: 6
        }
        .is_fatal());
        assert!(!GameError::Validation("nope".into()).is_fatal());
        assert!(!GameError::CapacityExceeded { max: 8 }.is_fatal());
    }

    #[test]
    fn test_codes_and_messages() {
        let err = GameError::NotYourTurn {
            player: "bob".into(),
            action: ActionType::JudgePick,
        };
        assert_eq!(err.code(), "NOT_YOUR_TURN");
        assert_eq!(err.to_string(), "bob may not JudgePick right now");

        let full = GameError::CapacityExceeded { max: 8 };
        assert_eq!(full.to_string(), "room is full (8 players)");
    }
}
