//! Session host errors.

use thiserror::Error;

use super::code::RoomCode;
use crate::core::{GameError, PlayerId};

/// Room code rejected before lookup.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CodeError {
    #[error("room code must be {expected} characters, got {actual}")]
    Length { expected: usize, actual: usize },

    #[error("room codes cannot contain {0:?}")]
    Charset(char),
}

/// Errors surfaced by the lobby, room handles and connections.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Code(#[from] CodeError),

    #[error("room {0} not found")]
    RoomNotFound(RoomCode),

    #[error("room {0} is closed")]
    RoomClosed(RoomCode),

    #[error(transparent)]
    Game(#[from] GameError),

    #[error("malformed message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("join the room before acting")]
    NotJoined,

    #[error("player {0} is already seated with another session")]
    TokenMismatch(PlayerId),

    #[error("invalid host config: {0}")]
    InvalidConfig(String),

    #[error("no free room code after {attempts} attempts")]
    CodesExhausted { attempts: usize },
}

impl SessionError {
    /// Stable machine-readable code for `ERROR` messages.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Code(_) => "INVALID_CODE",
            Self::RoomNotFound(_) => "ROOM_NOT_FOUND",
            Self::RoomClosed(_) => "ROOM_CLOSED",
            Self::Game(error) => error.code(),
            Self::Protocol(_) => "MALFORMED",
            Self::NotJoined => "NOT_JOINED",
            Self::TokenMismatch(_) => "DUPLICATE_PLAYER",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::CodesExhausted { .. } => "CODES_EXHAUSTED",
        }
    }
}
