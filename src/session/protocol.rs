//! JSON wire protocol.
//!
//! Every frame is `{"type": ..., "payload": ...}`; payload-less frames omit
//! `payload`.
//!
//! Client → host: `JOIN`, `ACTION`, `LEAVE`, `PING`.
//! Host → client: `STATE`, `EVENT`, `ERROR`, `PONG`.
//!
//! ```
//! use party_engine::session::ClientMessage;
//!
//! let msg = ClientMessage::from_json(
//!     r#"{"type":"ACTION","payload":{"kind":"JUDGE_PICK","slot":0}}"#,
//! ).unwrap();
//! assert!(matches!(msg, ClientMessage::Action(_)));
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::SessionError;
use super::view::PlayerView;
use crate::core::{ActionKind, GameError, GameEvent, PlayerId};

/// Secret a client presents to reclaim its seat after a reconnect.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(String);

impl SessionToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Generate a fresh random token.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Payload of `JOIN`: identity issued by the external registration step.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub player_id: PlayerId,
    pub name: String,
    pub session_token: SessionToken,
}

/// Frames sent by clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    Join(JoinRequest),
    Action(ActionKind),
    Leave,
    Ping,
}

impl ClientMessage {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Payload of `ERROR`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

/// Frames sent by the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    State(Box<PlayerView>),
    Event(GameEvent),
    Error(ErrorPayload),
    Pong,
}

impl ServerMessage {
    #[must_use]
    pub fn state(view: PlayerView) -> Self {
        Self::State(Box::new(view))
    }

    #[must_use]
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            code: code.to_owned(),
            message: message.into(),
        })
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<&GameError> for ServerMessage {
    fn from(error: &GameError) -> Self {
        Self::error(error.code(), error.to_string())
    }
}

impl From<&SessionError> for ServerMessage {
    fn from(error: &SessionError) -> Self {
        Self::error(error.code(), error.to_string())
    }
}
