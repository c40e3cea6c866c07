//! Real-time room host.
//!
//! One tokio task (`Room`) per room owns the authoritative `GameState`.
//! Connections, timers and the directory talk to it only through its command
//! queue, so every mutation of a room happens in one ordered stream.
//!
//! ## Key Types
//!
//! - `Lobby`: Room directory (open, lookup by code, close) plus lifecycle signals
//! - `RoomHandle` / `Connection`: Cloneable sender into a room, and one client's seat
//! - `ClientMessage` / `ServerMessage`: JSON wire protocol
//! - `PlayerView`: What one participant is allowed to see
//! - `RoomCode`: Short human-typeable room identifier
//! - `HostConfig`: Idle, grace and code-length settings
//!
//! The network transport is out of scope: a WebSocket bridge forwards text
//! frames into `Connection::send_text` and serializes what `Connection::recv`
//! returns.

pub mod code;
pub mod config;
pub mod error;
pub mod lobby;
pub mod protocol;
pub mod room;
pub mod timer;
pub mod view;

pub use code::RoomCode;
pub use config::HostConfig;
pub use error::{CodeError, SessionError};
pub use lobby::{Lobby, RoomLifecycle};
pub use protocol::{ClientMessage, ErrorPayload, JoinRequest, ServerMessage, SessionToken};
pub use room::{Connection, ConnectionId, Room, RoomCommand, RoomHandle};
pub use timer::{TimerKey, TimerSet};
pub use view::{sanitize, CardFace, PhaseView, PlayerSummary, PlayerView, SubmissionView};
