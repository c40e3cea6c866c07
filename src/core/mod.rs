//! Core engine types: players, rotation, actions, events, state, RNG, settings, errors.
//!
//! This module contains the vocabulary shared by the engine and the room host.
//! Games configure behavior through `rules::GameDefinition` rather than
//! modifying anything here.

pub mod player;
pub mod rotation;
pub mod rng;
pub mod config;
pub mod action;
pub mod event;
pub mod state;
pub mod error;

pub use player::{PlayerId, Player, Presence};
pub use rotation::{get_next_in_rotation, assign_new_lead};
pub use rng::{GameRng, GameRngState};
pub use config::{PhaseId, GameSettings};
pub use action::{Action, ActionKind, ActionType, Actor, ActionRecord, IdempotencyKey};
pub use event::{GameEvent, FinalScore};
pub use state::{GameState, GameStatus, RoundState, Submission};
pub use error::GameError;
