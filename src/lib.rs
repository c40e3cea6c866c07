//! # party-engine
//!
//! A rules-driven engine for "prompt → submission → judge → score" party card
//! games, plus the real-time room host that runs it.
//!
//! ## Design Principles
//!
//! 1. **Pure Engine**: `Engine` operations take a snapshot and return a new one.
//!    Nothing in `core`, `zones`, `cards` or `rules` performs I/O or reads the clock.
//!
//! 2. **Rules Are Data**: Games are `GameDefinition` values (phases, allowed
//!    actions, transitions, end conditions). A new game type is new data, not
//!    new code paths.
//!
//! 3. **One Owner Per Room**: Each room's state lives inside a single actor task.
//!    Every inbound message, timer and disconnect goes through its queue.
//!
//! 4. **Views, Not State**: Clients only ever receive a `PlayerView` computed for
//!    them, never the raw `GameState`.
//!
//! ## Modules
//!
//! - `core`: Players, rotation, actions, events, state, settings, RNG, errors
//! - `zones`: Shuffling and deck/discard piles
//! - `cards`: Cards, packs and the card registry
//! - `rules`: Game definitions, the validator and the engine
//! - `games`: Built-in game definitions and content packs
//! - `session`: Room codes, wire protocol, views, timers and the room host

pub mod core;
pub mod zones;
pub mod cards;
pub mod rules;
pub mod games;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    PlayerId, Player, Presence,
    GameRng, GameRngState,
    PhaseId, GameSettings,
    Action, ActionKind, ActionType, Actor, IdempotencyKey,
    GameEvent, FinalScore,
    GameState, GameStatus, RoundState, Submission,
    GameError,
};

pub use crate::zones::{Pile, PileKind};

pub use crate::cards::{Card, CardId, CardKind, CardPack, PackId, CardRegistry, combine_packs};

pub use crate::rules::{
    Engine, ActionContext, Outcome,
    GameDefinition, PhaseDefinition, Transition, TransitionCondition, PhaseTarget,
    PhaseEffect, AllowedAction, Authority,
    Validation, validate_action, check_transition_condition,
};

pub use crate::session::{
    Lobby, RoomHandle, Connection, ConnectionId, RoomLifecycle,
    RoomCode, HostConfig, SessionToken,
    ClientMessage, ServerMessage, JoinRequest,
    PlayerView, SessionError,
};

/// Install a `tracing` subscriber driven by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
