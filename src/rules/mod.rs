//! Rules: game definitions, validation, and the engine that interprets them.
//!
//! Games are described by a `GameDefinition` (phases, permissions,
//! transitions, end conditions). The `Engine` interprets any definition;
//! adding a game means writing a definition, not engine code.

pub mod definition;
pub mod engine;
pub mod validator;

pub use definition::{
    AllowedAction, Authority, GameDefinition, PhaseDefinition, PhaseEffect, PhaseTarget, Transition,
    TransitionCondition,
};
pub use engine::{ActionContext, Engine, Outcome};
pub use validator::{
    check_action, check_duplicate, check_transition_condition, phase_deadline, validate_action, EvalContext,
    Validation,
};
