//! Game definitions: phases, permissions, transitions, end conditions.
//!
//! A `GameDefinition` is pure data. The engine interprets it; nothing in the
//! engine knows the names or order of a particular game's phases.
//!
//! ## Phases
//!
//! Each `PhaseDefinition` declares:
//! - Which action types are accepted, and who may issue them (`Authority`)
//! - An optional timeout after which `TimeoutElapsed` holds
//! - Effects run on entry (`PhaseEffect`)
//! - Ordered transitions; the first whose condition holds is taken
//! - Whether entering it ends the round
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use party_engine::core::{ActionType, PhaseId};
//! use party_engine::rules::{
//!     Authority, GameDefinition, PhaseDefinition, PhaseEffect, PhaseTarget, TransitionCondition,
//! };
//!
//! let play = PhaseId::new(1);
//! let definition = GameDefinition::new("Tiny", play)
//!     .allow_in_lobby(ActionType::StartGame, Authority::Host)
//!     .with_phase(
//!         PhaseDefinition::new(play, "Play")
//!             .on_enter(PhaseEffect::DrawPrompt)
//!             .allow(ActionType::Advance, Authority::Lead)
//!             .with_timeout(Duration::from_secs(30))
//!             .transition(TransitionCondition::Manual, PhaseTarget::NextRound)
//!             .ending_round(),
//!     )
//!     .end_when(TransitionCondition::RoundLimit(3));
//!
//! assert!(definition.validate().is_ok());
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::action::ActionType;
use crate::core::config::{GameSettings, PhaseId};
use crate::core::error::GameError;

/// Who may issue an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Authority {
    /// Any connected player.
    Anyone,
    /// The earliest-joined connected player.
    Host,
    /// The current lead (judge).
    Lead,
    /// Any connected player except the lead.
    NonLead,
    /// The room host process itself.
    System,
}

/// An action type accepted in a phase, with its required authority.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowedAction {
    pub action: ActionType,
    pub authority: Authority,
}

/// Work done when a phase is entered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseEffect {
    /// Fill every connected player's hand up to `hand_size`.
    DealHands,
    /// Turn over the next prompt. An empty prompt deck ends the game.
    DrawPrompt,
    /// Shuffle submission slots so authors can't be inferred from order.
    ShuffleSubmissions,
    /// Make submissions and authors public.
    RevealSubmissions,
    /// Give the picked submission's author a point (once per round).
    AwardWinner,
}

/// Condition guarding a transition (or ending the game).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransitionCondition {
    /// Every connected non-lead player has submitted (and there is at least one).
    AllSubmitted,
    /// The phase timer fired, or its deadline has passed.
    TimeoutElapsed,
    /// Someone issued `Advance`.
    Manual,
    /// Some player's score reached the threshold.
    ScoreThreshold(u32),
    /// The judge picked a winner.
    JudgePicked,
    /// The round number reached the limit.
    RoundLimit(u32),
    /// Holds unconditionally.
    Always,
}

/// Where a transition leads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseTarget {
    Phase(PhaseId),
    /// Start the next round at the initial phase.
    NextRound,
    GameOver,
}

/// A guarded edge out of a phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub condition: TransitionCondition,
    pub target: PhaseTarget,
}

/// One phase of a round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub id: PhaseId,
    pub name: String,
    pub allowed: Vec<AllowedAction>,
    pub timeout: Option<Duration>,
    pub on_enter: Vec<PhaseEffect>,
    /// Checked in declaration order.
    pub transitions: Vec<Transition>,
    pub ends_round: bool,
}

impl PhaseDefinition {
    /// Create a phase that accepts nothing and never leaves.
    #[must_use]
    pub fn new(id: PhaseId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            allowed: Vec::new(),
            timeout: None,
            on_enter: Vec::new(),
            transitions: Vec::new(),
            ends_round: false,
        }
    }

    /// Accept an action type from actors holding `authority`.
    #[must_use]
    pub fn allow(mut self, action: ActionType, authority: Authority) -> Self {
        self.allowed.push(AllowedAction { action, authority });
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Run an effect on entry (effects run in the order added).
    #[must_use]
    pub fn on_enter(mut self, effect: PhaseEffect) -> Self {
        self.on_enter.push(effect);
        self
    }

    /// Append a transition.
    #[must_use]
    pub fn transition(mut self, condition: TransitionCondition, target: PhaseTarget) -> Self {
        self.transitions.push(Transition { condition, target });
        self
    }

    /// Mark this phase as the end of a round.
    #[must_use]
    pub fn ending_round(mut self) -> Self {
        self.ends_round = true;
        self
    }

    /// Authority required for `action` here, if it is accepted at all.
    #[must_use]
    pub fn authority_for(&self, action: ActionType) -> Option<Authority> {
        find_authority(&self.allowed, action)
    }
}

/// A complete game: lobby permissions, phases and end conditions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDefinition {
    pub name: String,
    pub min_players: usize,
    pub max_players: usize,
    pub hand_size: usize,
    pub lobby_actions: Vec<AllowedAction>,
    pub phases: Vec<PhaseDefinition>,
    /// Phase each round starts in.
    pub initial_phase: PhaseId,
    /// Checked whenever a round-ending phase is entered; any one ends the game.
    pub end_conditions: Vec<TransitionCondition>,
}

impl GameDefinition {
    /// Create a definition with default bounds (3-8 players, 7 cards).
    #[must_use]
    pub fn new(name: impl Into<String>, initial_phase: PhaseId) -> Self {
        Self {
            name: name.into(),
            min_players: 3,
            max_players: 8,
            hand_size: 7,
            lobby_actions: Vec::new(),
            phases: Vec::new(),
            initial_phase,
            end_conditions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_players(mut self, min: usize, max: usize) -> Self {
        self.min_players = min;
        self.max_players = max;
        self
    }

    #[must_use]
    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    /// Accept an action type in the lobby.
    #[must_use]
    pub fn allow_in_lobby(mut self, action: ActionType, authority: Authority) -> Self {
        self.lobby_actions.push(AllowedAction { action, authority });
        self
    }

    #[must_use]
    pub fn with_phase(mut self, phase: PhaseDefinition) -> Self {
        self.phases.push(phase);
        self
    }

    #[must_use]
    pub fn end_when(mut self, condition: TransitionCondition) -> Self {
        self.end_conditions.push(condition);
        self
    }

    /// Look up a phase.
    pub fn phase(&self, id: PhaseId) -> Result<&PhaseDefinition, GameError> {
        self.phases
            .iter()
            .find(|p| p.id == id)
            .ok_or(GameError::MissingPhase(id))
    }

    /// Authority required for `action` in the lobby.
    #[must_use]
    pub fn lobby_authority_for(&self, action: ActionType) -> Option<Authority> {
        find_authority(&self.lobby_actions, action)
    }

    /// Check the definition is internally consistent.
    ///
    /// Every referenced phase must exist and phase ids must be unique.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.min_players < 2 || self.max_players < self.min_players {
            return Err(GameError::InvalidSettings(format!(
                "{}: player bounds {}..={} are invalid",
                self.name, self.min_players, self.max_players
            )));
        }
        if self.hand_size == 0 {
            return Err(GameError::InvalidSettings(format!("{}: hand size is zero", self.name)));
        }

        for (i, phase) in self.phases.iter().enumerate() {
            if self.phases[..i].iter().any(|p| p.id == phase.id) {
                return Err(GameError::InvalidSettings(format!(
                    "{}: {} declared twice",
                    self.name, phase.id
                )));
            }
        }

        self.phase(self.initial_phase)?;
        for phase in &self.phases {
            for transition in &phase.transitions {
                if let PhaseTarget::Phase(target) = transition.target {
                    self.phase(target)?;
                }
            }
        }
        Ok(())
    }

    /// Check room settings fit within this game's bounds.
    pub fn check_settings(&self, settings: &GameSettings) -> Result<(), GameError> {
        settings.validate()?;
        if settings.min_players < self.min_players {
            return Err(GameError::InvalidSettings(format!(
                "{} needs at least {} players",
                self.name, self.min_players
            )));
        }
        if settings.max_players > self.max_players {
            return Err(GameError::InvalidSettings(format!(
                "{} allows at most {} players",
                self.name, self.max_players
            )));
        }
        Ok(())
    }
}

fn find_authority(allowed: &[AllowedAction], action: ActionType) -> Option<Authority> {
    allowed.iter().find(|a| a.action == action).map(|a| a.authority)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_phase() -> GameDefinition {
        let a = PhaseId::new(1);
        let b = PhaseId::new(2);
        GameDefinition::new("Two", a)
            .with_phase(
                PhaseDefinition::new(a, "A")
                    .allow(ActionType::Submit, Authority::NonLead)
                    .transition(TransitionCondition::AllSubmitted, PhaseTarget::Phase(b)),
            )
            .with_phase(
                PhaseDefinition::new(b, "B")
                    .transition(TransitionCondition::Always, PhaseTarget::NextRound)
                    .ending_round(),
            )
    }

    #[test]
    fn test_valid_definition() {
        let definition = two_phase();
        assert!(definition.validate().is_ok());
        assert_eq!(definition.phase(PhaseId::new(2)).unwrap().name, "B");
    }

    #[test]
    fn test_authority_lookup() {
        let definition = two_phase().allow_in_lobby(ActionType::StartGame, Authority::Host);
        let a = definition.phase(PhaseId::new(1)).unwrap();

        assert_eq!(a.authority_for(ActionType::Submit), Some(Authority::NonLead));
        assert_eq!(a.authority_for(ActionType::JudgePick), None);
        assert_eq!(definition.lobby_authority_for(ActionType::StartGame), Some(Authority::Host));
    }

    #[test]
    fn test_missing_transition_target() {
        let definition = two_phase().with_phase(
            PhaseDefinition::new(PhaseId::new(3), "C")
                .transition(TransitionCondition::Manual, PhaseTarget::Phase(PhaseId::new(9))),
        );
        assert_eq!(definition.validate(), Err(GameError::MissingPhase(PhaseId::new(9))));
    }

    #[test]
    fn test_missing_initial_phase() {
        let definition = GameDefinition::new("Empty", PhaseId::new(1));
        assert_eq!(definition.validate(), Err(GameError::MissingPhase(PhaseId::new(1))));
    }

    #[test]
    fn test_duplicate_phase_ids() {
        let definition = two_phase().with_phase(PhaseDefinition::new(PhaseId::new(1), "Again"));
        assert!(matches!(definition.validate(), Err(GameError::InvalidSettings(_))));
    }

    #[test]
    fn test_check_settings() {
        let definition = two_phase().with_players(3, 6);

        assert!(definition.check_settings(&GameSettings::default().with_max_players(6)).is_ok());
        assert!(definition.check_settings(&GameSettings::default()).is_err());
        assert!(definition
            .check_settings(&GameSettings::default().with_min_players(2).with_max_players(6))
            .is_err());
    }

    #[test]
    fn test_condition_serialization() {
        let json = serde_json::to_string(&TransitionCondition::ScoreThreshold(7)).unwrap();
        assert_eq!(json, r#"{"SCORE_THRESHOLD":7}"#);
        let json = serde_json::to_string(&TransitionCondition::AllSubmitted).unwrap();
        assert_eq!(json, r#""ALL_SUBMITTED""#);
    }
}
