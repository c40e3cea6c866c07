//! Prompt/response party game with a rotating judge.
//!
//! Each round:
//! 1. **Dealing**: a prompt is turned over and every connected hand is
//!    refilled to seven cards
//! 2. **Submitting**: everyone except the judge plays as many response cards
//!    as the prompt asks for
//! 3. **Judging**: the judge sees the submissions anonymously and picks one
//! 4. **Reveal**: submissions and their authors are shown to everyone
//! 5. **Scoring**: the winner gets a point and the judge role rotates
//!
//! Phases with a timer move on by themselves when it runs out. The game ends
//! when someone reaches the score threshold, after the round limit, or when
//! the prompts run out.

mod packs;

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use crate::cards::{combine_packs, CardPack};
use crate::core::{ActionType, GameError, PhaseId};
use crate::rules::{
    Authority, Engine, GameDefinition, PhaseDefinition, PhaseEffect, PhaseTarget, TransitionCondition,
};

pub use packs::{after_dark_pack, base_pack, builtin_packs};

pub const DEALING: PhaseId = PhaseId::new(1);
pub const SUBMITTING: PhaseId = PhaseId::new(2);
pub const JUDGING: PhaseId = PhaseId::new(3);
pub const REVEAL: PhaseId = PhaseId::new(4);
pub const SCORING: PhaseId = PhaseId::new(5);

pub const HAND_SIZE: usize = 7;
pub const WINNING_SCORE: u32 = 7;
pub const ROUND_LIMIT: u32 = 20;

pub const SUBMIT_TIMEOUT: Duration = Duration::from_secs(60);
pub const JUDGE_TIMEOUT: Duration = Duration::from_secs(60);
pub const REVEAL_TIMEOUT: Duration = Duration::from_secs(10);
pub const SCORING_TIMEOUT: Duration = Duration::from_secs(8);

static DEFINITION: LazyLock<Arc<GameDefinition>> = LazyLock::new(|| Arc::new(cah_definition()));

/// Build the game definition.
#[must_use]
pub fn cah_definition() -> GameDefinition {
    GameDefinition::new("Prompts & Punchlines", DEALING)
        .with_players(3, 10)
        .with_hand_size(HAND_SIZE)
        .allow_in_lobby(ActionType::StartGame, Authority::Host)
        .with_phase(
            PhaseDefinition::new(DEALING, "Dealing")
                .on_enter(PhaseEffect::DrawPrompt)
                .on_enter(PhaseEffect::DealHands)
                .transition(TransitionCondition::Always, PhaseTarget::Phase(SUBMITTING)),
        )
        .with_phase(
            PhaseDefinition::new(SUBMITTING, "Submitting")
                .allow(ActionType::Submit, Authority::NonLead)
                .with_timeout(SUBMIT_TIMEOUT)
                .transition(TransitionCondition::AllSubmitted, PhaseTarget::Phase(JUDGING))
                .transition(TransitionCondition::TimeoutElapsed, PhaseTarget::Phase(JUDGING)),
        )
        .with_phase(
            PhaseDefinition::new(JUDGING, "Judging")
                .on_enter(PhaseEffect::ShuffleSubmissions)
                .allow(ActionType::JudgePick, Authority::Lead)
                .with_timeout(JUDGE_TIMEOUT)
                .transition(TransitionCondition::JudgePicked, PhaseTarget::Phase(REVEAL))
                .transition(TransitionCondition::TimeoutElapsed, PhaseTarget::Phase(REVEAL)),
        )
        .with_phase(
            PhaseDefinition::new(REVEAL, "Reveal")
                .on_enter(PhaseEffect::RevealSubmissions)
                .allow(ActionType::Advance, Authority::Lead)
                .with_timeout(REVEAL_TIMEOUT)
                .transition(TransitionCondition::Manual, PhaseTarget::Phase(SCORING))
                .transition(TransitionCondition::TimeoutElapsed, PhaseTarget::Phase(SCORING)),
        )
        .with_phase(
            PhaseDefinition::new(SCORING, "Scoring")
                .on_enter(PhaseEffect::AwardWinner)
                .allow(ActionType::Advance, Authority::Lead)
                .with_timeout(SCORING_TIMEOUT)
                .transition(TransitionCondition::Manual, PhaseTarget::NextRound)
                .transition(TransitionCondition::TimeoutElapsed, PhaseTarget::NextRound)
                .ending_round(),
        )
        .end_when(TransitionCondition::ScoreThreshold(WINNING_SCORE))
        .end_when(TransitionCondition::RoundLimit(ROUND_LIMIT))
}

/// Definition shared by every room of this game.
#[must_use]
pub fn shared_definition() -> Arc<GameDefinition> {
    Arc::clone(&*DEFINITION)
}

/// Engine over the given packs (all built-in packs when `packs` is empty).
pub fn engine(packs: &[CardPack]) -> Result<Engine, GameError> {
    let registry = if packs.is_empty() {
        combine_packs(&builtin_packs())
    } else {
        combine_packs(packs)
    };
    Engine::new(shared_definition(), Arc::new(registry))
}
