//! Action validation and transition conditions.
//!
//! Both are pure reads of a `GameState` against a `GameDefinition`. The
//! engine calls them on every action; the room host may call
//! `validate_action` directly to pre-check input.

use chrono::{DateTime, Utc};

use super::definition::{Authority, GameDefinition, TransitionCondition};
use crate::core::action::{Action, ActionKind, ActionType, Actor};
use crate::core::error::GameError;
use crate::core::state::{GameState, GameStatus};

/// Result of validating an action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Validation {
    pub valid: bool,
    pub reason: Option<String>,
    pub error: Option<GameError>,
}

impl Validation {
    #[must_use]
    pub fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
            error: None,
        }
    }

    #[must_use]
    pub fn rejected(error: GameError) -> Self {
        Self {
            valid: false,
            reason: Some(error.to_string()),
            error: Some(error),
        }
    }

    /// Convert back into a typed result.
    pub fn into_result(self) -> Result<(), GameError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Validate an action without applying it.
///
/// Duplicates of already-applied actions are reported as invalid here; the
/// engine treats them as silent no-ops instead.
#[must_use]
pub fn validate_action(state: &GameState, action: &Action, definition: &GameDefinition) -> Validation {
    match check_duplicate(state, action, definition).and_then(|()| check_action(state, action, definition)) {
        Ok(()) => Validation::ok(),
        Err(error) => Validation::rejected(error),
    }
}

/// Reject an action whose idempotency key was already applied.
///
/// Also catches a retry that lands after the phase moved on: if the action
/// is no longer accepted here and the same actor already applied the same
/// action type, the retry is a duplicate rather than a mistake.
pub fn check_duplicate(state: &GameState, action: &Action, definition: &GameDefinition) -> Result<(), GameError> {
    let key = action.idempotency_key(state.round.number, state.round.phase);
    if state.applied.contains(&key) {
        return Err(GameError::DuplicateAction(key));
    }

    if required_authority(state, action, definition).is_none() {
        let earlier = state
            .applied
            .iter()
            .any(|k| k.actor == key.actor && k.action == key.action);
        if earlier {
            return Err(GameError::DuplicateAction(key));
        }
    }
    Ok(())
}

/// Check an action against the current state and definition.
pub fn check_action(state: &GameState, action: &Action, definition: &GameDefinition) -> Result<(), GameError> {
    let action_type = action.action_type();

    if state.status == GameStatus::GameOver {
        return Err(GameError::IllegalPhase {
            action: action_type,
            phase: "game over".into(),
        });
    }

    if let Actor::Player(id) = &action.actor {
        let player = state.player(id).ok_or_else(|| GameError::UnknownPlayer(id.clone()))?;
        if !player.is_connected() {
            return Err(GameError::Validation(format!("{} is disconnected", id)));
        }
    }

    let authority = required_authority(state, action, definition).ok_or_else(|| GameError::IllegalPhase {
        action: action_type,
        phase: phase_name(state, definition),
    })?;

    if !holds_authority(state, &action.actor, authority) {
        return Err(GameError::NotYourTurn {
            player: action.actor.to_string(),
            action: action_type,
        });
    }

    check_payload(state, action, definition)
}

/// Authority the current phase (or lobby) requires for this action.
///
/// Timeouts are never listed in a definition: the host may issue one for
/// the current phase whenever that phase has a timeout.
fn required_authority(state: &GameState, action: &Action, definition: &GameDefinition) -> Option<Authority> {
    let action_type = action.action_type();
    match state.status {
        GameStatus::GameOver => None,
        GameStatus::Lobby => definition.lobby_authority_for(action_type),
        GameStatus::InProgress | GameStatus::RoundEnd => {
            let phase = definition.phase(state.round.phase?).ok()?;
            if action_type == ActionType::Timeout {
                phase.timeout.map(|_| Authority::System)
            } else {
                phase.authority_for(action_type)
            }
        }
    }
}

fn holds_authority(state: &GameState, actor: &Actor, authority: Authority) -> bool {
    let id = match (actor, authority) {
        (Actor::System, Authority::System) => return true,
        (Actor::System, _) | (Actor::Player(_), Authority::System) => return false,
        (Actor::Player(id), _) => id,
    };

    match authority {
        Authority::Anyone => true,
        Authority::Host => state.host().is_some_and(|p| &p.id == id),
        Authority::Lead => state.player(id).is_some_and(|p| p.is_lead),
        Authority::NonLead => state.player(id).is_some_and(|p| !p.is_lead),
        Authority::System => false,
    }
}

fn check_payload(state: &GameState, action: &Action, definition: &GameDefinition) -> Result<(), GameError> {
    let round = &state.round;

    match &action.kind {
        ActionKind::StartGame => {
            let needed = definition.min_players.max(state.settings.min_players);
            let connected = state.connected_count();
            if connected < needed {
                return Err(GameError::Validation(format!(
                    "need {} connected players to start, have {}",
                    needed, connected
                )));
            }
        }

        ActionKind::Submit { cards } => {
            let Some(id) = action.player() else {
                return Err(GameError::Validation("only players submit cards".into()));
            };
            if round.prompt.is_none() {
                return Err(GameError::Validation("no prompt to answer".into()));
            }
            if round.has_submitted(id) {
                return Err(GameError::Validation("already submitted this round".into()));
            }
            if cards.len() != round.pick {
                return Err(GameError::Validation(format!(
                    "prompt needs {} card(s), got {}",
                    round.pick,
                    cards.len()
                )));
            }
            for (i, card) in cards.iter().enumerate() {
                if cards[..i].contains(card) {
                    return Err(GameError::Validation(format!("{} submitted twice", card)));
                }
            }
            let player = state.player(id).ok_or_else(|| GameError::UnknownPlayer(id.clone()))?;
            if let Some(card) = cards.iter().find(|c| !player.holds(**c)) {
                return Err(GameError::Validation(format!("{} is not in hand", card)));
            }
        }

        ActionKind::JudgePick { slot } => {
            if round.winner.is_some() {
                return Err(GameError::Validation("winner already picked".into()));
            }
            if *slot >= round.submissions.len() {
                return Err(GameError::Validation(format!("no submission in slot {}", slot)));
            }
        }

        ActionKind::Reveal => {
            if round.revealed {
                return Err(GameError::Validation("submissions already revealed".into()));
            }
        }

        ActionKind::Score => {
            if round.winner.is_none() || round.scored {
                return Err(GameError::Validation("nothing to score".into()));
            }
        }

        ActionKind::Timeout { phase, round: number } => {
            if Some(*phase) != round.phase || *number != round.number {
                return Err(GameError::Validation(format!(
                    "stale timeout for {} of round {}",
                    phase, number
                )));
            }
        }

        ActionKind::Deal | ActionKind::Advance => {}
    }

    Ok(())
}

fn phase_name(state: &GameState, definition: &GameDefinition) -> String {
    match state.status {
        GameStatus::Lobby => "lobby".into(),
        GameStatus::GameOver => "game over".into(),
        GameStatus::InProgress | GameStatus::RoundEnd => state
            .round
            .phase
            .and_then(|id| definition.phase(id).ok())
            .map_or_else(|| "no phase".into(), |p| p.name.clone()),
    }
}

/// Inputs to transition checks beyond the state itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EvalContext {
    /// Current time, for deadline checks.
    pub now: DateTime<Utc>,
    /// Action that prompted this evaluation. Only the first transition of a
    /// chain sees it.
    pub trigger: Option<ActionType>,
}

impl EvalContext {
    #[must_use]
    pub fn new(now: DateTime<Utc>, trigger: Option<ActionType>) -> Self {
        Self { now, trigger }
    }
}

/// Check whether a transition condition holds for the live state.
#[must_use]
pub fn check_transition_condition(
    state: &GameState,
    definition: &GameDefinition,
    condition: TransitionCondition,
    eval: &EvalContext,
) -> bool {
    match condition {
        TransitionCondition::AllSubmitted => {
            let mut eligible = state.connected_players().filter(|p| !p.is_lead).peekable();
            eligible.peek().is_some() && eligible.all(|p| state.round.has_submitted(&p.id))
        }
        TransitionCondition::TimeoutElapsed => {
            eval.trigger == Some(ActionType::Timeout) || deadline_passed(state, definition, eval.now)
        }
        TransitionCondition::Manual => eval.trigger == Some(ActionType::Advance),
        TransitionCondition::ScoreThreshold(threshold) => state.players.iter().any(|p| p.score >= threshold),
        TransitionCondition::JudgePicked => state.round.winner.is_some(),
        TransitionCondition::RoundLimit(limit) => state.round.number >= limit,
        TransitionCondition::Always => true,
    }
}

/// When the current phase times out, if it has a timeout.
#[must_use]
pub fn phase_deadline(state: &GameState, definition: &GameDefinition) -> Option<DateTime<Utc>> {
    let phase = definition.phase(state.round.phase?).ok()?;
    let timeout = chrono::Duration::from_std(phase.timeout?).ok()?;
    state.round.phase_entered_at.map(|entered| entered + timeout)
}

fn deadline_passed(state: &GameState, definition: &GameDefinition, now: DateTime<Utc>) -> bool {
    phase_deadline(state, definition).is_some_and(|deadline| deadline <= now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::CardId;
    use crate::core::{ActionKind, GameSettings, PhaseId, Player, PlayerId, Submission};
    use crate::rules::definition::{PhaseDefinition, PhaseTarget};
    use std::time::Duration;

    const PLAY: PhaseId = PhaseId::new(1);

    fn definition() -> GameDefinition {
        GameDefinition::new("Test", PLAY)
            .allow_in_lobby(ActionType::StartGame, Authority::Host)
            .with_phase(
                PhaseDefinition::new(PLAY, "Play")
                    .allow(ActionType::Submit, Authority::NonLead)
                    .allow(ActionType::JudgePick, Authority::Lead)
                    .with_timeout(Duration::from_secs(30))
                    .transition(TransitionCondition::JudgePicked, PhaseTarget::NextRound),
            )
    }

    fn lobby(players: &[&str]) -> GameState {
        let cards = (100..140).map(CardId::new).collect();
        let mut state = GameState::new(GameSettings::default().with_seed(42), cards, vec![CardId::new(1)], Utc::now());
        for id in players {
            state.players.push_back(Player::new(*id, id.to_uppercase()));
        }
        state
    }

    /// a is lead; b and c hold two cards each; prompt wants one card.
    fn in_play() -> GameState {
        let mut state = lobby(&["a", "b", "c"]);
        state.status = GameStatus::InProgress;
        state.round.number = 1;
        state.round.phase = Some(PLAY);
        state.round.phase_entered_at = Some(Utc::now());
        state.round.prompt = Some(CardId::new(1));
        state.round.pick = 1;
        state.players[0].is_lead = true;
        state.players[1].hand.extend([CardId::new(101), CardId::new(102)]);
        state.players[2].hand.extend([CardId::new(103), CardId::new(104)]);
        state
    }

    fn submit(player: &str, cards: &[u32]) -> Action {
        let cards: Vec<_> = cards.iter().copied().map(CardId::new).collect();
        Action::by(player, ActionKind::submit(&cards), Utc::now())
    }

    #[test]
    fn test_start_requires_host_and_players() {
        let def = definition();

        let two = lobby(&["a", "b"]);
        let start = Action::by("a", ActionKind::StartGame, Utc::now());
        assert!(matches!(check_action(&two, &start, &def), Err(GameError::Validation(_))));

        let three = lobby(&["a", "b", "c"]);
        assert!(check_action(&three, &start, &def).is_ok());

        let not_host = Action::by("b", ActionKind::StartGame, Utc::now());
        assert!(matches!(
            check_action(&three, &not_host, &def),
            Err(GameError::NotYourTurn { .. })
        ));
    }

    #[test]
    fn test_unknown_and_disconnected_players() {
        let def = definition();
        let mut state = in_play();

        let stranger = submit("zed", &[101]);
        assert_eq!(
            check_action(&state, &stranger, &def),
            Err(GameError::UnknownPlayer(PlayerId::new("zed")))
        );

        state.players[1].disconnect(Utc::now());
        assert!(matches!(
            check_action(&state, &submit("b", &[101]), &def),
            Err(GameError::Validation(_))
        ));
    }

    #[test]
    fn test_illegal_phase() {
        let def = definition();
        let state = lobby(&["a", "b", "c"]);
        let err = check_action(&state, &submit("b", &[101]), &def).unwrap_err();
        assert_eq!(
            err,
            GameError::IllegalPhase {
                action: ActionType::Submit,
                phase: "lobby".into()
            }
        );
    }

    #[test]
    fn test_lead_cannot_submit() {
        let def = definition();
        let mut state = in_play();
        state.players[0].hand.push_back(CardId::new(110));

        assert!(matches!(
            check_action(&state, &submit("a", &[110]), &def),
            Err(GameError::NotYourTurn { .. })
        ));
    }

    #[test]
    fn test_submit_payload_rules() {
        let def = definition();
        let state = in_play();

        assert!(check_action(&state, &submit("b", &[101]), &def).is_ok());
        // Not in hand.
        assert!(check_action(&state, &submit("b", &[103]), &def).is_err());
        // Wrong count.
        assert!(check_action(&state, &submit("b", &[101, 102]), &def).is_err());
        assert!(check_action(&state, &submit("b", &[]), &def).is_err());

        let mut two_pick = state.clone();
        two_pick.round.pick = 2;
        assert!(check_action(&two_pick, &submit("b", &[101, 102]), &def).is_ok());
        assert!(check_action(&two_pick, &submit("b", &[101, 101]), &def).is_err());
    }

    #[test]
    fn test_submit_once_per_round() {
        let def = definition();
        let mut state = in_play();
        state.round.submissions.push_back(Submission {
            player: PlayerId::new("b"),
            cards: vec![CardId::new(101)],
            at: Utc::now(),
        });

        let err = check_action(&state, &submit("b", &[102]), &def).unwrap_err();
        assert_eq!(err, GameError::Validation("already submitted this round".into()));
    }

    #[test]
    fn test_judge_pick_slot() {
        let def = definition();
        let mut state = in_play();
        let pick = |slot| Action::by("a", ActionKind::JudgePick { slot }, Utc::now());

        assert!(check_action(&state, &pick(0), &def).is_err());

        state.round.submissions.push_back(Submission {
            player: PlayerId::new("b"),
            cards: vec![CardId::new(101)],
            at: Utc::now(),
        });
        assert!(check_action(&state, &pick(0), &def).is_ok());
        assert!(check_action(&state, &pick(1), &def).is_err());
    }

    #[test]
    fn test_timeout_only_from_system_and_current() {
        let def = definition();
        let state = in_play();

        let current = Action::timeout(PLAY, 1, Utc::now());
        assert!(check_action(&state, &current, &def).is_ok());

        let stale = Action::timeout(PLAY, 0, Utc::now());
        assert!(matches!(check_action(&state, &stale, &def), Err(GameError::Validation(_))));

        let forged = Action::by("b", ActionKind::Timeout { phase: PLAY, round: 1 }, Utc::now());
        assert!(matches!(
            check_action(&state, &forged, &def),
            Err(GameError::NotYourTurn { .. })
        ));
    }

    #[test]
    fn test_game_over_rejects_everything() {
        let def = definition();
        let mut state = in_play();
        state.status = GameStatus::GameOver;
        assert!(matches!(
            check_action(&state, &submit("b", &[101]), &def),
            Err(GameError::IllegalPhase { .. })
        ));
    }

    #[test]
    fn test_duplicate_detection() {
        let def = definition();
        let mut state = in_play();
        let action = submit("b", &[101]);

        assert!(check_duplicate(&state, &action, &def).is_ok());
        state.applied.insert(action.idempotency_key(1, Some(PLAY)));

        let retry = submit("b", &[102]);
        assert!(matches!(
            check_duplicate(&state, &retry, &def),
            Err(GameError::DuplicateAction(_))
        ));

        let validation = validate_action(&state, &retry, &def);
        assert!(!validation.valid);
        assert!(validation.reason.is_some());
    }

    #[test]
    fn test_validate_action_ok() {
        let def = definition();
        let state = in_play();
        let validation = validate_action(&state, &submit("c", &[104]), &def);
        assert_eq!(validation, Validation::ok());
        assert!(validation.into_result().is_ok());
    }

    #[test]
    fn test_all_submitted() {
        let def = definition();
        let mut state = in_play();
        let eval = EvalContext::new(Utc::now(), None);
        let holds = |s: &GameState| check_transition_condition(s, &def, TransitionCondition::AllSubmitted, &eval);

        assert!(!holds(&state));

        state.round.submissions.push_back(Submission {
            player: PlayerId::new("b"),
            cards: vec![CardId::new(101)],
            at: Utc::now(),
        });
        assert!(!holds(&state));

        // A disconnected non-lead no longer blocks.
        state.players[2].disconnect(Utc::now());
        assert!(holds(&state));

        // Nobody eligible: never holds.
        state.players[1].disconnect(Utc::now());
        assert!(!holds(&state));
    }

    #[test]
    fn test_timeout_elapsed() {
        let def = definition();
        let state = in_play();
        let entered = state.round.phase_entered_at.unwrap();

        let early = EvalContext::new(entered + chrono::Duration::seconds(5), None);
        let late = EvalContext::new(entered + chrono::Duration::seconds(30), None);
        let fired = EvalContext::new(entered, Some(ActionType::Timeout));

        let holds = |eval: &EvalContext| check_transition_condition(&state, &def, TransitionCondition::TimeoutElapsed, eval);
        assert!(!holds(&early));
        assert!(holds(&late));
        assert!(holds(&fired));
        assert_eq!(phase_deadline(&state, &def), Some(entered + chrono::Duration::seconds(30)));
    }

    #[test]
    fn test_other_conditions() {
        let def = definition();
        let mut state = in_play();
        let idle = EvalContext::new(Utc::now(), None);
        let advance = EvalContext::new(Utc::now(), Some(ActionType::Advance));

        assert!(!check_transition_condition(&state, &def, TransitionCondition::Manual, &idle));
        assert!(check_transition_condition(&state, &def, TransitionCondition::Manual, &advance));

        assert!(!check_transition_condition(&state, &def, TransitionCondition::ScoreThreshold(2), &idle));
        state.players[1].score = 2;
        assert!(check_transition_condition(&state, &def, TransitionCondition::ScoreThreshold(2), &idle));

        assert!(check_transition_condition(&state, &def, TransitionCondition::RoundLimit(1), &idle));
        assert!(!check_transition_condition(&state, &def, TransitionCondition::RoundLimit(2), &idle));

        assert!(!check_transition_condition(&state, &def, TransitionCondition::JudgePicked, &idle));
        assert!(check_transition_condition(&state, &def, TransitionCondition::Always, &idle));
    }
}
