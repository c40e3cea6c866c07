//! Per-participant views of a game.
//!
//! `sanitize` is the only way game state reaches a client. It enforces the
//! visibility rules:
//! - A hand is visible only to its owner; others see its size
//! - Decks and discards are reported as sizes
//! - Before reveal, nobody sees submission contents except the lead, who sees
//!   them without authors while judging is open
//! - From reveal on, everyone sees contents with authors

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cards::{CardId, CardRegistry};
use crate::core::{ActionType, GameState, GameStatus, PhaseId, PlayerId, Presence};
use crate::rules::{phase_deadline, GameDefinition};

/// A card with its text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardFace {
    pub id: CardId,
    pub text: String,
}

impl CardFace {
    fn resolve(registry: &CardRegistry, id: CardId) -> Self {
        Self {
            id,
            text: registry.text_of(id).unwrap_or_default().to_owned(),
        }
    }
}

/// The active phase.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseView {
    pub id: PhaseId,
    pub name: String,
    /// When the phase times out, if it has a timer.
    pub deadline: Option<DateTime<Utc>>,
}

/// Public facts about one roster entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
    pub presence: Presence,
    pub is_lead: bool,
    pub has_submitted: bool,
    pub hand_size: usize,
}

/// One submission slot as the viewer may see it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionView {
    pub slot: usize,
    pub cards: Vec<CardFace>,
    /// Present only after reveal.
    pub author: Option<PlayerId>,
}

/// Everything one participant is allowed to know.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub you: PlayerId,
    pub status: GameStatus,
    pub round: u32,
    pub phase: Option<PhaseView>,
    pub hand: Vec<CardFace>,
    pub players: Vec<PlayerSummary>,
    pub prompt: Option<CardFace>,
    pub pick: usize,
    pub submissions: Vec<SubmissionView>,
    pub winner: Option<usize>,
    pub responses_remaining: usize,
    pub responses_discarded: usize,
    pub prompts_remaining: usize,
}

/// Build `viewer`'s view, or `None` if they are not in the roster.
#[must_use]
pub fn sanitize(
    state: &GameState,
    definition: &GameDefinition,
    registry: &CardRegistry,
    viewer: &PlayerId,
) -> Option<PlayerView> {
    let me = state.player(viewer)?;
    let round = &state.round;

    let running = state.is_running();
    let phase_def = round
        .phase
        .filter(|_| running)
        .and_then(|id| definition.phase(id).ok());

    let phase = phase_def.map(|p| PhaseView {
        id: p.id,
        name: p.name.clone(),
        deadline: phase_deadline(state, definition),
    });

    let judging = me.is_lead && phase_def.is_some_and(|p| p.authority_for(ActionType::JudgePick).is_some());

    let submissions = if round.revealed {
        round
            .submissions
            .iter()
            .enumerate()
            .map(|(slot, s)| SubmissionView {
                slot,
                cards: s.cards.iter().map(|c| CardFace::resolve(registry, *c)).collect(),
                author: Some(s.player.clone()),
            })
            .collect()
    } else if judging {
        round
            .submissions
            .iter()
            .enumerate()
            .map(|(slot, s)| SubmissionView {
                slot,
                cards: s.cards.iter().map(|c| CardFace::resolve(registry, *c)).collect(),
                author: None,
            })
            .collect()
    } else {
        Vec::new()
    };

    let players = state
        .players
        .iter()
        .map(|p| PlayerSummary {
            id: p.id.clone(),
            name: p.name.clone(),
            score: p.score,
            presence: p.presence,
            is_lead: p.is_lead,
            has_submitted: round.has_submitted(&p.id),
            hand_size: p.hand_size(),
        })
        .collect();

    Some(PlayerView {
        you: viewer.clone(),
        status: state.status,
        round: round.number,
        phase,
        hand: me.hand.iter().map(|c| CardFace::resolve(registry, *c)).collect(),
        players,
        prompt: round.prompt.map(|c| CardFace::resolve(registry, c)),
        pick: round.pick,
        submissions,
        winner: round.winner,
        responses_remaining: state.responses.deck_len(),
        responses_discarded: state.responses.discard_len(),
        prompts_remaining: state.prompts.deck_len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::combine_packs;
    use crate::core::{Action, ActionKind, GameSettings, Player};
    use crate::games::cah::{self, JUDGING, SUBMITTING};
    use crate::rules::{ActionContext, Engine};

    fn started() -> (Engine, GameState) {
        let engine = cah::engine(&[]).unwrap();
        let ctx = ActionContext::now();
        let mut state = engine.create_game(GameSettings::default().with_seed(42), &ctx).unwrap();
        for id in ["a", "b", "c"] {
            state = engine.add_player(&state, Player::new(id, id.to_uppercase())).unwrap();
        }
        let start = Action::by("a", ActionKind::StartGame, Utc::now());
        let state = engine.apply_action(&state, &start, &ctx).unwrap().state;
        (engine, state)
    }

    fn submit(engine: &Engine, state: &GameState, player: &str) -> GameState {
        let me = state.player(&PlayerId::new(player)).unwrap();
        let cards: Vec<_> = me.hand.iter().copied().take(state.round.pick).collect();
        let action = Action::by(player, ActionKind::submit(&cards), Utc::now());
        engine.apply_action(state, &action, &ActionContext::now()).unwrap().state
    }

    fn view(engine: &Engine, state: &GameState, player: &str) -> PlayerView {
        sanitize(state, engine.definition(), engine.cards(), &PlayerId::new(player)).unwrap()
    }

    #[test]
    fn test_hand_is_private() {
        let (engine, state) = started();
        let b = view(&engine, &state, "b");

        let own: Vec<_> = state.players[1].hand.iter().copied().collect();
        assert_eq!(b.hand.iter().map(|c| c.id).collect::<Vec<_>>(), own);
        assert!(b.hand.iter().all(|c| !c.text.is_empty()));

        let json = serde_json::to_string(&b).unwrap();
        for card in state.players[2].hand.iter() {
            if !own.contains(card) {
                let needle = format!("\"id\":{}", card.raw());
                assert!(!json.contains(&needle), "leaked {}", card);
            }
        }
        assert_eq!(b.players[2].hand_size, cah::HAND_SIZE);
    }

    #[test]
    fn test_judge_sees_anonymous_submissions() {
        let (engine, state) = started();
        assert_eq!(state.phase(), Some(SUBMITTING));

        let state = submit(&engine, &state, "b");
        // Still submitting: nobody sees anything.
        assert!(view(&engine, &state, "a").submissions.is_empty());
        assert!(view(&engine, &state, "b").submissions.is_empty());
        assert!(view(&engine, &state, "b").players[1].has_submitted);

        let state = submit(&engine, &state, "c");
        assert_eq!(state.phase(), Some(JUDGING));

        let judge = view(&engine, &state, "a");
        assert_eq!(judge.submissions.len(), 2);
        assert!(judge.submissions.iter().all(|s| s.author.is_none()));
        assert!(judge.phase.as_ref().unwrap().deadline.is_some());

        assert_eq!(view(&engine, &state, "b").submissions.len(), 0);
        assert_eq!(view(&engine, &state, "c").submissions.len(), 0);
    }

    #[test]
    fn test_reveal_shows_authors_to_everyone() {
        let (engine, state) = started();
        let state = submit(&engine, &state, "b");
        let state = submit(&engine, &state, "c");
        let pick = Action::by("a", ActionKind::JudgePick { slot: 0 }, Utc::now());
        let state = engine.apply_action(&state, &pick, &ActionContext::now()).unwrap().state;

        for viewer in ["a", "b", "c"] {
            let v = view(&engine, &state, viewer);
            assert_eq!(v.submissions.len(), 2);
            assert!(v.submissions.iter().all(|s| s.author.is_some()));
            assert_eq!(v.winner, Some(0));
        }
    }

    #[test]
    fn test_unknown_viewer() {
        let (engine, state) = started();
        assert!(sanitize(&state, engine.definition(), engine.cards(), &PlayerId::new("zed")).is_none());
    }

    #[test]
    fn test_lobby_view() {
        let engine = cah::engine(&[]).unwrap();
        let state = engine.create_game(GameSettings::default().with_seed(42), &ActionContext::now()).unwrap();
        let state = engine.add_player(&state, Player::new("a", "A")).unwrap();

        let v = view(&engine, &state, "a");
        assert_eq!(v.status, GameStatus::Lobby);
        assert!(v.phase.is_none());
        assert!(v.hand.is_empty());
        assert!(v.prompt.is_none());
        assert_eq!(v.responses_remaining, combine_packs(&cah::builtin_packs()).responses().len());
    }
}
