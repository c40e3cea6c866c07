//! Engine scenarios over the built-in prompt/response game.
//!
//! These drive whole rounds through `Engine::apply_action` and check what
//! each participant's view shows along the way.

use party_engine::games::cah::{self, JUDGING, REVEAL, SCORING, SUBMITTING};
use party_engine::session::sanitize;
use party_engine::zones::{Pile, PileKind};
use party_engine::{
    Action, ActionContext, ActionKind, Card, CardId, CardPack, Engine, GameError, GameEvent, GameRng, GameSettings, GameState,
    GameStatus, Player, PlayerId,
};

fn pid(id: &str) -> PlayerId {
    PlayerId::new(id)
}

fn ctx() -> ActionContext {
    ActionContext::now()
}

/// Lobby with the given players joined in order.
fn lobby(ids: &[&str]) -> (Engine, GameState) {
    let engine = cah::engine(&[]).unwrap();
    let mut state = engine
        .create_game(GameSettings::default().with_seed(7), &ctx())
        .unwrap();
    for id in ids {
        state = engine.add_player(&state, Player::new(*id, id.to_uppercase())).unwrap();
    }
    (engine, state)
}

fn act(engine: &Engine, state: &GameState, player: &str, kind: ActionKind) -> Result<GameState, GameError> {
    let action = Action::by(player, kind, chrono::Utc::now());
    engine.apply_action(state, &action, &ctx()).map(|o| o.state)
}

/// Three players, round one, in the submitting phase.
fn started() -> (Engine, GameState) {
    let (engine, state) = lobby(&["a", "b", "c"]);
    let state = act(&engine, &state, "a", ActionKind::StartGame).unwrap();
    (engine, state)
}

/// Play the first `pick` cards of `player`'s hand.
fn submit(engine: &Engine, state: &GameState, player: &str) -> Result<GameState, GameError> {
    let cards: Vec<CardId> = state
        .player(&pid(player))
        .unwrap()
        .hand
        .iter()
        .take(state.round.pick)
        .copied()
        .collect();
    act(engine, state, player, ActionKind::submit(&cards))
}

fn lead(state: &GameState) -> &str {
    state.lead().unwrap().id.as_str()
}

/// Test that starting deals every hand and lands in the submitting phase.
#[test]
fn test_start_deals_and_reaches_submitting() {
    let (_engine, state) = started();

    assert_eq!(state.status, GameStatus::InProgress);
    assert_eq!(state.round.number, 1);
    assert_eq!(state.phase(), Some(SUBMITTING));
    assert!(state.round.prompt.is_some());
    assert_eq!(lead(&state), "a");
    for player in &state.players {
        assert_eq!(player.hand_size(), cah::HAND_SIZE);
    }
}

/// Test that only the host can start and only with enough players.
#[test]
fn test_start_requires_host_and_quorum() {
    let (engine, state) = lobby(&["a", "b"]);
    let err = act(&engine, &state, "a", ActionKind::StartGame).unwrap_err();
    assert!(matches!(err, GameError::Validation(_)));

    let (engine, state) = lobby(&["a", "b", "c"]);
    let err = act(&engine, &state, "b", ActionKind::StartGame).unwrap_err();
    assert!(matches!(err, GameError::NotYourTurn { .. }));
}

/// Test that the last submission moves to judging with no further input,
/// and that only the judge sees the (anonymous) submissions.
#[test]
fn test_three_player_round_reaches_judging() {
    let (engine, state) = started();

    let state = submit(&engine, &state, "b").unwrap();
    assert_eq!(state.phase(), Some(SUBMITTING));

    let state = submit(&engine, &state, "c").unwrap();
    assert_eq!(state.phase(), Some(JUDGING));
    assert_eq!(state.round.submissions.len(), 2);

    let definition = engine.definition();
    let cards = engine.cards();

    let judge = sanitize(&state, definition, cards, &pid("a")).unwrap();
    assert_eq!(judge.submissions.len(), 2);
    assert!(judge.submissions.iter().all(|s| s.author.is_none()));

    for submitter in ["b", "c"] {
        let view = sanitize(&state, definition, cards, &pid(submitter)).unwrap();
        assert!(view.submissions.is_empty());
        assert_eq!(view.hand.len(), cah::HAND_SIZE - state.round.pick);
    }
}

/// Test that the judge cannot submit and submitters cannot judge.
#[test]
fn test_role_permissions() {
    let (engine, state) = started();

    let err = submit(&engine, &state, "a").unwrap_err();
    assert!(matches!(err, GameError::NotYourTurn { .. }));

    let err = act(&engine, &state, "b", ActionKind::JudgePick { slot: 0 }).unwrap_err();
    assert!(matches!(err, GameError::IllegalPhase { .. }));
}

/// Test that a submission must match the prompt's pick count and come from hand.
#[test]
fn test_submission_payload_checked() {
    let (engine, state) = started();
    let hand: Vec<CardId> = state.player(&pid("b")).unwrap().hand.iter().copied().collect();

    let too_many = &hand[..state.round.pick + 1];
    let err = act(&engine, &state, "b", ActionKind::submit(too_many)).unwrap_err();
    assert!(matches!(err, GameError::Validation(_)));

    let foreign: Vec<CardId> = state
        .player(&pid("c"))
        .unwrap()
        .hand
        .iter()
        .take(state.round.pick)
        .copied()
        .collect();
    let err = act(&engine, &state, "b", ActionKind::submit(&foreign)).unwrap_err();
    assert!(matches!(err, GameError::Validation(_)));
}

/// Test a whole round: pick, reveal, score, and the judge rotating.
#[test]
fn test_full_round_scores_and_rotates() {
    let (engine, state) = started();
    let state = submit(&engine, &state, "b").unwrap();
    let state = submit(&engine, &state, "c").unwrap();

    let state = act(&engine, &state, "a", ActionKind::JudgePick { slot: 1 }).unwrap();
    assert_eq!(state.phase(), Some(REVEAL));
    assert!(state.round.revealed);
    let winner = state.round.winning_submission().unwrap().player.clone();

    let view = sanitize(&state, engine.definition(), engine.cards(), &pid("b")).unwrap();
    assert_eq!(view.submissions.len(), 2);
    assert!(view.submissions.iter().all(|s| s.author.is_some()));

    let state = act(&engine, &state, "a", ActionKind::Advance).unwrap();
    assert_eq!(state.phase(), Some(SCORING));
    assert_eq!(state.player(&winner).unwrap().score, 1);

    let state = act(&engine, &state, "a", ActionKind::Advance).unwrap();
    assert_eq!(state.round.number, 2);
    assert_eq!(state.phase(), Some(SUBMITTING));
    assert_eq!(lead(&state), "b");
    assert!(state.round.submissions.is_empty());
    for player in &state.players {
        assert_eq!(player.hand_size(), cah::HAND_SIZE);
    }
    assert_eq!(state.player(&winner).unwrap().score, 1);
}

/// Test that a timeout moves on without the missing submission.
#[test]
fn test_submit_timeout_moves_to_judging() {
    let (engine, state) = started();
    let state = submit(&engine, &state, "b").unwrap();

    let timeout = Action::timeout(SUBMITTING, 1, chrono::Utc::now());
    let outcome = engine.apply_action(&state, &timeout, &ctx()).unwrap();
    assert_eq!(outcome.state.phase(), Some(JUDGING));
    assert_eq!(outcome.state.round.submissions.len(), 1);

    // A timer for a phase that already ended is rejected.
    let stale = Action::timeout(SUBMITTING, 1, chrono::Utc::now());
    let err = engine.apply_action(&outcome.state, &stale, &ctx());
    assert!(err.is_err() || err.unwrap().is_noop());
}

/// Test that retrying an applied action changes nothing.
#[test]
fn test_resubmit_is_noop() {
    let (engine, state) = started();
    let cards: Vec<CardId> = state.player(&pid("b")).unwrap().hand.iter().take(state.round.pick).copied().collect();
    let action = Action::by("b", ActionKind::submit(&cards), chrono::Utc::now());

    let first = engine.apply_action(&state, &action, &ctx()).unwrap();
    let retry = engine.apply_action(&first.state, &action, &ctx()).unwrap();

    assert!(retry.is_noop());
    assert_eq!(retry.state, first.state);
}

/// Test that removing the judge hands the role to the next connected player.
#[test]
fn test_removing_judge_picks_next_connected() {
    let (engine, state) = lobby(&["a", "b", "c", "d"]);
    let state = act(&engine, &state, "a", ActionKind::StartGame).unwrap();
    let state = engine.remove_player(&state, &pid("b"), &ctx()).unwrap().state;
    let state = submit(&engine, &state, "c").unwrap();
    let c_hand = state.player(&pid("c")).unwrap().hand_size();

    let outcome = engine.remove_player(&state, &pid("a"), &ctx()).unwrap();
    let state = outcome.state;

    // b is disconnected, so c is next.
    assert_eq!(lead(&state), "c");
    assert!(outcome
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::LeadAssigned { player } if player.as_str() == "c")));

    // The new judge's pending submission goes back to their hand.
    assert!(!state.round.has_submitted(&pid("c")));
    assert_eq!(state.player(&pid("c")).unwrap().hand_size(), c_hand + state.round.pick);
    assert_eq!(state.phase(), Some(SUBMITTING));
    assert_eq!(state.players.len(), 4);
}

/// Test that a disconnected player who comes back keeps their slot and hand.
#[test]
fn test_reconnect_restores_same_entry() {
    let (engine, state) = started();
    let hand = state.player(&pid("c")).unwrap().hand.clone();

    let state = engine.remove_player(&state, &pid("c"), &ctx()).unwrap().state;
    assert!(!state.player(&pid("c")).unwrap().is_connected());

    let state = engine.reconnect_player(&state, &pid("c"), &ctx()).unwrap().state;
    let entries = state.players.iter().filter(|p| p.id.as_str() == "c").count();
    assert_eq!(entries, 1);
    let c = state.player(&pid("c")).unwrap();
    assert!(c.is_connected());
    assert_eq!(c.hand, hand);

    // Joining again under the same id is refused.
    let err = engine.add_player(&state, Player::new("c", "Impostor")).unwrap_err();
    assert!(matches!(err, GameError::DuplicatePlayer(_)));
}

/// Test that expelling a player returns their cards to the discard.
#[test]
fn test_expel_keeps_cards_conserved() {
    let (engine, state) = started();
    let state = submit(&engine, &state, "b").unwrap();
    let ledger = state.response_ledger();

    let state = engine.expel_player(&state, &pid("b"), &ctx()).unwrap().state;

    assert!(state.player(&pid("b")).is_none());
    assert!(state.round.submissions.is_empty());
    assert_eq!(state.response_ledger(), ledger);
}

/// Test the draw-with-reshuffle case: 2 in deck, 10 in discard, draw 5.
#[test]
fn test_draw_reshuffles_discard_under_deck() {
    let mut pile = Pile::new(PileKind::Responses, (1..=2).map(CardId::new).collect());
    pile.discard_cards((11..=20).map(CardId::new));
    let mut rng = GameRng::new(3);

    let draw = pile.draw_cards(5, &mut rng).unwrap();

    assert!(draw.reshuffled);
    assert_eq!(draw.cards.len(), 5);
    assert_eq!(pile.deck_len(), 7);
    assert_eq!(pile.discard_len(), 0);
    // The two cards already in the deck come off first.
    assert_eq!(&draw.cards[..2], &[CardId::new(2), CardId::new(1)]);
}

/// Test that a round mid-flight survives a snapshot round trip.
#[test]
fn test_snapshot_mid_round() {
    let (engine, state) = started();
    let state = submit(&engine, &state, "b").unwrap();

    let restored = GameState::from_snapshot(&state.to_snapshot().unwrap()).unwrap();
    assert_eq!(restored, state);

    let next = submit(&engine, &restored, "c").unwrap();
    assert_eq!(next.phase(), Some(JUDGING));
}

/// Test that rooms opened with default settings do not share a deal order.
#[test]
fn test_default_rooms_shuffle_independently() {
    let engine = cah::engine(&[]).unwrap();
    let decks: Vec<_> = (0..3)
        .map(|_| {
            let state = engine.create_game(GameSettings::default(), &ctx()).unwrap();
            state.responses.deck().to_vec()
        })
        .collect();

    assert!(decks.windows(2).any(|w| w[0] != w[1]));
}

/// Test that a pack too small to deal a full table is refused up front.
#[test]
fn test_small_pack_rejected_before_dealing() {
    let pack = (1..=20).fold(
        CardPack::new("tiny", "Tiny").with_card(Card::prompt(CardId::new(1), "____?", "tiny", 1)),
        |pack, i| pack.with_card(Card::response(CardId::new(100 + i), format!("Answer {}", i), "tiny")),
    );
    let engine = cah::engine(&[pack]).unwrap();

    let err = engine.create_game(GameSettings::default(), &ctx()).unwrap_err();
    assert!(matches!(err, GameError::InvalidSettings(_)));
    assert!(!err.is_fatal());
}

/// Test that joins stop once the pool could no longer fill every hand.
#[test]
fn test_join_capped_by_pool() {
    let pack = (1..=30).fold(
        CardPack::new("small", "Small").with_card(Card::prompt(CardId::new(1), "____?", "small", 1)),
        |pack, i| pack.with_card(Card::response(CardId::new(100 + i), format!("Answer {}", i), "small")),
    );
    let engine = cah::engine(&[pack]).unwrap();
    let mut state = engine.create_game(GameSettings::default(), &ctx()).unwrap();
    for id in ["a", "b", "c", "d"] {
        state = engine.add_player(&state, Player::new(id, id)).unwrap();
    }

    let err = engine.add_player(&state, Player::new("e", "E")).unwrap_err();
    assert_eq!(err, GameError::CapacityExceeded { max: 4 });
}

/// Test that the action log only covers the round in progress.
#[test]
fn test_history_is_per_round() {
    let (engine, state) = started();
    let state = submit(&engine, &state, "b").unwrap();
    let state = submit(&engine, &state, "c").unwrap();
    assert_eq!(state.history.len(), 2);

    let state = act(&engine, &state, "a", ActionKind::JudgePick { slot: 0 }).unwrap();
    let state = act(&engine, &state, "a", ActionKind::Advance).unwrap();
    let state = act(&engine, &state, "a", ActionKind::Advance).unwrap();
    assert_eq!(state.round.number, 2);
    assert!(state.history.is_empty());

    let state = submit(&engine, &state, "a").unwrap();
    assert_eq!(state.history.len(), 1);
    assert!(state.history.iter().all(|record| record.round == 2));
}
