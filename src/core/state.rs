//! Game state: roster, round, piles, RNG.
//!
//! ## GameState
//!
//! The complete authoritative state of one room:
//! - Status and roster (hands, scores, presence, lead flag)
//! - Current round (phase, prompt, submissions, winner)
//! - Response and prompt piles
//! - RNG and applied idempotency keys
//!
//! Uses `im` persistent collections so the engine can return a fresh snapshot
//! per action without deep copies. Every field is serializable so the state
//! can be checkpointed after any step (`to_snapshot` / `from_snapshot`).

use chrono::{DateTime, Utc};
use im::{HashSet as ImHashSet, Vector};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::action::{ActionRecord, IdempotencyKey};
use super::config::{GameSettings, PhaseId};
use super::error::GameError;
use super::event::FinalScore;
use super::player::{Player, PlayerId};
use super::rng::GameRng;
use crate::cards::CardId;
use crate::zones::{Pile, PileKind};

/// Lifecycle status of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    Lobby,
    InProgress,
    RoundEnd,
    GameOver,
}

/// One player's played cards for the current round.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub player: PlayerId,
    pub cards: Vec<CardId>,
    pub at: DateTime<Utc>,
}

/// Per-round data. Reset when a new round starts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundState {
    /// Round number (0 in the lobby, starts at 1).
    pub number: u32,

    /// Active phase.
    pub phase: Option<PhaseId>,

    /// When the active phase was entered.
    pub phase_entered_at: Option<DateTime<Utc>>,

    /// Visible prompt card.
    pub prompt: Option<CardId>,

    /// Cards each submission must contain (from the prompt).
    pub pick: usize,

    /// Submissions in slot order.
    pub submissions: Vector<Submission>,

    /// Submissions (and their authors) are visible to everyone.
    pub revealed: bool,

    /// Slot chosen by the judge.
    pub winner: Option<usize>,

    /// Winner's point has been awarded.
    pub scored: bool,
}

impl RoundState {
    /// Get a player's submission.
    #[must_use]
    pub fn submission_of(&self, player: &PlayerId) -> Option<&Submission> {
        self.submissions.iter().find(|s| &s.player == player)
    }

    /// Check if a player has submitted this round.
    #[must_use]
    pub fn has_submitted(&self, player: &PlayerId) -> bool {
        self.submission_of(player).is_some()
    }

    /// Get the submission the judge picked.
    #[must_use]
    pub fn winning_submission(&self) -> Option<&Submission> {
        self.winner.and_then(|slot| self.submissions.get(slot))
    }
}

/// Full game state for one room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    /// Unique id for this game.
    pub id: Uuid,

    /// Lifecycle status.
    pub status: GameStatus,

    /// Roster in join order (rotation order).
    pub players: Vector<Player>,

    /// Current round.
    pub round: RoundState,

    /// Response cards (dealt into hands).
    pub responses: Pile,

    /// Prompt cards (one visible per round).
    pub prompts: Pile,

    /// Room settings.
    pub settings: GameSettings,

    /// Deterministic RNG.
    pub rng: GameRng,

    /// Idempotency keys applied this round.
    pub applied: ImHashSet<IdempotencyKey>,

    /// Actions applied this round (without payloads).
    pub history: Vector<ActionRecord>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GameState {
    /// Create a lobby state with freshly shuffled piles.
    #[must_use]
    pub fn new(
        settings: GameSettings,
        responses: Vec<CardId>,
        prompts: Vec<CardId>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut rng = GameRng::new(settings.seed);
        let responses = Pile::shuffled(PileKind::Responses, responses, &mut rng);
        let prompts = Pile::shuffled(PileKind::Prompts, prompts, &mut rng);

        Self {
            id: Uuid::new_v4(),
            status: GameStatus::Lobby,
            players: Vector::new(),
            round: RoundState::default(),
            responses,
            prompts,
            settings,
            rng,
            applied: ImHashSet::new(),
            history: Vector::new(),
            created_at: now,
            updated_at: now,
        }
    }

    // === Roster ===

    /// Get a player by id.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| &p.id == id)
    }

    /// Get a player's roster position.
    #[must_use]
    pub fn player_index(&self, id: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| &p.id == id)
    }

    /// Get a mutable player by id.
    pub fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        let index = self.player_index(id)?;
        self.players.get_mut(index)
    }

    /// Get the current lead (judge).
    #[must_use]
    pub fn lead(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_lead)
    }

    /// Get the room host: the earliest-joined connected player.
    #[must_use]
    pub fn host(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.is_connected())
    }

    /// Iterate over connected players.
    pub fn connected_players(&self) -> impl Iterator<Item = &Player> {
        self.players.iter().filter(|p| p.is_connected())
    }

    /// Number of connected players.
    #[must_use]
    pub fn connected_count(&self) -> usize {
        self.connected_players().count()
    }

    // === Progress ===

    /// Current phase, if a round is running.
    #[must_use]
    pub fn phase(&self) -> Option<PhaseId> {
        self.round.phase
    }

    /// Check if rounds are being played (not lobby, not over).
    #[must_use]
    pub fn is_running(&self) -> bool {
        matches!(self.status, GameStatus::InProgress | GameStatus::RoundEnd)
    }

    /// Scores sorted best first; ties keep roster order.
    #[must_use]
    pub fn final_scores(&self) -> Vec<FinalScore> {
        let mut scores: Vec<_> = self
            .players
            .iter()
            .map(|p| FinalScore {
                player: p.id.clone(),
                name: p.name.clone(),
                score: p.score,
            })
            .collect();
        scores.sort_by(|a, b| b.score.cmp(&a.score));
        scores
    }

    // === Card conservation ===

    /// Every response card in the room: deck, discard, hands and submissions.
    ///
    /// Sorted, so two ledgers compare equal iff they hold the same multiset.
    #[must_use]
    pub fn response_ledger(&self) -> Vec<CardId> {
        let mut cards: Vec<CardId> = self.responses.all_cards().collect();
        cards.extend(self.players.iter().flat_map(|p| p.hand.iter().copied()));
        cards.extend(self.round.submissions.iter().flat_map(|s| s.cards.iter().copied()));
        cards.sort();
        cards
    }

    /// Every prompt card in the room: deck, discard and the visible prompt.
    #[must_use]
    pub fn prompt_ledger(&self) -> Vec<CardId> {
        let mut cards: Vec<CardId> = self.prompts.all_cards().collect();
        cards.extend(self.round.prompt);
        cards.sort();
        cards
    }

    // === Snapshots ===

    /// Encode the state for host-restart recovery.
    pub fn to_snapshot(&self) -> Result<Vec<u8>, GameError> {
        bincode::serialize(self).map_err(|e| GameError::Snapshot(e.to_string()))
    }

    /// Decode a state produced by `to_snapshot`.
    pub fn from_snapshot(bytes: &[u8]) -> Result<Self, GameError> {
        bincode::deserialize(bytes).map_err(|e| GameError::Snapshot(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(range: std::ops::Range<u32>) -> Vec<CardId> {
        range.map(CardId::new).collect()
    }

    fn lobby() -> GameState {
        GameState::new(GameSettings::default().with_seed(42), ids(100..120), ids(1..6), Utc::now())
    }

    #[test]
    fn test_new_state_is_lobby() {
        let state = lobby();

        assert_eq!(state.status, GameStatus::Lobby);
        assert_eq!(state.round.number, 0);
        assert!(state.players.is_empty());
        assert_eq!(state.responses.deck_len(), 20);
        assert_eq!(state.prompts.deck_len(), 5);
    }

    #[test]
    fn test_same_seed_same_piles() {
        let a = lobby();
        let b = lobby();
        assert_eq!(a.responses, b.responses);
        assert_eq!(a.prompts, b.prompts);
    }

    #[test]
    fn test_roster_lookup() {
        let mut state = lobby();
        state.players.push_back(Player::new("a", "A"));
        state.players.push_back(Player::new("b", "B"));
        state.players[1].is_lead = true;

        assert_eq!(state.player_index(&PlayerId::new("b")), Some(1));
        assert_eq!(state.lead().map(|p| p.id.as_str()), Some("b"));
        assert_eq!(state.host().map(|p| p.id.as_str()), Some("a"));

        state.player_mut(&PlayerId::new("a")).unwrap().disconnect(Utc::now());
        assert_eq!(state.host().map(|p| p.id.as_str()), Some("b"));
        assert_eq!(state.connected_count(), 1);
    }

    #[test]
    fn test_ledger_counts_hands_and_submissions() {
        let mut state = lobby();
        let before = state.response_ledger();

        let mut rng = GameRng::new(1);
        let drawn = state.responses.draw_cards(3, &mut rng).unwrap().cards;
        let mut player = Player::new("a", "A");
        player.hand.extend(drawn[..2].iter().copied());
        state.players.push_back(player);
        state.round.submissions.push_back(Submission {
            player: PlayerId::new("a"),
            cards: vec![drawn[2]],
            at: Utc::now(),
        });

        assert_eq!(state.response_ledger(), before);
    }

    #[test]
    fn test_final_scores_sorted() {
        let mut state = lobby();
        for (id, score) in [("a", 1), ("b", 3), ("c", 1)] {
            let mut p = Player::new(id, id);
            p.score = score;
            state.players.push_back(p);
        }

        let scores = state.final_scores();
        let order: Vec<_> = scores.iter().map(|s| s.player.as_str()).collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut state = lobby();
        state.players.push_back(Player::new("a", "A"));

        let bytes = state.to_snapshot().unwrap();
        let restored = GameState::from_snapshot(&bytes).unwrap();

        assert_eq!(restored, state);
        assert!(GameState::from_snapshot(&[1, 2, 3]).is_err());
    }
}
