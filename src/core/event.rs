//! Game events.
//!
//! Events describe what an engine operation changed. They are safe to send to
//! every participant: they carry counts and public ids only, never hand
//! contents or unrevealed submissions. Clients combine them with the
//! `PlayerView` they receive after each change.

use serde::{Deserialize, Serialize};

use super::config::PhaseId;
use super::player::PlayerId;
use crate::cards::CardId;
use crate::zones::PileKind;

/// Final standing of one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalScore {
    pub player: PlayerId,
    pub name: String,
    pub score: u32,
}

/// A state-delta descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameEvent {
    PlayerJoined { player: PlayerId, name: String },
    PlayerLeft { player: PlayerId },
    PlayerDisconnected { player: PlayerId },
    PlayerReconnected { player: PlayerId },
    GameStarted,
    RoundStarted { round: u32 },
    LeadAssigned { player: PlayerId },
    PhaseChanged { from: Option<PhaseId>, to: PhaseId, name: String },
    PromptRevealed { card: CardId },
    /// Only the count: the cards themselves are private.
    CardsDealt { player: PlayerId, count: usize },
    DeckReshuffled { pile: PileKind },
    /// The player has submitted; contents stay hidden until reveal.
    CardsSubmitted { player: PlayerId },
    /// A new lead's pending submission went back to their hand.
    SubmissionWithdrawn { player: PlayerId },
    /// Slot only; the author is revealed with the submissions.
    WinnerPicked { slot: usize },
    SubmissionsRevealed,
    PointAwarded { player: PlayerId, score: u32 },
    RoundEnded { round: u32 },
    GameOver { final_scores: Vec<FinalScore> },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event = GameEvent::CardsSubmitted {
            player: PlayerId::new("bob"),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"kind":"CARDS_SUBMITTED","player":"bob"}"#);
    }
}
