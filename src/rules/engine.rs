//! The engine: a pure interpreter of a `GameDefinition`.
//!
//! Every operation takes the current `GameState` by reference and returns a
//! new one; the caller's value is never touched, so a rejected action leaves
//! no trace. `im` collections keep the clones cheap.
//!
//! ## Applying an action
//!
//! 1. Duplicate check: a retried action returns the state unchanged
//! 2. Validation against the definition
//! 3. Reduction (the action's direct effect)
//! 4. Settling: the current phase's transitions are checked in declaration
//!    order and the first that holds is taken, repeatedly, until none holds
//!
//! ## Roster changes
//!
//! Disconnects, reconnects and expulsions go through the same settling step,
//! so a transition such as "everyone has submitted" fires as soon as the last
//! missing player drops.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::definition::{GameDefinition, PhaseEffect, PhaseTarget};
use super::validator::{check_action, check_duplicate, check_transition_condition, phase_deadline, EvalContext};
use crate::cards::CardRegistry;
use crate::core::action::{Action, ActionKind, ActionRecord, ActionType};
use crate::core::config::{GameSettings, PhaseId};
use crate::core::error::GameError;
use crate::core::event::GameEvent;
use crate::core::player::{Player, PlayerId};
use crate::core::rotation::assign_new_lead;
use crate::core::state::{GameState, GameStatus, RoundState, Submission};
use crate::zones::PileKind;

/// Time source for an engine operation.
///
/// The engine never reads the clock itself; the host stamps each operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionContext {
    pub now: DateTime<Utc>,
}

impl ActionContext {
    /// Context at a fixed instant.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// Context at the current wall-clock time.
    #[must_use]
    pub fn now() -> Self {
        Self { now: Utc::now() }
    }
}

/// New state plus the events describing how it differs from the old one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outcome {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

impl Outcome {
    fn unchanged(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            events: Vec::new(),
        }
    }

    /// Check if the operation changed nothing.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.events.is_empty()
    }
}

/// Interpreter for one game definition over one card pool.
#[derive(Clone, Debug)]
pub struct Engine {
    definition: Arc<GameDefinition>,
    cards: Arc<CardRegistry>,
}

impl Engine {
    /// Create an engine, rejecting inconsistent definitions.
    pub fn new(definition: Arc<GameDefinition>, cards: Arc<CardRegistry>) -> Result<Self, GameError> {
        definition.validate()?;
        Ok(Self { definition, cards })
    }

    #[must_use]
    pub fn definition(&self) -> &GameDefinition {
        &self.definition
    }

    #[must_use]
    pub fn cards(&self) -> &CardRegistry {
        &self.cards
    }

    /// When the current phase times out, if it has a timeout.
    #[must_use]
    pub fn phase_deadline(&self, state: &GameState) -> Option<DateTime<Utc>> {
        if !state.is_running() {
            return None;
        }
        phase_deadline(state, &self.definition)
    }

    // === Room lifecycle ===

    /// Create a lobby with shuffled decks built from the card pool.
    pub fn create_game(&self, settings: GameSettings, ctx: &ActionContext) -> Result<GameState, GameError> {
        self.definition.check_settings(&settings)?;

        let prompts = self.cards.prompts();
        let responses = self.cards.responses();
        if prompts.is_empty() || responses.is_empty() {
            return Err(GameError::InvalidSettings(
                "card pool needs at least one prompt and one response".into(),
            ));
        }
        let needed = self.definition.min_players * self.definition.hand_size;
        if responses.len() < needed {
            return Err(GameError::InvalidSettings(format!(
                "{} response cards cannot fill {} hands of {}",
                responses.len(),
                self.definition.min_players,
                self.definition.hand_size
            )));
        }

        Ok(GameState::new(settings, responses, prompts, ctx.now))
    }

    /// Append a player to the roster.
    ///
    /// Joining mid-game is allowed; the player is dealt in at the next deal.
    pub fn add_player(&self, state: &GameState, mut player: Player) -> Result<GameState, GameError> {
        if state.status == GameStatus::GameOver {
            return Err(GameError::Validation("game is over".into()));
        }
        if state.player(&player.id).is_some() {
            return Err(GameError::DuplicatePlayer(player.id));
        }
        // Every seat must be dealable from the response pool.
        let dealable = state.response_ledger().len() / self.definition.hand_size;
        let max = state
            .settings
            .max_players
            .min(self.definition.max_players)
            .min(dealable);
        if state.players.len() >= max {
            return Err(GameError::CapacityExceeded { max });
        }

        player.is_lead = false;
        let mut next = state.clone();
        next.players.push_back(player);
        Ok(next)
    }

    /// Handle a player leaving or dropping.
    ///
    /// In the lobby the player is removed outright. Mid-game they are marked
    /// disconnected with hand, score and roster slot preserved; a departing
    /// lead hands the role to the next connected player.
    pub fn remove_player(&self, state: &GameState, id: &PlayerId, ctx: &ActionContext) -> Result<Outcome, GameError> {
        let index = state.player_index(id).ok_or_else(|| GameError::UnknownPlayer(id.clone()))?;
        let mut next = state.clone();
        let mut events = Vec::new();

        if next.status == GameStatus::Lobby {
            next.players.remove(index);
            events.push(GameEvent::PlayerLeft { player: id.clone() });
        } else {
            let Some(player) = next.players.get_mut(index) else {
                return Err(GameError::UnknownPlayer(id.clone()));
            };
            if !player.is_connected() {
                return Ok(Outcome::unchanged(state));
            }
            player.disconnect(ctx.now);
            let was_lead = player.is_lead;
            events.push(GameEvent::PlayerDisconnected { player: id.clone() });

            if was_lead && next.is_running() {
                self.reassign_lead(&mut next, &mut events);
            }
            self.settle(&mut next, &mut events, ctx, None)?;
        }

        next.updated_at = ctx.now;
        Ok(Outcome { state: next, events })
    }

    /// Mark a disconnected player connected again. Idempotent.
    pub fn reconnect_player(&self, state: &GameState, id: &PlayerId, ctx: &ActionContext) -> Result<Outcome, GameError> {
        let player = state.player(id).ok_or_else(|| GameError::UnknownPlayer(id.clone()))?;
        if player.is_connected() {
            return Ok(Outcome::unchanged(state));
        }

        let mut next = state.clone();
        let mut events = vec![GameEvent::PlayerReconnected { player: id.clone() }];
        if let Some(player) = next.player_mut(id) {
            player.reconnect();
        }

        // Everyone had dropped: the returning player picks up the lead.
        if next.is_running() && next.lead().is_none() {
            self.reassign_lead(&mut next, &mut events);
        }

        next.updated_at = ctx.now;
        Ok(Outcome { state: next, events })
    }

    /// Remove a player mid-game (e.g. reconnect grace expired).
    ///
    /// Their hand and any unrevealed submission go to the response discard.
    pub fn expel_player(&self, state: &GameState, id: &PlayerId, ctx: &ActionContext) -> Result<Outcome, GameError> {
        if state.status == GameStatus::Lobby {
            return self.remove_player(state, id, ctx);
        }

        let index = state.player_index(id).ok_or_else(|| GameError::UnknownPlayer(id.clone()))?;
        let mut next = state.clone();
        let mut events = Vec::new();

        let was_lead = next.players[index].is_lead;
        next.players[index].disconnect(ctx.now);
        if was_lead && next.is_running() {
            self.reassign_lead(&mut next, &mut events);
        }

        let player = next.players.remove(index);
        next.responses.discard_cards(player.hand.iter().copied());

        let round = &mut next.round;
        if !round.revealed && round.winner.is_none() {
            if let Some(pos) = round.submissions.iter().position(|s| &s.player == id) {
                let submission = round.submissions.remove(pos);
                next.responses.discard_cards(submission.cards);
            }
        }

        events.push(GameEvent::PlayerLeft { player: id.clone() });
        info!(player = %id, "player expelled");

        self.settle(&mut next, &mut events, ctx, None)?;
        next.updated_at = ctx.now;
        Ok(Outcome { state: next, events })
    }

    // === Actions ===

    /// Apply an action.
    ///
    /// A duplicate (same idempotency key already applied) returns the state
    /// unchanged with no events. Any other rejection leaves the input state
    /// as it was and returns the error.
    pub fn apply_action(&self, state: &GameState, action: &Action, ctx: &ActionContext) -> Result<Outcome, GameError> {
        match check_duplicate(state, action, &self.definition) {
            Err(GameError::DuplicateAction(key)) => {
                debug!(actor = %action.actor, ?key, "ignoring duplicate action");
                return Ok(Outcome::unchanged(state));
            }
            other => other?,
        }
        check_action(state, action, &self.definition)?;

        let key = action.idempotency_key(state.round.number, state.round.phase);
        let record = ActionRecord::new(action, state.round.number);

        let mut next = state.clone();
        let mut events = Vec::new();

        self.reduce(&mut next, action, &mut events, ctx)?;
        self.settle(&mut next, &mut events, ctx, Some(action.action_type()))?;

        next.applied.insert(key);
        // An action that started a new round belongs to the cleared one.
        if record.round == next.round.number {
            next.history.push_back(record);
        }
        next.updated_at = ctx.now;

        Ok(Outcome { state: next, events })
    }

    fn reduce(
        &self,
        state: &mut GameState,
        action: &Action,
        events: &mut Vec<GameEvent>,
        ctx: &ActionContext,
    ) -> Result<(), GameError> {
        match &action.kind {
            ActionKind::StartGame => {
                info!(game = %state.id, players = state.players.len(), "game started");
                state.status = GameStatus::InProgress;
                events.push(GameEvent::GameStarted);
                self.start_round(state, events, ctx)?;
            }
            ActionKind::Deal => self.apply_effect(state, PhaseEffect::DealHands, events)?,
            ActionKind::Submit { cards } => {
                let Some(id) = action.player() else {
                    return Err(GameError::Validation("only players submit cards".into()));
                };
                let player = state.player_mut(id).ok_or_else(|| GameError::UnknownPlayer(id.clone()))?;
                for card in cards {
                    player.remove_from_hand(*card);
                }
                state.round.submissions.push_back(Submission {
                    player: id.clone(),
                    cards: cards.to_vec(),
                    at: action.at,
                });
                events.push(GameEvent::CardsSubmitted { player: id.clone() });
            }
            ActionKind::JudgePick { slot } => {
                state.round.winner = Some(*slot);
                events.push(GameEvent::WinnerPicked { slot: *slot });
            }
            ActionKind::Reveal => self.apply_effect(state, PhaseEffect::RevealSubmissions, events)?,
            ActionKind::Score => self.apply_effect(state, PhaseEffect::AwardWinner, events)?,
            // Only feed transition conditions.
            ActionKind::Advance | ActionKind::Timeout { .. } => {}
        }
        Ok(())
    }

    // === Phase machine ===

    /// Take transitions until none holds.
    ///
    /// The triggering action is only visible to the first transition, so one
    /// `Advance` or timeout moves at most one step.
    fn settle(
        &self,
        state: &mut GameState,
        events: &mut Vec<GameEvent>,
        ctx: &ActionContext,
        trigger: Option<ActionType>,
    ) -> Result<(), GameError> {
        let mut eval = EvalContext::new(ctx.now, trigger);
        let limit = self.definition.phases.len() + 1;
        let mut steps = 0;

        while state.is_running() {
            let Some(current) = state.round.phase else {
                return Ok(());
            };
            let phase = self.definition.phase(current)?;
            let Some(target) = phase
                .transitions
                .iter()
                .find(|t| check_transition_condition(state, &self.definition, t.condition, &eval))
                .map(|t| t.target)
            else {
                return Ok(());
            };

            steps += 1;
            if steps > limit {
                return Err(GameError::TransitionCycle(current));
            }
            eval.trigger = None;

            match target {
                PhaseTarget::Phase(id) => self.enter_phase(state, id, events, ctx)?,
                PhaseTarget::NextRound => self.start_round(state, events, ctx)?,
                PhaseTarget::GameOver => self.finish_game(state, events),
            }
        }
        Ok(())
    }

    fn start_round(&self, state: &mut GameState, events: &mut Vec<GameEvent>, ctx: &ActionContext) -> Result<(), GameError> {
        let previous = std::mem::take(&mut state.round);
        state.prompts.discard_cards(previous.prompt);
        state
            .responses
            .discard_cards(previous.submissions.into_iter().flat_map(|s| s.cards));

        let number = previous.number + 1;
        state.round = RoundState {
            number,
            ..RoundState::default()
        };
        state.status = GameStatus::InProgress;
        state.applied.clear();
        state.history.clear();
        events.push(GameEvent::RoundStarted { round: number });

        let current = state.lead().map(|p| p.id.clone());
        let (players, lead) = assign_new_lead(&state.players, current.as_ref());
        state.players = players;
        if let Some(lead) = lead {
            debug!(round = number, lead = %lead, "round started");
            events.push(GameEvent::LeadAssigned { player: lead });
        }

        self.enter_phase(state, self.definition.initial_phase, events, ctx)
    }

    fn enter_phase(
        &self,
        state: &mut GameState,
        id: PhaseId,
        events: &mut Vec<GameEvent>,
        ctx: &ActionContext,
    ) -> Result<(), GameError> {
        let phase = self.definition.phase(id)?;
        let from = state.round.phase.replace(id);
        state.round.phase_entered_at = Some(ctx.now);
        debug!(round = state.round.number, phase = %phase.name, "entered phase");
        events.push(GameEvent::PhaseChanged {
            from,
            to: id,
            name: phase.name.clone(),
        });

        for effect in &phase.on_enter {
            self.apply_effect(state, *effect, events)?;
            if state.status == GameStatus::GameOver {
                return Ok(());
            }
        }

        if phase.ends_round {
            state.status = GameStatus::RoundEnd;
            events.push(GameEvent::RoundEnded {
                round: state.round.number,
            });

            let eval = EvalContext::new(ctx.now, None);
            let finished = self
                .definition
                .end_conditions
                .iter()
                .any(|c| check_transition_condition(state, &self.definition, *c, &eval));
            if finished {
                self.finish_game(state, events);
            }
        }
        Ok(())
    }

    fn apply_effect(&self, state: &mut GameState, effect: PhaseEffect, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        match effect {
            PhaseEffect::DealHands => self.deal_hands(state, events),
            PhaseEffect::DrawPrompt => {
                // Prompts are not recycled: running out ends the game.
                if state.prompts.deck_len() == 0 {
                    info!(game = %state.id, "prompt deck exhausted");
                    self.finish_game(state, events);
                    return Ok(());
                }
                let draw = state.prompts.draw_cards(1, &mut state.rng)?;
                if let Some(&card) = draw.cards.first() {
                    state.round.prompt = Some(card);
                    state.round.pick = self.cards.pick_of(card).unwrap_or(1);
                    events.push(GameEvent::PromptRevealed { card });
                }
                Ok(())
            }
            PhaseEffect::ShuffleSubmissions => {
                if state.round.winner.is_none() {
                    let mut slots: Vec<Submission> = state.round.submissions.iter().cloned().collect();
                    state.rng.shuffle(&mut slots);
                    state.round.submissions = slots.into();
                }
                Ok(())
            }
            PhaseEffect::RevealSubmissions => {
                if !state.round.revealed {
                    state.round.revealed = true;
                    events.push(GameEvent::SubmissionsRevealed);
                }
                Ok(())
            }
            PhaseEffect::AwardWinner => {
                if state.round.scored {
                    return Ok(());
                }
                let author = state.round.winning_submission().map(|s| s.player.clone());
                if let Some(author) = author {
                    state.round.scored = true;
                    // The author may have been expelled after the pick.
                    if let Some(player) = state.player_mut(&author) {
                        player.score += 1;
                        let score = player.score;
                        events.push(GameEvent::PointAwarded { player: author, score });
                    }
                }
                Ok(())
            }
        }
    }

    /// Fill every connected player's hand up to the definition's hand size.
    fn deal_hands(&self, state: &mut GameState, events: &mut Vec<GameEvent>) -> Result<(), GameError> {
        let hand_size = self.definition.hand_size;

        for index in 0..state.players.len() {
            let (id, missing) = match state.players.get(index) {
                Some(p) if p.is_connected() => (p.id.clone(), hand_size.saturating_sub(p.hand_size())),
                _ => continue,
            };
            if missing == 0 {
                continue;
            }

            // Short piles deal what they have; only an empty pool is an error.
            let count = missing.min(state.responses.available());
            if count == 0 {
                return Err(GameError::DeckExhausted {
                    pile: PileKind::Responses,
                    requested: missing,
                    available: 0,
                });
            }
            let draw = state.responses.draw_cards(count, &mut state.rng)?;
            if draw.reshuffled {
                events.push(GameEvent::DeckReshuffled {
                    pile: PileKind::Responses,
                });
            }
            if let Some(player) = state.players.get_mut(index) {
                player.hand.extend(draw.cards);
            }
            events.push(GameEvent::CardsDealt { player: id, count });
        }
        Ok(())
    }

    fn finish_game(&self, state: &mut GameState, events: &mut Vec<GameEvent>) {
        state.status = GameStatus::GameOver;
        let final_scores = state.final_scores();
        info!(
            game = %state.id,
            rounds = state.round.number,
            winner = ?final_scores.first().map(|s| s.player.as_str()),
            "game over"
        );
        events.push(GameEvent::GameOver { final_scores });
    }

    // === Lead role ===

    /// Pass the lead to the next connected player after the current one.
    ///
    /// A new lead cannot also be a contestant, so any pending submission of
    /// theirs goes back to their hand while submissions are still hidden.
    fn reassign_lead(&self, state: &mut GameState, events: &mut Vec<GameEvent>) {
        let current = state.lead().map(|p| p.id.clone());
        let (players, next) = assign_new_lead(&state.players, current.as_ref());
        state.players = players;

        let Some(lead) = next else {
            debug!("no connected player can take the lead");
            return;
        };
        debug!(lead = %lead, "lead reassigned");
        events.push(GameEvent::LeadAssigned { player: lead.clone() });

        if state.round.revealed || state.round.winner.is_some() {
            return;
        }
        if let Some(pos) = state.round.submissions.iter().position(|s| s.player == lead) {
            let submission = state.round.submissions.remove(pos);
            if let Some(player) = state.player_mut(&lead) {
                player.hand.extend(submission.cards);
            }
            events.push(GameEvent::SubmissionWithdrawn { player: lead });
        }
    }
}
