//! The room actor.
//!
//! A `Room` owns one `GameState` and the table of attached connections. It
//! runs as a single tokio task draining an unbounded command queue: client
//! frames, connection attach/detach, phase timeouts, reconnect-grace expiry
//! and directory requests all arrive there and are handled one at a time.
//!
//! After every change the room:
//! - broadcasts the engine's events to every connection
//! - sends each seated player their own `PlayerView`
//! - re-arms the phase timer for the new (phase, round), cancelling the old one
//!
//! A failed action is reported to its sender only. Duplicates are dropped
//! silently. Fatal engine errors are reported to everyone and end the room.

use std::collections::HashMap;
use std::ops::ControlFlow;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::code::RoomCode;
use super::config::HostConfig;
use super::error::SessionError;
use super::lobby::RoomLifecycle;
use super::protocol::{ClientMessage, JoinRequest, ServerMessage, SessionToken};
use super::timer::{TimerKey, TimerSet};
use super::view::sanitize;
use crate::core::{Action, GameError, GameEvent, GameState, GameStatus, Player, PlayerId};
use crate::rules::{ActionContext, Engine, Outcome};

/// Identity of one attached connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Everything a room reacts to.
#[derive(Debug)]
pub enum RoomCommand {
    /// A transport opened a connection.
    Attach {
        connection: ConnectionId,
        outbox: UnboundedSender<ServerMessage>,
    },
    /// A decoded client frame.
    Inbound {
        connection: ConnectionId,
        message: ClientMessage,
    },
    /// A frame that failed to decode.
    Malformed {
        connection: ConnectionId,
        error: serde_json::Error,
    },
    /// The transport closed.
    Detach { connection: ConnectionId },
    /// A phase timer elapsed.
    Timeout(TimerKey),
    /// A dropped player's reconnect window closed.
    GraceExpired { player: PlayerId, since: DateTime<Utc> },
    /// Read the authoritative state (tests, persistence).
    Snapshot { reply: oneshot::Sender<GameState> },
    /// Shut the room down.
    Close,
}

/// Cloneable sender into a running room.
#[derive(Clone, Debug)]
pub struct RoomHandle {
    code: RoomCode,
    tx: UnboundedSender<RoomCommand>,
}

impl RoomHandle {
    #[must_use]
    pub fn code(&self) -> &RoomCode {
        &self.code
    }

    /// Check if the room task has ended.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Attach a new connection.
    pub fn connect(&self) -> Result<Connection, SessionError> {
        let id = ConnectionId::new();
        let (outbox, inbox) = unbounded_channel();
        self.send(RoomCommand::Attach { connection: id, outbox })?;
        Ok(Connection {
            id,
            inbox,
            handle: self.clone(),
        })
    }

    /// Fetch a copy of the current state.
    pub async fn snapshot(&self) -> Result<GameState, SessionError> {
        let (reply, rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply })?;
        rx.await.map_err(|_| SessionError::RoomClosed(self.code.clone()))
    }

    /// Ask the room to shut down.
    pub fn close(&self) -> Result<(), SessionError> {
        self.send(RoomCommand::Close)
    }

    /// Post a raw command.
    pub fn send(&self, command: RoomCommand) -> Result<(), SessionError> {
        self.tx
            .send(command)
            .map_err(|_| SessionError::RoomClosed(self.code.clone()))
    }
}

/// One client's attachment to a room.
///
/// Dropping it detaches the connection, exactly like a transport close.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    inbox: UnboundedReceiver<ServerMessage>,
    handle: RoomHandle,
}

impl Connection {
    #[must_use]
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    #[must_use]
    pub fn room(&self) -> &RoomCode {
        &self.handle.code
    }

    /// Send a decoded frame.
    pub fn send(&self, message: ClientMessage) -> Result<(), SessionError> {
        self.handle.send(RoomCommand::Inbound {
            connection: self.id,
            message,
        })
    }

    /// Send a raw text frame. Malformed frames are reported back as `ERROR`.
    pub fn send_text(&self, text: &str) -> Result<(), SessionError> {
        let command = match ClientMessage::from_json(text) {
            Ok(message) => RoomCommand::Inbound {
                connection: self.id,
                message,
            },
            Err(error) => RoomCommand::Malformed {
                connection: self.id,
                error,
            },
        };
        self.handle.send(command)
    }

    /// Send a `JOIN`.
    pub fn join(&self, player: impl Into<PlayerId>, name: impl Into<String>, token: SessionToken) -> Result<(), SessionError> {
        self.send(ClientMessage::Join(JoinRequest {
            player_id: player.into(),
            name: name.into(),
            session_token: token,
        }))
    }

    /// Next outbound frame. `None` once the room has ended.
    pub async fn recv(&mut self) -> Option<ServerMessage> {
        self.inbox.recv().await
    }

    /// Next outbound frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<ServerMessage> {
        self.inbox.try_recv().ok()
    }

    /// Detach from the room.
    pub fn disconnect(self) {}
}

impl Drop for Connection {
    fn drop(&mut self) {
        let _ = self.handle.send(RoomCommand::Detach { connection: self.id });
    }
}

/// An attached connection and the player it speaks for.
#[derive(Debug)]
struct Seat {
    outbox: UnboundedSender<ServerMessage>,
    player: Option<PlayerId>,
}

/// The actor owning one room's state.
#[derive(Debug)]
pub struct Room {
    code: RoomCode,
    engine: Engine,
    config: HostConfig,
    state: GameState,
    seats: HashMap<ConnectionId, Seat>,
    tokens: HashMap<PlayerId, SessionToken>,
    rx: UnboundedReceiver<RoomCommand>,
    phase_timer: TimerSet<TimerKey>,
    grace: TimerSet<PlayerId>,
    lifecycle: UnboundedSender<RoomLifecycle>,
    last_activity: Instant,
}

impl Room {
    /// Start a room task for `state` and return its handle.
    pub fn spawn(
        code: RoomCode,
        engine: Engine,
        state: GameState,
        config: HostConfig,
        lifecycle: UnboundedSender<RoomLifecycle>,
    ) -> Result<RoomHandle, SessionError> {
        config.validate()?;
        let (tx, rx) = unbounded_channel();
        let room = Self {
            code: code.clone(),
            engine,
            config,
            state,
            seats: HashMap::new(),
            tokens: HashMap::new(),
            rx,
            phase_timer: TimerSet::new(tx.clone()),
            grace: TimerSet::new(tx.clone()),
            lifecycle,
            last_activity: Instant::now(),
        };
        tokio::spawn(room.run());
        Ok(RoomHandle { code, tx })
    }

    /// Process commands until the game ends, the room is closed, or it idles out.
    pub async fn run(mut self) {
        info!(room = %self.code, game = %self.state.id, "room opened");

        let mut idle = tokio::time::interval(self.config.idle_check_interval);
        idle.set_missed_tick_behavior(MissedTickBehavior::Delay);
        idle.tick().await;

        loop {
            tokio::select! {
                command = self.rx.recv() => match command {
                    Some(RoomCommand::Close) | None => {
                        info!(room = %self.code, "room closed");
                        break;
                    }
                    Some(command) => {
                        if self.handle(command).is_break() {
                            break;
                        }
                    }
                },
                _ = idle.tick() => {
                    if self.last_activity.elapsed() >= self.config.idle_timeout {
                        info!(room = %self.code, "room idle, closing");
                        break;
                    }
                }
            }
        }

        self.teardown();
    }

    fn handle(&mut self, command: RoomCommand) -> ControlFlow<()> {
        match command {
            RoomCommand::Attach { connection, outbox } => {
                self.touch();
                debug!(room = %self.code, connection = %connection, "connection attached");
                self.seats.insert(connection, Seat { outbox, player: None });
                ControlFlow::Continue(())
            }
            RoomCommand::Inbound { connection, message } => {
                self.touch();
                self.inbound(connection, message)
            }
            RoomCommand::Malformed { connection, error } => {
                self.touch();
                self.reject(connection, &SessionError::Protocol(error));
                ControlFlow::Continue(())
            }
            RoomCommand::Detach { connection } => {
                self.touch();
                self.detach(connection)
            }
            RoomCommand::Timeout(key) => {
                self.phase_timer.cancel(&key);
                debug!(room = %self.code, phase = %key.phase, round = key.round, "phase timer fired");
                let action = Action::timeout(key.phase, key.round, Utc::now());
                let result = self.engine.apply_action(&self.state, &action, &ActionContext::now());
                self.commit(result, None)
            }
            RoomCommand::GraceExpired { player, since } => {
                self.grace.cancel(&player);
                self.grace_expired(player, since)
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.state.clone());
                ControlFlow::Continue(())
            }
            // Handled by the run loop.
            RoomCommand::Close => ControlFlow::Break(()),
        }
    }

    fn inbound(&mut self, connection: ConnectionId, message: ClientMessage) -> ControlFlow<()> {
        match message {
            ClientMessage::Ping => {
                self.unicast(connection, ServerMessage::Pong);
                ControlFlow::Continue(())
            }
            ClientMessage::Join(request) => self.join(connection, request),
            ClientMessage::Action(kind) => {
                let Some(player) = self.seated(connection) else {
                    self.reject(connection, &SessionError::NotJoined);
                    return ControlFlow::Continue(());
                };
                debug!(room = %self.code, player = %player, action = ?kind.action_type(), "action received");
                let action = Action::by(player, kind, Utc::now());
                let result = self.engine.apply_action(&self.state, &action, &ActionContext::now());
                self.commit(result, Some(connection))
            }
            ClientMessage::Leave => {
                let Some(player) = self.seated(connection) else {
                    return ControlFlow::Continue(());
                };
                info!(room = %self.code, player = %player, "player left");
                self.unseat(&player);
                self.tokens.remove(&player);
                self.grace.cancel(&player);
                let result = self.engine.expel_player(&self.state, &player, &ActionContext::now());
                self.commit(result, Some(connection))
            }
        }
    }

    fn join(&mut self, connection: ConnectionId, request: JoinRequest) -> ControlFlow<()> {
        let JoinRequest {
            player_id,
            name,
            session_token,
        } = request;

        if let Some(current) = self.seated(connection) {
            if current != player_id {
                let error = GameError::Validation(format!("connection already joined as {}", current));
                self.reject(connection, &SessionError::Game(error));
                return ControlFlow::Continue(());
            }
        }

        if self.state.player(&player_id).is_some() {
            if self.tokens.get(&player_id) != Some(&session_token) {
                warn!(room = %self.code, player = %player_id, "join with mismatched session token");
                self.reject(connection, &SessionError::TokenMismatch(player_id));
                return ControlFlow::Continue(());
            }

            info!(room = %self.code, player = %player_id, connection = %connection, "player reconnected");
            self.unseat(&player_id);
            self.seat(connection, player_id.clone());
            self.grace.cancel(&player_id);

            let result = self.engine.reconnect_player(&self.state, &player_id, &ActionContext::now());
            return match result {
                // Already connected elsewhere: still resync this client.
                Ok(outcome) if outcome.is_noop() => {
                    self.send_view(connection);
                    ControlFlow::Continue(())
                }
                result => self.commit(result, Some(connection)),
            };
        }

        let player = Player::new(player_id.clone(), name.clone());
        match self.engine.add_player(&self.state, player) {
            Ok(state) => {
                info!(room = %self.code, player = %player_id, "player joined");
                self.tokens.insert(player_id.clone(), session_token);
                self.seat(connection, player_id.clone());
                let outcome = Outcome {
                    state,
                    events: vec![GameEvent::PlayerJoined { player: player_id, name }],
                };
                self.commit(Ok(outcome), Some(connection))
            }
            Err(error) => self.commit(Err(error), Some(connection)),
        }
    }

    fn detach(&mut self, connection: ConnectionId) -> ControlFlow<()> {
        let Some(seat) = self.seats.remove(&connection) else {
            return ControlFlow::Continue(());
        };
        debug!(room = %self.code, connection = %connection, "connection detached");

        let Some(player) = seat.player else {
            return ControlFlow::Continue(());
        };
        // Another connection still speaks for this player.
        if self.seats.values().any(|s| s.player.as_ref() == Some(&player)) {
            return ControlFlow::Continue(());
        }
        if self.state.player(&player).is_none() {
            return ControlFlow::Continue(());
        }

        info!(room = %self.code, player = %player, "player disconnected");
        let result = self.engine.remove_player(&self.state, &player, &ActionContext::now());
        let flow = self.commit(result, None);

        match self.state.player(&player) {
            // Still in the roster: hold the seat for the grace period.
            Some(p) => {
                if let Some(since) = p.disconnected_at {
                    let command = RoomCommand::GraceExpired {
                        player: player.clone(),
                        since,
                    };
                    self.grace.arm(player, self.config.reconnect_grace, command);
                }
            }
            None => {
                self.tokens.remove(&player);
            }
        }
        flow
    }

    fn grace_expired(&mut self, player: PlayerId, since: DateTime<Utc>) -> ControlFlow<()> {
        let still_gone = self
            .state
            .player(&player)
            .is_some_and(|p| !p.is_connected() && p.disconnected_at == Some(since));
        if !still_gone {
            return ControlFlow::Continue(());
        }

        info!(room = %self.code, player = %player, "reconnect grace expired");
        self.tokens.remove(&player);
        let result = self.engine.expel_player(&self.state, &player, &ActionContext::now());
        self.commit(result, None)
    }

    // === Commit ===

    /// Install an engine result and tell everyone.
    fn commit(&mut self, result: Result<Outcome, GameError>, origin: Option<ConnectionId>) -> ControlFlow<()> {
        match result {
            Ok(outcome) if outcome.is_noop() => ControlFlow::Continue(()),
            Ok(outcome) => {
                self.state = outcome.state;
                for event in outcome.events {
                    self.broadcast(ServerMessage::Event(event));
                }
                for connection in self.seats.keys().copied().collect::<Vec<_>>() {
                    self.send_view(connection);
                }
                self.sync_timers();

                if self.state.status == GameStatus::GameOver {
                    info!(room = %self.code, "game over");
                    return ControlFlow::Break(());
                }
                ControlFlow::Continue(())
            }
            Err(error) if error.is_silent() => ControlFlow::Continue(()),
            Err(error) if error.is_fatal() => {
                error!(room = %self.code, %error, "fatal engine error, halting room");
                self.broadcast(ServerMessage::from(&error));
                ControlFlow::Break(())
            }
            Err(error) => {
                match origin {
                    Some(connection) => self.reject(connection, &SessionError::Game(error)),
                    None => debug!(room = %self.code, %error, "host action rejected"),
                }
                ControlFlow::Continue(())
            }
        }
    }

    /// Keep exactly one phase timer armed: the one for the current (phase, round).
    fn sync_timers(&mut self) {
        let wanted = self
            .state
            .round
            .phase
            .filter(|_| self.state.is_running())
            .and_then(|phase| {
                let timeout = self.engine.definition().phase(phase).ok()?.timeout?;
                let key = TimerKey {
                    room: self.code.clone(),
                    phase,
                    round: self.state.round.number,
                };
                Some((key, timeout))
            });

        self.phase_timer.retain_only(wanted.as_ref().map(|(key, _)| key));
        if let Some((key, timeout)) = wanted {
            if !self.phase_timer.is_armed(&key) {
                let command = RoomCommand::Timeout(key.clone());
                self.phase_timer.arm(key, timeout, command);
            }
        }
    }

    fn teardown(&mut self) {
        self.phase_timer.cancel_all();
        self.grace.cancel_all();

        let final_scores = self.state.final_scores();
        info!(room = %self.code, rounds = self.state.round.number, "room ended");
        let _ = self.lifecycle.send(RoomLifecycle::Ended {
            code: self.code.clone(),
            final_scores,
        });
        self.seats.clear();
    }

    // === Seats and messaging ===

    fn touch(&mut self) {
        self.last_activity = Instant::now();
    }

    fn seated(&self, connection: ConnectionId) -> Option<PlayerId> {
        self.seats.get(&connection).and_then(|s| s.player.clone())
    }

    fn seat(&mut self, connection: ConnectionId, player: PlayerId) {
        if let Some(seat) = self.seats.get_mut(&connection) {
            seat.player = Some(player);
        }
    }

    /// Release every connection bound to `player`.
    fn unseat(&mut self, player: &PlayerId) {
        for seat in self.seats.values_mut() {
            if seat.player.as_ref() == Some(player) {
                seat.player = None;
            }
        }
    }

    fn send_view(&self, connection: ConnectionId) {
        let Some(player) = self.seated(connection) else {
            return;
        };
        let definition = self.engine.definition();
        if let Some(view) = sanitize(&self.state, definition, self.engine.cards(), &player) {
            self.unicast(connection, ServerMessage::state(view));
        }
    }

    fn reject(&self, connection: ConnectionId, error: &SessionError) {
        debug!(room = %self.code, connection = %connection, %error, "rejected");
        self.unicast(connection, ServerMessage::from(error));
    }

    fn unicast(&self, connection: ConnectionId, message: ServerMessage) {
        if let Some(seat) = self.seats.get(&connection) {
            if seat.outbox.send(message).is_err() {
                debug!(room = %self.code, connection = %connection, "unicast to closed connection");
            }
        }
    }

    fn broadcast(&self, message: ServerMessage) {
        for (connection, seat) in &self.seats {
            if seat.outbox.send(message.clone()).is_err() {
                debug!(room = %self.code, connection = %connection, "broadcast to closed connection");
            }
        }
    }
}
