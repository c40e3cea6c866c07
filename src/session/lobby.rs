//! Room directory.
//!
//! The lobby hands out room codes, spawns a `Room` task per code and answers
//! lookups. It never touches game state; rooms report back through
//! `RoomLifecycle` messages when they open and end.

use std::collections::HashMap;

use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::sync::RwLock;
use rand::Rng;
use tracing::{debug, info, warn};

use super::code::RoomCode;
use super::config::HostConfig;
use super::error::SessionError;
use super::room::{Room, RoomHandle};
use crate::core::{FinalScore, GameSettings};
use crate::rules::{ActionContext, Engine};

/// Code draws per `open` before giving up.
const CODE_ATTEMPTS: usize = 256;

/// Room lifecycle signals for whoever runs the lobby.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoomLifecycle {
    Opened { code: RoomCode },
    Ended { code: RoomCode, final_scores: Vec<FinalScore> },
}

/// Directory of live rooms keyed by code.
#[derive(Debug)]
pub struct Lobby {
    rooms: RwLock<HashMap<RoomCode, RoomHandle>>,
    config: HostConfig,
    lifecycle: UnboundedSender<RoomLifecycle>,
}

impl Lobby {
    /// Create an empty lobby and the receiver for its lifecycle signals.
    pub fn new(config: HostConfig) -> Result<(Self, UnboundedReceiver<RoomLifecycle>), SessionError> {
        config.validate()?;
        let (lifecycle, rx) = unbounded_channel();
        let lobby = Self {
            rooms: RwLock::new(HashMap::new()),
            config,
            lifecycle,
        };
        Ok((lobby, rx))
    }

    /// Create a game and spawn a room for it under a fresh code.
    pub async fn open(&self, engine: Engine, settings: GameSettings) -> Result<RoomHandle, SessionError> {
        let state = engine.create_game(settings, &ActionContext::now())?;

        let mut rooms = self.rooms.write().await;
        rooms.retain(|_, handle| !handle.is_closed());

        let code = free_code(&mut rand::thread_rng(), self.config.code_length, |c| rooms.contains_key(c))?;

        let handle = Room::spawn(
            code.clone(),
            engine,
            state,
            self.config.clone(),
            self.lifecycle.clone(),
        )?;
        rooms.insert(code.clone(), handle.clone());
        info!(room = %code, open = rooms.len(), "room registered");

        let _ = self.lifecycle.send(RoomLifecycle::Opened { code });
        Ok(handle)
    }

    /// Find a live room by the code a player typed.
    pub async fn lookup(&self, input: &str) -> Result<RoomHandle, SessionError> {
        let code = RoomCode::parse_with_length(input, self.config.code_length)?;
        let rooms = self.rooms.read().await;
        match rooms.get(&code) {
            Some(handle) if !handle.is_closed() => Ok(handle.clone()),
            _ => Err(SessionError::RoomNotFound(code)),
        }
    }

    /// Shut a room down and forget it.
    pub async fn close(&self, code: &RoomCode) -> Result<(), SessionError> {
        let handle = self
            .rooms
            .write()
            .await
            .remove(code)
            .ok_or_else(|| SessionError::RoomNotFound(code.clone()))?;
        // Already ended on its own.
        let _ = handle.close();
        info!(room = %code, "room removed");
        Ok(())
    }

    /// Number of rooms still running.
    pub async fn len(&self) -> usize {
        self.rooms.read().await.values().filter(|h| !h.is_closed()).count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Codes of rooms still running, sorted.
    pub async fn codes(&self) -> Vec<RoomCode> {
        let rooms = self.rooms.read().await;
        let mut codes: Vec<_> = rooms
            .iter()
            .filter(|(_, h)| !h.is_closed())
            .map(|(code, _)| code.clone())
            .collect();
        codes.sort();
        codes
    }
}

/// Draw codes until one is not `taken`, giving up after `CODE_ATTEMPTS`.
fn free_code<R: Rng + ?Sized>(
    rng: &mut R,
    length: usize,
    taken: impl Fn(&RoomCode) -> bool,
) -> Result<RoomCode, SessionError> {
    for _ in 0..CODE_ATTEMPTS {
        let candidate = RoomCode::generate(rng, length);
        if !taken(&candidate) {
            return Ok(candidate);
        }
        debug!(code = %candidate, "room code collision, retrying");
    }
    warn!(length, attempts = CODE_ATTEMPTS, "no free room code");
    Err(SessionError::CodesExhausted { attempts: CODE_ATTEMPTS })
}
