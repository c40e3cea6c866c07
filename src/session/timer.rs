//! Cancellable timers that post commands into a room's queue.
//!
//! A timer never touches room state itself. When it fires it sends a
//! `RoomCommand`, which the room processes in order with everything else;
//! a command from a timer that was cancelled just too late is recognized as
//! stale there.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::AbortHandle;
use tracing::trace;

use super::code::RoomCode;
use super::room::RoomCommand;
use crate::core::PhaseId;

/// Identity of a phase timer.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerKey {
    pub room: RoomCode,
    pub phase: PhaseId,
    pub round: u32,
}

/// A set of armed timers, at most one per key.
#[derive(Debug)]
pub struct TimerSet<K> {
    tx: UnboundedSender<RoomCommand>,
    armed: HashMap<K, AbortHandle>,
}

impl<K> TimerSet<K>
where
    K: Clone + Eq + Hash + std::fmt::Debug,
{
    /// Create an empty set posting into `tx`.
    #[must_use]
    pub fn new(tx: UnboundedSender<RoomCommand>) -> Self {
        Self {
            tx,
            armed: HashMap::new(),
        }
    }

    /// Post `command` after `delay`, replacing any timer already under `key`.
    pub fn arm(&mut self, key: K, delay: Duration, command: RoomCommand) {
        self.cancel(&key);
        trace!(?key, ?delay, "timer armed");

        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // The room may already be gone.
            let _ = tx.send(command);
        });
        self.armed.insert(key, task.abort_handle());
    }

    /// Cancel the timer under `key`. Returns true if one was armed.
    pub fn cancel(&mut self, key: &K) -> bool {
        match self.armed.remove(key) {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Cancel every timer except the one under `keep`.
    pub fn retain_only(&mut self, keep: Option<&K>) {
        let stale: Vec<K> = self.armed.keys().filter(|k| Some(*k) != keep).cloned().collect();
        for key in stale {
            self.cancel(&key);
        }
    }

    /// Cancel everything.
    pub fn cancel_all(&mut self) {
        for (_, handle) in self.armed.drain() {
            handle.abort();
        }
    }

    #[must_use]
    pub fn is_armed(&self, key: &K) -> bool {
        self.armed.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.armed.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.armed.is_empty()
    }
}

impl<K> Drop for TimerSet<K> {
    fn drop(&mut self) {
        for handle in self.armed.values() {
            handle.abort();
        }
    }
}
