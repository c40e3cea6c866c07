//! Room host configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::code::DEFAULT_CODE_LENGTH;
use super::error::SessionError;

/// Settings shared by every room a `Lobby` opens.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostConfig {
    /// Close a room after this long without client traffic.
    pub idle_timeout: Duration,

    /// How often rooms check for idleness.
    pub idle_check_interval: Duration,

    /// How long a dropped player keeps their seat mid-game.
    pub reconnect_grace: Duration,

    /// Room code length.
    pub code_length: usize,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            idle_check_interval: Duration::from_secs(60),
            reconnect_grace: Duration::from_secs(90),
            code_length: DEFAULT_CODE_LENGTH,
        }
    }
}

impl HostConfig {
    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_idle_check_interval(mut self, interval: Duration) -> Self {
        self.idle_check_interval = interval;
        self
    }

    #[must_use]
    pub fn with_reconnect_grace(mut self, grace: Duration) -> Self {
        self.reconnect_grace = grace;
        self
    }

    #[must_use]
    pub fn with_code_length(mut self, length: usize) -> Self {
        self.code_length = length;
        self
    }

    /// Reject settings a room task could not run with.
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.idle_timeout.is_zero() {
            return Err(SessionError::InvalidConfig("idle_timeout must be non-zero".into()));
        }
        if self.idle_check_interval.is_zero() {
            return Err(SessionError::InvalidConfig("idle_check_interval must be non-zero".into()));
        }
        if self.code_length == 0 {
            return Err(SessionError::InvalidConfig("code_length must be at least 1".into()));
        }
        Ok(())
    }
}
