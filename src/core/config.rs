//! Game configuration types.
//!
//! - `PhaseId`: Opaque phase identifier assigned by a `GameDefinition`
//! - `GameSettings`: Per-room knobs chosen when the room is opened
//!
//! The engine never hardcodes phases - definitions declare them.

use serde::{Deserialize, Serialize};

use super::error::GameError;

/// Opaque phase identifier. Definitions declare their own phases.
///
/// The engine doesn't interpret phase IDs - they're compared for equality
/// and looked up in the active `GameDefinition`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhaseId(pub u32);

impl PhaseId {
    /// Create a new phase ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for PhaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Phase({})", self.0)
    }
}

/// Settings for one room.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Maximum players allowed in the roster (including disconnected ones).
    pub max_players: usize,

    /// Minimum connected players required to start.
    pub min_players: usize,

    /// Seed for shuffles. Same seed + same actions = same game.
    /// Drawn at random by `default()`; pin it with `with_seed` to replay a game.
    pub seed: u64,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            max_players: 8,
            min_players: 3,
            seed: rand::random(),
        }
    }
}

impl GameSettings {
    /// Set the maximum player count.
    #[must_use]
    pub fn with_max_players(mut self, max: usize) -> Self {
        self.max_players = max;
        self
    }

    /// Set the minimum player count.
    #[must_use]
    pub fn with_min_players(mut self, min: usize) -> Self {
        self.min_players = min;
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the settings are internally consistent.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.min_players < 2 {
            return Err(GameError::InvalidSettings("min_players must be at least 2".into()));
        }
        if self.max_players < self.min_players {
            return Err(GameError::InvalidSettings(format!(
                "max_players ({}) is below min_players ({})",
                self.max_players, self.min_players
            )));
        }
        Ok(())
    }
}
