//! Room configuration and lifecycle states.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Rounds in every match. A match never resolves a fourth round.
pub const ROUNDS_PER_MATCH: u32 = 3;

// ---------------------------------------------------------------------------
// RoomConfig
// ---------------------------------------------------------------------------

/// Knobs shared by every room the matchmaker creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomConfig {
    /// Pause between pairing and the first `ROUND_START`.
    pub start_delay: Duration,

    /// Pause between a `ROUND_RESULT` and the next `ROUND_START`.
    pub result_delay: Duration,

    /// How long a round waits for moves. `None` waits forever.
    pub move_timeout: Option<Duration>,

    /// Length of generated room codes.
    pub code_length: usize,

    /// Capacity of each room actor's command channel.
    pub channel_size: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            start_delay: Duration::from_secs(1),
            result_delay: Duration::from_secs(3),
            move_timeout: None,
            code_length: 6,
            channel_size: 64,
        }
    }
}

impl RoomConfig {
    /// No pauses between rounds. Used by tests and bots.
    pub fn immediate() -> Self {
        Self {
            start_delay: Duration::ZERO,
            result_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

// ---------------------------------------------------------------------------
// RoomState
// ---------------------------------------------------------------------------

/// The lifecycle state of a room.
///
/// ```text
/// WaitingForOpponent → InProgress → Finished
/// ```
///
/// - **WaitingForOpponent**: one occupant, sitting in the public queue or
///   the private directory.
/// - **InProgress**: two occupants and a running round engine.
/// - **Finished**: terminal. The room is dropped from every index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomState {
    WaitingForOpponent,
    InProgress,
    Finished,
}

impl RoomState {
    /// Returns `true` if a second player may still join.
    pub fn is_joinable(&self) -> bool {
        matches!(self, Self::WaitingForOpponent)
    }

    /// The only state this one may move to, if any.
    pub fn next(self) -> Option<Self> {
        match self {
            Self::WaitingForOpponent => Some(Self::InProgress),
            Self::InProgress => Some(Self::Finished),
            Self::Finished => None,
        }
    }

    pub fn can_transition_to(self, target: Self) -> bool {
        self.next() == Some(target)
    }
}

impl std::fmt::Display for RoomState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WaitingForOpponent => write!(f, "WaitingForOpponent"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}
