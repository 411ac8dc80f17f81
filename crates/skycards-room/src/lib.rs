//! Matchmaking, room lifecycle, and round scoring for Skycards.
//!
//! Each paired room runs as an isolated Tokio task (actor model) that owns
//! its round engine. Matchmaking state lives in one registry behind one
//! lock.
//!
//! # Key types
//!
//! - [`Matchmaker`]: public queue, private codes, routing to rooms
//! - [`MatchRegistry`]: the synchronous state the matchmaker guards
//! - [`RoomHandle`]: send commands to a running room actor
//! - [`GameState`]: the per-match round engine
//! - [`score_round`]: points for one round
//! - [`RewardPolicy`]: coins paid at the end of a match
//! - [`RoomConfig`] / [`RoomState`]: settings and lifecycle

mod config;
mod error;
mod matchmaker;
mod registry;
mod reward;
mod room;
mod round;
mod scoring;

pub use config::{ROUNDS_PER_MATCH, RoomConfig, RoomState};
pub use error::RoomError;
pub use matchmaker::{MatchStatus, Matchmaker};
pub use registry::{Departure, MatchRegistry, Pairing};
pub use reward::{FinalScoreReward, RewardPolicy};
pub use room::{Contender, PlayerSender, RoomHandle};
pub use round::{GameState, Move, Phase, Play, RoundOutcome, Seat, Standing};
pub use scoring::{Outcome, compare, points_for_a, score_round};
