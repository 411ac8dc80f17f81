//! Error types for the room layer.

use skycards_protocol::{PlayerId, RoomCode};

/// Errors from matchmaking and in-match commands.
///
/// Every variant is recoverable: the caller reports it to the offending
/// connection and nothing in the registry or the round has changed.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// Matchmaking was requested before a deck was set.
    #[error("set a deck of 4 cards first")]
    DeckNotReady,

    /// `PRIV_ROOM` with a code that names no open private room.
    #[error("no room with code {0}")]
    UnknownRoomCode(RoomCode),

    /// `PLAY_MOVE` pointing outside the current hand.
    #[error("card index {index} is out of range (hand has {hand_len} cards)")]
    InvalidCardIndex { index: i64, hand_len: usize },

    /// `PLAY_MOVE` naming something that is not a card attribute.
    #[error("unknown attribute {0:?}")]
    InvalidAttribute(String),

    /// A move arrived while no round was accepting moves.
    #[error("no move is expected right now")]
    NoActiveMatch,

    /// An in-match command from a player whose room is still unpaired.
    #[error("waiting for opponent")]
    NoOpponent,

    /// The player already occupies a room.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomCode),

    /// Every room code of the configured length is in use.
    #[error("no free room code, try again later")]
    NoFreeRoomCode,

    /// The room's actor has stopped or its channel is full.
    #[error("room {0} is unavailable")]
    Unavailable(RoomCode),
}
