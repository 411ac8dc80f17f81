//! Wire protocol for Skycards.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Card model** ([`Card`], [`Attribute`], [`Deck`]) and identities
//!   ([`PlayerId`], [`RoomCode`]).
//! - **Messages** ([`ClientMessage`], [`ServerMessage`]): one JSON object
//!   per line, shaped `{"type": TAG, "data": PAYLOAD}`.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): bytes to messages and back.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (lines) → Protocol (messages) → Session / Room
//! ```

mod codec;
mod error;
mod message;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use message::{
    ChatMessage, ClientMessage, Credentials, DRAW, GameOverMessage,
    GameStartMessage, LoginResponse, LoginStatus, MatchMode, MoveReport,
    PairingNotice, RoomRequest, RoundResultMessage, RoundStartMessage,
    ScreenMessage, ServerMessage,
};
pub use types::{Attribute, Card, DECK_SIZE, Deck, PlayerId, RoomCode};
