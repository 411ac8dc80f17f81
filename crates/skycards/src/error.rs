//! Unified error type for the Skycards server.

use skycards_protocol::ProtocolError;
use skycards_room::RoomError;
use skycards_session::SessionError;
use skycards_transport::TransportError;

/// Top-level error that wraps every layer's error.
///
/// `Display` is transparent, so the text a player sees in a `SCREEN_MSG`
/// is the layer's own message.
#[derive(Debug, thiserror::Error)]
pub enum SkycardsError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, bad deck).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// An account or session error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A matchmaking or in-match error.
    #[error(transparent)]
    Room(#[from] RoomError),
}
