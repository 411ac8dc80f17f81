//! Line codecs for wire messages.
//!
//! The dispatcher only needs something that turns a [`ClientMessage`] line
//! into a value and a [`ServerMessage`] into a line; [`JsonCodec`] is the
//! one the game client speaks.
//!
//! [`ClientMessage`]: crate::ClientMessage
//! [`ServerMessage`]: crate::ServerMessage

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns typed messages into single wire lines and back.
///
/// An encoded line must not contain a raw newline, since the transport
/// uses the newline as the frame delimiter.
pub trait Codec: Send + Sync + 'static {
    /// # Errors
    /// `ProtocolError::Encode` if the value cannot be serialized.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// # Errors
    /// `ProtocolError::Decode` if the line is malformed or names an
    /// unknown message.
    fn decode<T: DeserializeOwned>(&self, line: &str) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] that uses compact JSON (via `serde_json`).
///
/// Compact output escapes newlines inside strings, so one value is always
/// exactly one line.
///
/// ```rust
/// use skycards_protocol::{ClientMessage, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let msg: ClientMessage = codec.decode(r#"{"type":"CREATE_ROOM"}"#).unwrap();
/// assert_eq!(msg, ClientMessage::CreateRoom);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, line: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(line).map_err(ProtocolError::Decode)
    }
}
