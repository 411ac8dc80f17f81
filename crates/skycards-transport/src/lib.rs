//! Line transport for Skycards clients.
//!
//! [`Transport`] hands out connections and [`Connection`] moves whole text
//! lines. Every frame in the game is a single JSON object on its own line,
//! so nothing above this crate sees bytes or delimiters.
//!
//! # Feature Flags
//!
//! - `tcp` (default): [`LineTransport`], plain TCP framed by `tokio-util`'s
//!   `LinesCodec`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "tcp")]
mod line;

pub use error::TransportError;
#[cfg(feature = "tcp")]
pub use line::{DEFAULT_MAX_LINE_LEN, LineConnection, LineTransport};

use std::fmt;
use std::net::SocketAddr;

/// Opaque identifier for a connection.
///
/// Assigned once at accept time and never reused within a process. Higher
/// layers key sessions by this id rather than by the peer's address, since
/// two clients behind the same NAT share an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Source of inbound client connections.
pub trait Transport: Send + Sync + 'static {
    type Connection: Connection;
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next client. Each call yields a fresh [`ConnectionId`].
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Stops handing out connections. Open ones are unaffected.
    async fn shutdown(&self) -> Result<(), Self::Error>;
}

/// A client connection that carries text lines.
///
/// A line never includes its terminator: `send_line` appends it and
/// `recv_line` strips it. Callers must not put a raw newline inside a line.
pub trait Connection: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync;

    async fn send_line(&self, line: &str) -> Result<(), Self::Error>;

    /// Next inbound line, or `Ok(None)` once the peer has closed its side.
    async fn recv_line(&self) -> Result<Option<String>, Self::Error>;

    /// Flushes pending output and shuts down the write side.
    async fn close(&self) -> Result<(), Self::Error>;

    fn id(&self) -> ConnectionId;

    /// Remote address, for logs. Never use it as an identity.
    fn peer_addr(&self) -> SocketAddr;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_id_new_and_into_inner() {
        let id = ConnectionId::new(42);
        assert_eq!(id.into_inner(), 42);
    }

    #[test]
    fn test_connection_id_display() {
        let id = ConnectionId::new(7);
        assert_eq!(id.to_string(), "conn-7");
    }

    #[test]
    fn test_connection_id_distinguishes_same_peer_address() {
        use std::collections::HashMap;
        // Two sockets from one NAT'd host still map to two sessions.
        let mut sessions = HashMap::new();
        sessions.insert(ConnectionId::new(1), "ana");
        sessions.insert(ConnectionId::new(2), "bia");
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[&ConnectionId::new(2)], "bia");
    }

    #[test]
    fn test_peer_unreachable_names_the_connection() {
        let err = TransportError::PeerUnreachable(ConnectionId::new(9));
        assert_eq!(err.to_string(), "peer conn-9 unreachable");
    }
}
