//! Session types: the server's record of a logged-in player.

use std::time::Instant;

use skycards_protocol::{Deck, PlayerId};
use skycards_transport::ConnectionId;

/// Whether the player is currently attached to a connection.
///
/// ```text
///   Online ──(connection ends)──→ Offline
///     ↑                              │
///     └───────────(login)────────────┘
/// ```
#[derive(Debug, Clone)]
pub enum SessionState {
    /// Logged in on this connection.
    Online { conn: ConnectionId },

    /// Logged out or disconnected at the given instant.
    Offline { since: Instant },
}

/// A single player's session.
///
/// Created on first login and kept after the player goes offline, so the
/// deck they built survives disconnects and is there for the next match.
#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    pub name: String,
    pub state: SessionState,
    /// `None` until the first successful `SET_DECK`.
    pub deck: Option<Deck>,
}

impl Session {
    pub fn is_online(&self) -> bool {
        matches!(self.state, SessionState::Online { .. })
    }
}
