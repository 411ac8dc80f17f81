//! Error types for the session layer.

use skycards_protocol::{PlayerId, ProtocolError};

/// Errors from account and session handling.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No account exists with this login.
    #[error("no account named {0:?}")]
    UnknownAccount(String),

    /// The password didn't match.
    #[error("wrong password")]
    BadCredentials,

    /// Registration with a login that is already taken.
    #[error("login {0:?} already exists")]
    AlreadyRegistered(String),

    /// Registration with an empty or whitespace-only login.
    #[error("login must not be empty")]
    EmptyLogin,

    /// The player is already logged in on some connection.
    #[error("player {0} is already online")]
    AlreadyOnline(PlayerId),

    /// The connection has not logged in yet.
    #[error("log in first")]
    NotLoggedIn,

    /// No session is known for this player.
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    /// A `SET_DECK` with the wrong number of cards.
    #[error(transparent)]
    InvalidDeck(#[from] ProtocolError),
}
