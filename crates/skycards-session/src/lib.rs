//! Accounts and login sessions for Skycards.
//!
//! 1. **Accounts**: creating logins and checking passwords
//!    ([`Authenticator`] trait, [`AccountBook`] in memory)
//! 2. **Sessions**: which player is logged in on which connection, and
//!    the deck they have built ([`SessionManager`])
//!
//! ```text
//! Server dispatcher (above)  ← looks up the player behind each connection
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Protocol / Transport (below)  ← PlayerId, Deck, ConnectionId
//! ```

mod auth;
mod error;
mod manager;
mod session;

pub use auth::{AccountBook, Authenticator, Player};
pub use error::SessionError;
pub use manager::SessionManager;
pub use session::{Session, SessionState};
