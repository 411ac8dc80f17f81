//! Authentication hook for validating player identity.
//!
//! Account storage is not the game server's business, so it sits behind
//! the [`Authenticator`] trait: register a login, or trade a login and
//! password for a [`Player`]. [`AccountBook`] is the in-memory
//! implementation the server ships with; it keeps nothing across restarts.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use skycards_protocol::PlayerId;
use tokio::sync::Mutex;

use crate::SessionError;

/// A validated player handle: what the rest of the server knows about
/// someone after they log in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    /// Display name; shown to the opponent and used as the winner label.
    pub name: String,
}

/// Creates accounts and validates logins.
///
/// # Trait bounds
///
/// `Send + Sync + 'static` because one authenticator is shared by every
/// connection task for the life of the server.
///
/// # Example
///
/// ```rust
/// use skycards_protocol::PlayerId;
/// use skycards_session::{Authenticator, Player, SessionError};
///
/// /// Lets anyone in under the name they give. Development only.
/// struct OpenDoor;
///
/// impl Authenticator for OpenDoor {
///     async fn register(&self, _login: &str, _password: &str) -> Result<PlayerId, SessionError> {
///         Err(SessionError::EmptyLogin)
///     }
///
///     async fn authenticate(&self, login: &str, _password: &str) -> Result<Player, SessionError> {
///         Ok(Player { id: PlayerId(login.len() as u64), name: login.to_string() })
///     }
/// }
/// ```
pub trait Authenticator: Send + Sync + 'static {
    /// Creates an account and returns its new id.
    fn register(
        &self,
        login: &str,
        password: &str,
    ) -> impl Future<Output = Result<PlayerId, SessionError>> + Send;

    /// Checks credentials and returns the player they belong to.
    ///
    /// # Errors
    /// - [`SessionError::UnknownAccount`]: no such login
    /// - [`SessionError::BadCredentials`]: wrong password
    fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> impl Future<Output = Result<Player, SessionError>> + Send;
}

struct Account {
    id: PlayerId,
    password: String,
}

/// In-memory [`Authenticator`]. Logins are case-sensitive.
pub struct AccountBook {
    accounts: Mutex<HashMap<String, Account>>,
    next_id: AtomicU64,
}

impl AccountBook {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Number of registered accounts.
    pub async fn len(&self) -> usize {
        self.accounts.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.lock().await.is_empty()
    }
}

impl Default for AccountBook {
    fn default() -> Self {
        Self::new()
    }
}

impl Authenticator for AccountBook {
    async fn register(
        &self,
        login: &str,
        password: &str,
    ) -> Result<PlayerId, SessionError> {
        let login = login.trim();
        if login.is_empty() {
            return Err(SessionError::EmptyLogin);
        }

        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(login) {
            return Err(SessionError::AlreadyRegistered(login.to_string()));
        }

        let id = PlayerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        accounts.insert(
            login.to_string(),
            Account {
                id,
                password: password.to_string(),
            },
        );
        tracing::info!(player_id = %id, login, "account registered");
        Ok(id)
    }

    async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<Player, SessionError> {
        let login = login.trim();
        let accounts = self.accounts.lock().await;
        let account = accounts
            .get(login)
            .ok_or_else(|| SessionError::UnknownAccount(login.to_string()))?;
        if account.password != password {
            return Err(SessionError::BadCredentials);
        }
        Ok(Player {
            id: account.id,
            name: login.to_string(),
        })
    }
}
