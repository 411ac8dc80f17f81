//! The session manager: who is logged in on which connection, and what
//! deck each player has built.
//!
//! # Concurrency note
//!
//! `SessionManager` is plain data behind `&mut self`. The server wraps it
//! in a mutex and never holds that lock across an `.await`.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::time::Instant;

use skycards_protocol::{Card, Deck, PlayerId};
use skycards_transport::ConnectionId;

use crate::{Player, Session, SessionError, SessionState};

/// Tracks every session the server has seen since it started.
///
/// ```text
/// authenticate() ──→ attach() ──→ detach() ──→ attach() ...
///                       │            │
///                       ▼            ▼
///                   [Online]     [Offline]   (deck kept)
/// ```
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: HashMap<PlayerId, Session>,

    /// Index from live connections to the player logged in on them. Kept
    /// in sync with the `Online` sessions.
    connections: HashMap<ConnectionId, PlayerId>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds an authenticated player to a connection.
    ///
    /// A returning player gets their old session back (and their deck).
    ///
    /// # Errors
    /// Returns [`SessionError::AlreadyOnline`] if the player is online on
    /// any connection, or if this connection already has someone logged in.
    pub fn attach(
        &mut self,
        conn: ConnectionId,
        player: Player,
    ) -> Result<&Session, SessionError> {
        if let Some(current) = self.connections.get(&conn) {
            return Err(SessionError::AlreadyOnline(*current));
        }

        let player_id = player.id;
        let session = match self.sessions.entry(player_id) {
            Entry::Occupied(entry) => {
                let session = entry.into_mut();
                if session.is_online() {
                    return Err(SessionError::AlreadyOnline(player_id));
                }
                session.name = player.name;
                session.state = SessionState::Online { conn };
                session
            }
            Entry::Vacant(entry) => entry.insert(Session {
                player_id,
                name: player.name,
                state: SessionState::Online { conn },
                deck: None,
            }),
        };

        self.connections.insert(conn, player_id);
        tracing::info!(%player_id, %conn, "player logged in");
        Ok(session)
    }

    /// Marks whoever is logged in on `conn` as offline.
    ///
    /// Returns the player that was detached, or `None` if the connection
    /// never logged in.
    pub fn detach(&mut self, conn: ConnectionId) -> Option<PlayerId> {
        let player_id = self.connections.remove(&conn)?;
        if let Some(session) = self.sessions.get_mut(&player_id) {
            session.state = SessionState::Offline {
                since: Instant::now(),
            };
        }
        tracing::info!(%player_id, %conn, "player went offline");
        Some(player_id)
    }

    /// The player logged in on `conn`.
    ///
    /// # Errors
    /// Returns [`SessionError::NotLoggedIn`] before a successful `LOGIN`.
    pub fn player_for(&self, conn: ConnectionId) -> Result<PlayerId, SessionError> {
        self.connections
            .get(&conn)
            .copied()
            .ok_or(SessionError::NotLoggedIn)
    }

    pub fn get(&self, player_id: PlayerId) -> Option<&Session> {
        self.sessions.get(&player_id)
    }

    /// Replaces the player's deck.
    ///
    /// # Errors
    /// - [`SessionError::InvalidDeck`]: not exactly four cards; the old
    ///   deck is left as it was
    /// - [`SessionError::NotFound`]: no session for this player
    pub fn set_deck(
        &mut self,
        player_id: PlayerId,
        cards: Vec<Card>,
    ) -> Result<(), SessionError> {
        let session = self
            .sessions
            .get_mut(&player_id)
            .ok_or(SessionError::NotFound(player_id))?;
        session.deck = Some(Deck::try_from(cards)?);
        tracing::debug!(%player_id, "deck updated");
        Ok(())
    }

    /// A copy of the player's current deck, if they have set one.
    pub fn deck(&self, player_id: PlayerId) -> Option<Deck> {
        self.sessions.get(&player_id)?.deck.clone()
    }

    /// Number of players currently online.
    pub fn online_count(&self) -> usize {
        self.connections.len()
    }

    /// Total sessions, online or not.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use skycards_protocol::{DECK_SIZE, ProtocolError};

    use super::*;

    fn player(id: u64, name: &str) -> Player {
        Player {
            id: PlayerId(id),
            name: name.to_string(),
        }
    }

    fn cards(n: usize) -> Vec<Card> {
        (0..n)
            .map(|i| Card {
                name: format!("card-{i}"),
                rarity: "common".into(),
                wingspan: i as u32,
                speed: 1,
                height: 2,
                passengers: 3,
            })
            .collect()
    }

    #[test]
    fn test_attach_new_player_returns_online_session() {
        let mut mgr = SessionManager::new();
        let session = mgr.attach(ConnectionId::new(1), player(7, "ana")).unwrap();

        assert_eq!(session.player_id, PlayerId(7));
        assert!(session.is_online());
        assert!(session.deck.is_none());
        assert_eq!(mgr.online_count(), 1);
    }

    #[test]
    fn test_attach_player_already_online_returns_error() {
        let mut mgr = SessionManager::new();
        mgr.attach(ConnectionId::new(1), player(7, "ana")).unwrap();

        let result = mgr.attach(ConnectionId::new(2), player(7, "ana"));
        assert!(matches!(result, Err(SessionError::AlreadyOnline(p)) if p == PlayerId(7)));
        assert_eq!(mgr.online_count(), 1);
    }

    #[test]
    fn test_attach_second_login_on_same_connection_returns_error() {
        let mut mgr = SessionManager::new();
        mgr.attach(ConnectionId::new(1), player(7, "ana")).unwrap();

        let result = mgr.attach(ConnectionId::new(1), player(8, "bia"));
        assert!(matches!(result, Err(SessionError::AlreadyOnline(p)) if p == PlayerId(7)));
        assert!(mgr.get(PlayerId(8)).is_none());
    }

    #[test]
    fn test_detach_marks_offline_and_frees_connection() {
        let mut mgr = SessionManager::new();
        let conn = ConnectionId::new(1);
        mgr.attach(conn, player(7, "ana")).unwrap();

        assert_eq!(mgr.detach(conn), Some(PlayerId(7)));
        assert!(!mgr.get(PlayerId(7)).unwrap().is_online());
        assert!(matches!(mgr.player_for(conn), Err(SessionError::NotLoggedIn)));
        assert_eq!(mgr.online_count(), 0);
        assert_eq!(mgr.len(), 1);
    }

    #[test]
    fn test_detach_unknown_connection_returns_none() {
        let mut mgr = SessionManager::new();
        assert_eq!(mgr.detach(ConnectionId::new(99)), None);
    }

    #[test]
    fn test_deck_survives_reconnect() {
        let mut mgr = SessionManager::new();
        mgr.attach(ConnectionId::new(1), player(7, "ana")).unwrap();
        mgr.set_deck(PlayerId(7), cards(DECK_SIZE)).unwrap();
        mgr.detach(ConnectionId::new(1));

        let session = mgr.attach(ConnectionId::new(2), player(7, "ana")).unwrap();
        assert!(session.deck.is_some());
        assert_eq!(mgr.player_for(ConnectionId::new(2)).unwrap(), PlayerId(7));
    }

    #[test]
    fn test_set_deck_wrong_size_keeps_previous_deck() {
        let mut mgr = SessionManager::new();
        mgr.attach(ConnectionId::new(1), player(7, "ana")).unwrap();
        mgr.set_deck(PlayerId(7), cards(DECK_SIZE)).unwrap();

        let result = mgr.set_deck(PlayerId(7), cards(3));
        assert!(matches!(
            result,
            Err(SessionError::InvalidDeck(ProtocolError::DeckSize { got: 3, .. }))
        ));
        let deck = mgr.deck(PlayerId(7)).unwrap();
        assert_eq!(deck.cards()[0].name, "card-0");
    }

    #[test]
    fn test_set_deck_unknown_player_returns_not_found() {
        let mut mgr = SessionManager::new();
        let result = mgr.set_deck(PlayerId(1), cards(DECK_SIZE));
        assert!(matches!(result, Err(SessionError::NotFound(_))));
    }

    #[test]
    fn test_deck_before_set_deck_is_none() {
        let mut mgr = SessionManager::new();
        mgr.attach(ConnectionId::new(1), player(7, "ana")).unwrap();
        assert!(mgr.deck(PlayerId(7)).is_none());
    }
}
