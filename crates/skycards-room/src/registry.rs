//! The match registry: every active room, the public queue, and the
//! private-room directory, kept consistent with each other.
//!
//! `MatchRegistry` is synchronous and does no I/O. The [`Matchmaker`]
//! owns the one lock around it and spawns room actors for the pairings it
//! reports.
//!
//! [`Matchmaker`]: crate::Matchmaker

use std::collections::{HashMap, HashSet, VecDeque};

use rand::Rng;
use skycards_protocol::{PlayerId, RoomCode};

use crate::{Contender, RoomError, RoomHandle, RoomState};

const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Collisions tolerated before code generation gives up.
const MAX_CODE_ATTEMPTS: usize = 10_000;

/// Everything the registry knows about one room.
struct RoomEntry {
    private: bool,
    state: RoomState,
    /// Occupants in seat order. Never more than two.
    players: Vec<PlayerId>,
    /// The opener, held here until an opponent arrives.
    host: Option<Contender>,
    /// Set once the room is paired and its actor is running.
    handle: Option<RoomHandle>,
}

/// Result of a matchmaking request.
#[derive(Debug)]
pub enum Pairing {
    /// A new room was opened and is waiting for an opponent.
    Waiting(RoomCode),

    /// The request completed a room. The caller must start its match.
    Paired {
        code: RoomCode,
        host: Contender,
        guest: Contender,
    },
}

/// What leaving did to the player's room.
#[derive(Debug)]
pub enum Departure {
    /// The player was alone; the room is gone.
    Abandoned(RoomCode),

    /// The player was mid-match; the room actor must be told.
    InMatch(RoomHandle),
}

/// All rooms plus the two ways into them.
///
/// A waiting room sits in exactly one of the public queue and the private
/// directory. Paired and finished rooms sit in neither.
pub struct MatchRegistry {
    rooms: HashMap<RoomCode, RoomEntry>,
    /// Public rooms waiting for an opponent, oldest first.
    public_queue: VecDeque<RoomCode>,
    /// Private rooms waiting for an opponent.
    private_lobby: HashSet<RoomCode>,
    /// Which room each player occupies. One room per player.
    player_rooms: HashMap<PlayerId, RoomCode>,
    code_length: usize,
}

impl MatchRegistry {
    pub fn new(code_length: usize) -> Self {
        Self {
            rooms: HashMap::new(),
            public_queue: VecDeque::new(),
            private_lobby: HashSet::new(),
            player_rooms: HashMap::new(),
            code_length: code_length.max(1),
        }
    }

    /// Pairs with the oldest waiting public room, or opens a new one.
    ///
    /// # Errors
    /// [`RoomError::AlreadyInRoom`] if the player occupies a room.
    pub fn request_public(
        &mut self,
        contender: Contender,
    ) -> Result<Pairing, RoomError> {
        self.ensure_free(contender.player_id)?;

        while let Some(code) = self.public_queue.pop_front() {
            if self.is_joinable(&code) {
                return self.pair(code, contender);
            }
        }

        let code = self.open_room(contender, false)?;
        self.public_queue.push_back(code.clone());
        tracing::info!(room = %code, "public room waiting for opponent");
        Ok(Pairing::Waiting(code))
    }

    /// Opens a private room and returns its code.
    pub fn create_private(
        &mut self,
        contender: Contender,
    ) -> Result<RoomCode, RoomError> {
        self.ensure_free(contender.player_id)?;
        let code = self.open_room(contender, true)?;
        self.private_lobby.insert(code.clone());
        tracing::info!(room = %code, "private room created");
        Ok(code)
    }

    /// Joins the private room named by `code`.
    ///
    /// # Errors
    /// - [`RoomError::AlreadyInRoom`]: the player occupies a room
    /// - [`RoomError::UnknownRoomCode`]: no waiting private room has
    ///   this code (public rooms are never joinable by code)
    pub fn join_private(
        &mut self,
        contender: Contender,
        code: &RoomCode,
    ) -> Result<Pairing, RoomError> {
        self.ensure_free(contender.player_id)?;
        if !self.private_lobby.contains(code) || !self.is_joinable(code) {
            return Err(RoomError::UnknownRoomCode(code.clone()));
        }
        self.pair(code.clone(), contender)
    }

    /// Records the running actor for a paired room.
    pub fn attach_handle(&mut self, code: &RoomCode, handle: RoomHandle) {
        if let Some(entry) = self.rooms.get_mut(code) {
            entry.handle = Some(handle);
        }
    }

    /// Takes the player out of whatever room they occupy.
    ///
    /// A waiting room is deleted outright. For a paired room only the
    /// player's own index entry goes; the room stays until its actor
    /// finishes.
    pub fn leave(&mut self, player_id: PlayerId) -> Option<Departure> {
        let code = self.player_rooms.remove(&player_id)?;
        let state = self.rooms.get(&code)?.state;
        if state.is_joinable() {
            self.remove_room(&code);
            tracing::info!(room = %code, %player_id, "waiting room abandoned");
            return Some(Departure::Abandoned(code));
        }
        self.rooms
            .get(&code)
            .and_then(|entry| entry.handle.clone())
            .map(Departure::InMatch)
    }

    /// Deletes a room from every index. Returns `false` if it was unknown.
    pub fn remove_room(&mut self, code: &RoomCode) -> bool {
        let Some(entry) = self.rooms.remove(code) else {
            return false;
        };
        self.public_queue.retain(|queued| queued != code);
        self.private_lobby.remove(code);
        for player in &entry.players {
            if self.player_rooms.get(player) == Some(code) {
                self.player_rooms.remove(player);
            }
        }
        true
    }

    /// The running room the player is playing in, if any.
    pub fn room_handle(&self, player_id: PlayerId) -> Option<&RoomHandle> {
        let code = self.player_rooms.get(&player_id)?;
        self.rooms.get(code)?.handle.as_ref()
    }

    pub fn room_of(&self, player_id: PlayerId) -> Option<&RoomCode> {
        self.player_rooms.get(&player_id)
    }

    pub fn room_state(&self, code: &RoomCode) -> Option<RoomState> {
        self.rooms.get(code).map(|entry| entry.state)
    }

    pub fn is_private(&self, code: &RoomCode) -> Option<bool> {
        self.rooms.get(code).map(|entry| entry.private)
    }

    /// Number of players in the room (0 for unknown rooms).
    pub fn occupants(&self, code: &RoomCode) -> usize {
        self.rooms.get(code).map_or(0, |entry| entry.players.len())
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn waiting_public(&self) -> usize {
        self.public_queue.len()
    }

    pub fn waiting_private(&self) -> usize {
        self.private_lobby.len()
    }

    fn ensure_free(&self, player_id: PlayerId) -> Result<(), RoomError> {
        match self.player_rooms.get(&player_id) {
            Some(code) => Err(RoomError::AlreadyInRoom(player_id, code.clone())),
            None => Ok(()),
        }
    }

    fn is_joinable(&self, code: &RoomCode) -> bool {
        self.rooms
            .get(code)
            .is_some_and(|entry| entry.state.is_joinable() && entry.host.is_some())
    }

    fn open_room(
        &mut self,
        host: Contender,
        private: bool,
    ) -> Result<RoomCode, RoomError> {
        let code = self.generate_code()?;
        self.player_rooms.insert(host.player_id, code.clone());
        self.rooms.insert(
            code.clone(),
            RoomEntry {
                private,
                state: RoomState::WaitingForOpponent,
                players: vec![host.player_id],
                host: Some(host),
                handle: None,
            },
        );
        Ok(code)
    }

    /// Seats `guest` in a joinable room. Callers check `is_joinable` first.
    fn pair(
        &mut self,
        code: RoomCode,
        guest: Contender,
    ) -> Result<Pairing, RoomError> {
        let entry = self
            .rooms
            .get_mut(&code)
            .ok_or_else(|| RoomError::UnknownRoomCode(code.clone()))?;
        let host = entry
            .host
            .take()
            .ok_or_else(|| RoomError::UnknownRoomCode(code.clone()))?;

        entry.players.push(guest.player_id);
        debug_assert!(entry.state.can_transition_to(RoomState::InProgress));
        entry.state = RoomState::InProgress;
        self.private_lobby.remove(&code);
        self.player_rooms.insert(guest.player_id, code.clone());

        tracing::info!(
            room = %code,
            host = %host.player_id,
            guest = %guest.player_id,
            "room paired"
        );
        Ok(Pairing::Paired { code, host, guest })
    }

    /// A fresh code, re-rolled until no active room uses it.
    ///
    /// # Errors
    /// [`RoomError::NoFreeRoomCode`] when every code is taken or the
    /// re-rolls run out.
    fn generate_code(&self) -> Result<RoomCode, RoomError> {
        let capacity = u32::try_from(self.code_length)
            .ok()
            .and_then(|len| CODE_ALPHABET.len().checked_pow(len));
        if capacity.is_some_and(|capacity| self.rooms.len() >= capacity) {
            return Err(RoomError::NoFreeRoomCode);
        }

        let mut rng = rand::rng();
        for _ in 0..MAX_CODE_ATTEMPTS {
            let code: String = (0..self.code_length)
                .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
                .collect();
            let code = RoomCode::new(code);
            if !self.rooms.contains_key(&code) {
                return Ok(code);
            }
        }
        tracing::warn!(
            code_length = self.code_length,
            rooms = self.rooms.len(),
            "room code space is crowded"
        );
        Err(RoomError::NoFreeRoomCode)
    }
}
