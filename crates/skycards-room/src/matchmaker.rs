//! The matchmaker: the shared, lockable front of the [`MatchRegistry`].
//!
//! Every registry operation runs under one `tokio::sync::Mutex`, so two
//! players asking for a public match at the same moment can never both
//! take the same waiting room. The lock is held only for the registry
//! update and the (non-blocking) actor spawn; commands to a running room
//! are sent after it is released.

use std::sync::Arc;

use skycards_protocol::{PlayerId, RoomCode};
use tokio::sync::Mutex;

use crate::registry::{Departure, MatchRegistry, Pairing};
use crate::room::spawn_room;
use crate::{Contender, FinalScoreReward, RewardPolicy, RoomConfig, RoomError};

/// Where a public match request ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchStatus {
    /// Queued in a new room; the opponent has not arrived yet.
    Waiting(RoomCode),
    /// Paired; the room's actor has already sent `PAREADO`.
    Paired(RoomCode),
}

/// Cloneable handle to the match registry. One per server.
#[derive(Clone)]
pub struct Matchmaker {
    registry: Arc<Mutex<MatchRegistry>>,
    config: RoomConfig,
    rewards: Arc<dyn RewardPolicy>,
}

impl Matchmaker {
    pub fn new(config: RoomConfig) -> Self {
        Self::with_rewards(config, Arc::new(FinalScoreReward))
    }

    /// Uses a custom reward policy instead of [`FinalScoreReward`].
    pub fn with_rewards(config: RoomConfig, rewards: Arc<dyn RewardPolicy>) -> Self {
        Self {
            registry: Arc::new(Mutex::new(MatchRegistry::new(config.code_length))),
            config,
            rewards,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// `FIND_ROOM`: pairs with the oldest waiting public room or opens one.
    pub async fn find_public(
        &self,
        contender: Contender,
    ) -> Result<MatchStatus, RoomError> {
        let mut registry = self.registry.lock().await;
        let pairing = registry.request_public(contender)?;
        Ok(self.start_if_paired(&mut registry, pairing))
    }

    /// `CREATE_ROOM`: opens a private room and returns its code.
    pub async fn create_private(
        &self,
        contender: Contender,
    ) -> Result<RoomCode, RoomError> {
        self.registry.lock().await.create_private(contender)
    }

    /// `PRIV_ROOM`: joins a private room by code and starts the match.
    pub async fn join_private(
        &self,
        contender: Contender,
        code: &RoomCode,
    ) -> Result<(), RoomError> {
        let mut registry = self.registry.lock().await;
        let pairing = registry.join_private(contender, code)?;
        self.start_if_paired(&mut registry, pairing);
        Ok(())
    }

    /// Takes a departing player out of matchmaking.
    ///
    /// A waiting room is deleted; a running match is forfeited to the
    /// opponent. Safe to call for players who are in no room.
    pub async fn leave(&self, player_id: PlayerId) {
        let departure = self.registry.lock().await.leave(player_id);
        if let Some(Departure::InMatch(handle)) = departure {
            if let Err(e) = handle.leave(player_id).await {
                tracing::debug!(%player_id, error = %e, "room already stopped");
            }
        }
    }

    /// `PLAY_MOVE`: forwards the move to the player's running room.
    ///
    /// # Errors
    /// [`RoomError::NoActiveMatch`] if the player is not in a paired room,
    /// plus whatever the round engine rejects the move with.
    pub async fn submit_move(
        &self,
        player_id: PlayerId,
        card_index: i64,
        attribute: String,
    ) -> Result<(), RoomError> {
        let handle = self
            .registry
            .lock()
            .await
            .room_handle(player_id)
            .cloned()
            .ok_or(RoomError::NoActiveMatch)?;
        handle.submit_move(player_id, card_index, attribute).await
    }

    /// `CHAT`: relays a line to the player's opponent.
    pub async fn chat(
        &self,
        player_id: PlayerId,
        content: String,
    ) -> Result<(), RoomError> {
        let handle = self
            .registry
            .lock()
            .await
            .room_handle(player_id)
            .cloned()
            .ok_or(RoomError::NoOpponent)?;
        handle.chat(player_id, content).await
    }

    /// Drops a finished room from every index. Called by the room actor.
    pub async fn finish_room(&self, code: &RoomCode) {
        if self.registry.lock().await.remove_room(code) {
            tracing::info!(room = %code, "room removed");
        }
    }

    pub async fn room_count(&self) -> usize {
        self.registry.lock().await.room_count()
    }

    pub async fn waiting_public(&self) -> usize {
        self.registry.lock().await.waiting_public()
    }

    pub async fn room_of(&self, player_id: PlayerId) -> Option<RoomCode> {
        self.registry.lock().await.room_of(player_id).cloned()
    }

    fn start_if_paired(
        &self,
        registry: &mut MatchRegistry,
        pairing: Pairing,
    ) -> MatchStatus {
        match pairing {
            Pairing::Waiting(code) => MatchStatus::Waiting(code),
            Pairing::Paired { code, host, guest } => {
                let handle = spawn_room(
                    code.clone(),
                    host,
                    guest,
                    self.config.clone(),
                    Arc::clone(&self.rewards),
                    self.clone(),
                );
                registry.attach_handle(&code, handle);
                MatchStatus::Paired(code)
            }
        }
    }
}
