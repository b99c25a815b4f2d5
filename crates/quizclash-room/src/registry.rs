//! The session registry: creates rooms, resolves codes to handles, and
//! reaps rooms once their last player leaves.

use std::collections::HashMap;

use tracing::{debug, info};

use quizclash_game::GameConfig;
use quizclash_protocol::{GameMode, PlayerId, RoomCode, RoomSummary};

use crate::actor::spawn_room;
use crate::{RoomError, RoomHandle};

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// All live rooms, keyed by code. One per server process; callers share
/// it behind a lock.
pub struct SessionRegistry {
    rooms: HashMap<RoomCode, RoomHandle>,
    config: GameConfig,
}

impl SessionRegistry {
    pub fn new(config: GameConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            config,
        }
    }

    /// Spawns a new room with a fresh random code, retrying the draw on
    /// the (unlikely) collision with a live room.
    pub fn create(&mut self, mode: GameMode) -> RoomHandle {
        let mut rng = rand::rng();
        let code = loop {
            let candidate = RoomCode::generate(&mut rng);
            if !self.rooms.contains_key(&candidate) {
                break candidate;
            }
            debug!(code = %candidate, "room code collision, redrawing");
        };

        let handle = spawn_room(
            code.clone(),
            mode,
            self.config.clone(),
            DEFAULT_CHANNEL_SIZE,
        );
        self.rooms.insert(code.clone(), handle.clone());
        info!(room = %code, %mode, rooms = self.rooms.len(), "room created");
        handle
    }

    /// Resolves a code to its room.
    ///
    /// # Errors
    /// [`RoomError::NotFound`] when no live room has this code.
    pub fn lookup(&self, code: &RoomCode) -> Result<RoomHandle, RoomError> {
        self.rooms
            .get(code)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(code.clone()))
    }

    /// Removes a player from their room and tears the room down if that
    /// left it empty. Returns how many players remain.
    pub async fn remove_player_and_maybe_reap(
        &mut self,
        code: &RoomCode,
        player_id: PlayerId,
    ) -> Result<usize, RoomError> {
        let handle = self.lookup(code)?;
        let remaining = handle.leave(player_id).await?;
        if remaining == 0 {
            let _ = handle.shutdown().await;
            self.rooms.remove(code);
            info!(room = %code, rooms = self.rooms.len(), "empty room reaped");
        }
        Ok(remaining)
    }

    /// Summaries of every live room. Rooms that fail to respond (mid
    /// shutdown) are skipped.
    pub async fn list_rooms(&self) -> Vec<RoomSummary> {
        let mut summaries = Vec::with_capacity(self.rooms.len());
        for handle in self.rooms.values() {
            if let Ok(summary) = handle.info().await {
                summaries.push(summary);
            }
        }
        summaries
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(GameConfig::default())
    }
}
