//! Room registry: capacity-bounded assignment, release, and
//! empty-room destruction.
//!
//! The registry is the single decision point for which room a player
//! lands in. It is not internally synchronized — the server owns it
//! behind a mutex, so assignment decisions are serialized: two
//! concurrent connects can never both squeeze into a full room, and
//! can never each create a fresh room while an existing one has space.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use cubeland_protocol::{RoomId, Username};

use crate::room::spawn_room;
use crate::{EventSender, RoomHandle, Roster, WorldConfig, WorldError};

/// Counter for generating unique room IDs.
static NEXT_ROOM_ID: AtomicU64 = AtomicU64::new(1);

/// Default command channel size for room actors.
const DEFAULT_CHANNEL_SIZE: usize = 64;

/// One active room, with the registry's authoritative member count.
///
/// The count is maintained here, under the registry's serialization,
/// rather than queried from the actor — a queried count could change
/// between the read and the join.
struct RoomSlot {
    id: RoomId,
    handle: RoomHandle,
    members: usize,
}

/// Owns every active room and tracks which player is in which room.
pub struct RoomRegistry {
    config: WorldConfig,
    /// Active rooms in creation order — assignment scans front to back.
    rooms: Vec<RoomSlot>,
    /// Maps each player to their current room. A player is in at most
    /// one room at a time (key invariant).
    player_rooms: HashMap<Username, RoomId>,
    /// Process-lifetime player records (homes, last positions).
    roster: Roster,
}

impl RoomRegistry {
    /// Creates an empty registry.
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            rooms: Vec::new(),
            player_rooms: HashMap::new(),
            roster: Roster::new(),
        }
    }

    /// Places a player in the first room (in creation order) with a
    /// free slot, creating a new room only when every existing one is
    /// full. Returns the room id and a handle for routing the player's
    /// subsequent actions.
    ///
    /// Assigning an already-assigned player is a no-op that returns
    /// their existing room.
    ///
    /// `coins` is the player's balance for the welcome snapshot;
    /// `color` is their cosmetic from the account store.
    pub async fn assign(
        &mut self,
        username: Username,
        color: &str,
        coins: u64,
        sender: EventSender,
    ) -> Result<(RoomId, RoomHandle), WorldError> {
        if let Some(&room_id) = self.player_rooms.get(&username) {
            let slot = self
                .slot_of(room_id)
                .expect("player_rooms points at a live room");
            return Ok((room_id, slot.handle.clone()));
        }

        let player = self.roster.checkin(&username, color, &self.config);

        // First room under capacity wins; scan order is creation order.
        let capacity = self.config.room_capacity;
        if let Some(slot) =
            self.rooms.iter_mut().find(|s| s.members < capacity)
        {
            slot.handle.join(player, coins, sender).await?;
            slot.members += 1;
            self.player_rooms.insert(username, slot.id);
            return Ok((slot.id, slot.handle.clone()));
        }

        // Everything is full (or no rooms exist) — create one.
        let room_id = RoomId(NEXT_ROOM_ID.fetch_add(1, Ordering::Relaxed));
        let handle =
            spawn_room(room_id, self.config.clone(), DEFAULT_CHANNEL_SIZE);
        tracing::info!(%room_id, "room created");

        handle.join(player, coins, sender).await?;
        self.rooms.push(RoomSlot {
            id: room_id,
            handle: handle.clone(),
            members: 1,
        });
        self.player_rooms.insert(username, room_id);
        Ok((room_id, handle))
    }

    /// Removes a player from their room. The departure broadcast runs
    /// before this returns; if the room is left empty it is destroyed
    /// on the spot and its id stops resolving.
    pub async fn release(&mut self, username: &Username) -> Result<(), WorldError> {
        let room_id = self
            .player_rooms
            .remove(username)
            .ok_or_else(|| WorldError::PlayerNotFound(username.clone()))?;

        let idx = self
            .rooms
            .iter()
            .position(|s| s.id == room_id)
            .expect("player_rooms points at a live room");

        match self.rooms[idx].handle.leave(username.clone()).await {
            Ok(last_position) => {
                self.roster.checkout(username, last_position);
            }
            Err(e) => {
                // The index said the player was there; the actor
                // disagreed. That's a broken invariant, not user input.
                debug_assert!(false, "registry/actor disagree: {e}");
                tracing::error!(%room_id, player = %username, error = %e,
                    "registry index out of sync with room actor");
            }
        }

        self.rooms[idx].members = self.rooms[idx].members.saturating_sub(1);
        if self.rooms[idx].members == 0 {
            let _ = self.rooms[idx].handle.shutdown().await;
            self.rooms.remove(idx);
            tracing::info!(%room_id, "room destroyed (empty)");
        }
        Ok(())
    }

    /// Read-only membership snapshot. Destroyed rooms are gone: their
    /// ids resolve to `RoomNotFound`, never to an empty room object.
    pub async fn members_of(
        &self,
        room_id: RoomId,
    ) -> Result<Vec<Username>, WorldError> {
        let slot = self
            .slot_of(room_id)
            .ok_or(WorldError::RoomNotFound(room_id))?;
        slot.handle.members().await
    }

    /// Returns the room a player is currently assigned to, if any.
    pub fn room_of(&self, username: &Username) -> Option<RoomId> {
        self.player_rooms.get(username).copied()
    }

    /// Cloned handles to every active room — used to push catalog
    /// updates to all rooms without holding the registry lock during
    /// the sends.
    pub fn room_handles(&self) -> Vec<RoomHandle> {
        self.rooms.iter().map(|s| s.handle.clone()).collect()
    }

    /// Number of active rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn slot_of(&self, room_id: RoomId) -> Option<&RoomSlot> {
        self.rooms.iter().find(|s| s.id == room_id)
    }
}
