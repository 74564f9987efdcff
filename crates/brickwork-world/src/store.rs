//! The store of every active room.

use brickwork_protocol::{RoomId, RoomSummary};

use crate::{Room, WorldError};

/// Owns the list of active rooms in creation order.
///
/// Room ids are the creation index and are never reused. There is no
/// removal path: rooms accumulate for the lifetime of the server process.
#[derive(Debug)]
pub struct RoomStore {
    rooms: Vec<Room>,
    /// Player cap applied to every created room.
    max_players: usize,
}

impl RoomStore {
    pub fn new(max_players: usize) -> Self {
        Self {
            rooms: Vec::new(),
            max_players,
        }
    }

    /// Creates a room with a blank grid and returns its id.
    pub fn create(
        &mut self,
        name: String,
        description: String,
        width: u16,
        height: u16,
    ) -> RoomId {
        let id = RoomId(self.rooms.len() as u32);
        tracing::info!(room_id = %id, %name, "room created");
        self.rooms.push(Room::new(
            id,
            name,
            description,
            width,
            height,
            self.max_players,
        ));
        id
    }

    pub fn get(&self, id: RoomId) -> Result<&Room, WorldError> {
        self.rooms
            .get(id.0 as usize)
            .ok_or(WorldError::RoomNotFound(id))
    }

    pub fn get_mut(&mut self, id: RoomId) -> Result<&mut Room, WorldError> {
        self.rooms
            .get_mut(id.0 as usize)
            .ok_or(WorldError::RoomNotFound(id))
    }

    /// Lobby snapshot: one summary per room, in creation order.
    pub fn summaries(&self) -> Vec<RoomSummary> {
        self.rooms.iter().map(Room::summary).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}

// =========================================================================
// Tests
// =========================================================================
