//! One room: a tile grid, a roster, and lobby metadata.

use brickwork_protocol::{Message, Point, RoomId, RoomSummary};

use crate::{Roster, TileGrid, TILE_HEIGHT, TILE_WIDTH};

/// The rating every freshly created room starts with.
pub const DEFAULT_RATING: u8 = 5;

/// An isolated, independently addressable simulation space.
#[derive(Debug)]
pub struct Room {
    id: RoomId,
    name: String,
    description: String,
    grid: TileGrid,
    spawn: Point,
    rating: u8,
    roster: Roster,
}

impl Room {
    /// Creates a room with a blank grid, one-tile-in spawn point, and the
    /// default rating.
    pub fn new(
        id: RoomId,
        name: String,
        description: String,
        width: u16,
        height: u16,
        max_players: usize,
    ) -> Self {
        Self {
            id,
            name,
            description,
            grid: TileGrid::new(width, height),
            spawn: Point::new(TILE_WIDTH, TILE_HEIGHT),
            rating: DEFAULT_RATING,
            roster: Roster::new(max_players),
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn spawn(&self) -> Point {
        self.spawn
    }

    pub fn rating(&self) -> u8 {
        self.rating
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut TileGrid {
        &mut self.grid
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn roster_mut(&mut self) -> &mut Roster {
        &mut self.roster
    }

    /// Clamps a reported position into the room's pixel bounds, one tile
    /// in from each edge.
    pub fn clamp_position(&self, p: Point) -> Point {
        let max_x = i32::from(self.grid.width()) * TILE_WIDTH - 2 * TILE_WIDTH;
        let max_y =
            i32::from(self.grid.height()) * TILE_HEIGHT - 2 * TILE_HEIGHT;
        Point::new(
            p.x.clamp(TILE_WIDTH, max_x),
            p.y.clamp(TILE_HEIGHT, max_y),
        )
    }

    /// Builds the init payload for this room's current grid.
    pub fn init_message(&self) -> Message {
        Message::Init {
            width: self.grid.width(),
            height: self.grid.height(),
            blocks: self.grid.encode_blocks(),
        }
    }

    /// This room's entry in the lobby listing.
    pub fn summary(&self) -> RoomSummary {
        RoomSummary {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            players: self.roster.len().min(u8::MAX.into()) as u8,
            rating: self.rating,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
