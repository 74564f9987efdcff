//! World state for Brickwork: rooms, tile grids, the block catalog, and
//! per-room player rosters.
//!
//! Everything here is plain data owned by the dispatch task. Rooms are
//! created through the [`RoomStore`] and live for the rest of the process;
//! there is no removal path (ids are positional and must never be reused).
//!
//! # Key types
//!
//! - [`BlockType`] — an entry in the shared, immutable block catalog
//! - [`TileGrid`] — a room's two-layer grid of block references
//! - [`Player`] / [`Roster`] — the per-room player registry
//! - [`Room`] — one map: grid + roster + metadata
//! - [`RoomStore`] — owns every active room

mod block;
mod error;
mod grid;
mod player;
mod room;
mod roster;
mod store;

pub use block::BlockType;
pub use error::WorldError;
pub use grid::{Tile, TileGrid, TILE_HEIGHT, TILE_WIDTH};
pub use player::Player;
pub use room::{Room, DEFAULT_RATING};
pub use roster::Roster;
pub use store::RoomStore;
