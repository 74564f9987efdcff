//! The two-layer tile grid of a room.

use brickwork_protocol::Layer;

use crate::BlockType;

/// Width of one tile in pixels.
pub const TILE_WIDTH: i32 = 16;

/// Height of one tile in pixels.
pub const TILE_HEIGHT: i32 = 16;

/// One cell of the grid. Holds a reference into the block catalog, never an
/// owned block.
#[derive(Debug, Clone, Copy)]
pub struct Tile {
    pub block: &'static BlockType,
}

/// A `width x height x 2` grid of tiles, stored layer-major then row-major
/// — the same order the init payload uses on the wire.
#[derive(Debug)]
pub struct TileGrid {
    width: u16,
    height: u16,
    tiles: Vec<Tile>,
}

impl TileGrid {
    /// Creates a grid with every tile set to the empty block.
    pub fn new(width: u16, height: u16) -> Self {
        let len =
            usize::from(width) * usize::from(height) * Layer::COUNT;
        Self {
            width,
            height,
            tiles: vec![
                Tile {
                    block: BlockType::empty()
                };
                len
            ],
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// Returns `true` if (x, y) addresses a cell of this grid.
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    fn index(&self, x: u16, y: u16, layer: Layer) -> usize {
        (usize::from(layer.to_wire()) * usize::from(self.height)
            + usize::from(y))
            * usize::from(self.width)
            + usize::from(x)
    }

    /// The block at a cell, or `None` if out of bounds.
    pub fn block_at(
        &self,
        x: u16,
        y: u16,
        layer: Layer,
    ) -> Option<&'static BlockType> {
        if !self.in_bounds(x, y) {
            return None;
        }
        Some(self.tiles[self.index(x, y, layer)].block)
    }

    /// Applies a placement. Returns `true` only if the cell is in bounds
    /// and the new block differs from the current one; otherwise the grid
    /// is untouched and nothing should be broadcast.
    pub fn place(
        &mut self,
        x: u16,
        y: u16,
        layer: Layer,
        block: &'static BlockType,
    ) -> bool {
        if !self.in_bounds(x, y) {
            return false;
        }
        let idx = self.index(x, y, layer);
        if self.tiles[idx].block.id == block.id {
            return false;
        }
        self.tiles[idx].block = block;
        true
    }

    /// Serializes the grid for the init payload: one block id per tile,
    /// background layer first, rows in order. The internal storage order
    /// matches the wire order, so this is a straight copy.
    pub fn encode_blocks(&self) -> Vec<u8> {
        self.tiles.iter().map(|tile| tile.block.id).collect()
    }
}

// =========================================================================
// Tests
// =========================================================================
