//! The block catalog: the shared, immutable set of block-type descriptors.
//!
//! Tiles reference these by `&'static` pointer; the catalog is consulted by
//! id when a placement arrives off the wire. Id 0 is the empty block every
//! fresh grid is filled with.

/// A block-type descriptor. The catalog owns one instance per id; tiles
/// hold references, never copies.
#[derive(Debug, PartialEq, Eq)]
pub struct BlockType {
    pub id: u8,
    pub name: &'static str,
}

/// The catalog, indexed by id.
static CATALOG: [BlockType; 8] = [
    BlockType { id: 0, name: "empty" },
    BlockType { id: 1, name: "stone" },
    BlockType { id: 2, name: "dirt" },
    BlockType { id: 3, name: "grass" },
    BlockType { id: 4, name: "brick" },
    BlockType { id: 5, name: "wood" },
    BlockType { id: 6, name: "metal" },
    BlockType { id: 7, name: "glass" },
];

impl BlockType {
    /// The empty block (id 0).
    pub fn empty() -> &'static BlockType {
        &CATALOG[0]
    }

    /// Looks up a block type by wire id. Unknown ids return `None`; a
    /// placement carrying one is dropped.
    pub fn from_id(id: u8) -> Option<&'static BlockType> {
        CATALOG.get(usize::from(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_ids_match_positions() {
        for (i, block) in CATALOG.iter().enumerate() {
            assert_eq!(usize::from(block.id), i);
        }
    }

    #[test]
    fn test_from_id_known_and_unknown() {
        assert_eq!(BlockType::from_id(0), Some(BlockType::empty()));
        assert_eq!(BlockType::from_id(4).unwrap().name, "brick");
        assert!(BlockType::from_id(200).is_none());
    }
}
