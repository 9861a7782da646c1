//! The combat map: immutable once generated.

use serde::{Deserialize, Serialize};

use crate::grid::{GridSize, Position, Tile};

/// A generated map. Identical `(seed, width, height, wallDensity)` inputs to
/// `core_engine::mapgen::generate_map` always produce an identical `Map`,
/// including `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    pub id: String,
    pub size: GridSize,
    /// Row-major: `tiles[y][x]`.
    pub tiles: Vec<Vec<Tile>>,
}

impl Map {
    pub fn tile_at(&self, pos: Position) -> Option<&Tile> {
        if !self.size.contains(pos) {
            return None;
        }
        self.tiles.get(pos.y as usize)?.get(pos.x as usize)
    }

    pub fn is_walkable(&self, pos: Position) -> bool {
        self.tile_at(pos).is_some_and(|t| t.walkable)
    }

    pub fn blocks_sight(&self, pos: Position) -> bool {
        self.tile_at(pos).is_none_or(|t| t.blocks_sight)
    }
}
