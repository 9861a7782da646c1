//! Grid coordinate and tile types for the combat map.
//!
//! Mirrors the role of a hex-coordinate module in a board-game engine, but
//! for a 4-connected square grid: integer `(x, y)` positions, Manhattan
//! distance, and a fixed tile vocabulary.

use serde::{Deserialize, Serialize};

/// Integer grid coordinate. `0 <= x < width`, `0 <= y < height` is enforced
/// by `Map`, not by this type — `Position` itself is just a pair of ints so
/// it can represent candidate (possibly out-of-bounds) coordinates during
/// pathfinding and move enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan (taxicab) distance between two positions.
    pub fn manhattan_distance(self, other: Self) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// The four 4-connected neighbors, in a fixed deterministic order
    /// (N, E, S, W) so callers that enumerate neighbors get stable output.
    pub fn neighbors(self) -> [Self; 4] {
        [
            Self::new(self.x, self.y - 1),
            Self::new(self.x + 1, self.y),
            Self::new(self.x, self.y + 1),
            Self::new(self.x - 1, self.y),
        ]
    }

    /// True if `other` is one of the four 4-connected neighbors of `self`.
    pub fn is_adjacent(self, other: Self) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Terrain kind for a single tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileKind {
    Floor,
    Wall,
    Door,
    Water,
}

impl TileKind {
    /// Walkability and sight-blocking are derived from kind, never set
    /// independently — a `Tile` whose `walkable`/`blocks_sight` disagreed
    /// with its `kind` would be an invariant violation.
    pub const fn walkable(self) -> bool {
        !matches!(self, TileKind::Wall)
    }

    pub const fn blocks_sight(self) -> bool {
        matches!(self, TileKind::Wall)
    }
}

/// A single map tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub kind: TileKind,
    pub walkable: bool,
    pub blocks_sight: bool,
}

impl Tile {
    pub const fn new(kind: TileKind) -> Self {
        Self {
            kind,
            walkable: kind.walkable(),
            blocks_sight: kind.blocks_sight(),
        }
    }
}

/// Width/height of a map, in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn contains(self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as u32) < self.width && (pos.y as u32) < self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manhattan_distance_matches_known_values() {
        assert_eq!(Position::new(0, 0).manhattan_distance(Position::new(3, 4)), 7);
        assert_eq!(Position::new(-2, -2).manhattan_distance(Position::new(2, 2)), 8);
    }

    #[test]
    fn neighbors_are_all_distance_one() {
        let origin = Position::new(5, 5);
        for n in origin.neighbors() {
            assert_eq!(origin.manhattan_distance(n), 1);
            assert!(origin.is_adjacent(n));
        }
    }

    #[test]
    fn not_adjacent_to_self() {
        let p = Position::new(1, 1);
        assert!(!p.is_adjacent(p));
    }

    #[test]
    fn tile_kind_walkability_and_sight() {
        assert!(Tile::new(TileKind::Floor).walkable);
        assert!(!Tile::new(TileKind::Wall).walkable);
        assert!(Tile::new(TileKind::Wall).blocks_sight);
        assert!(Tile::new(TileKind::Door).walkable);
        assert!(!Tile::new(TileKind::Door).blocks_sight);
        assert!(Tile::new(TileKind::Water).walkable);
        assert!(!Tile::new(TileKind::Water).blocks_sight);
    }

    #[test]
    fn grid_size_contains_bounds() {
        let size = GridSize::new(10, 10);
        assert!(size.contains(Position::new(0, 0)));
        assert!(size.contains(Position::new(9, 9)));
        assert!(!size.contains(Position::new(10, 0)));
        assert!(!size.contains(Position::new(-1, 0)));
    }
}
