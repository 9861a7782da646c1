//! Deterministic map generation.
//!
//! Identical `(seed, width, height)` inputs always produce an identical
//! `Map`, including its `id` — map generation runs entirely off `SimRng`,
//! never off wall-clock time or an external RNG source.
//!
//! Connectivity between spawns is explicitly a non-goal: a generated map may
//! leave some floor tiles unreachable from others, and `pathfinding::find_path`
//! returns `None` in that case rather than the generator forcing every tile
//! open.

use core_types::{GridSize, Map, Position, SimRng, Tile, TileKind};

/// Fraction of interior tiles converted to walls.
const WALL_DENSITY: f64 = 0.12;

/// Build a map from `seed`: a bordered rectangle of floor tiles with
/// scattered interior walls. The 3x3 region centered on the map's own
/// center — the default player spawn before `setup::find_spawn_points`
/// picks real seats — is always left clear.
pub fn generate_map(seed: u64, width: u32, height: u32) -> Map {
    let mut rng = SimRng::derive(seed, 0);
    let mut tiles = vec![vec![Tile::new(TileKind::Floor); width as usize]; height as usize];

    for y in 0..height {
        for x in 0..width {
            let on_border = x == 0 || y == 0 || x == width - 1 || y == height - 1;
            if on_border {
                tiles[y as usize][x as usize] = Tile::new(TileKind::Wall);
            }
        }
    }

    for y in 1..height.saturating_sub(1) {
        for x in 1..width.saturating_sub(1) {
            if rng.range(0, 999) < (WALL_DENSITY * 1000.0) as i64 {
                tiles[y as usize][x as usize] = Tile::new(TileKind::Wall);
            }
        }
    }

    let mut map = Map {
        id: format!("map-{seed:016x}"),
        size: GridSize::new(width, height),
        tiles,
    };

    let spawn = Position::new((width / 2) as i32, (height / 2) as i32);
    clear_spawn_region(&mut map, spawn);
    map
}

/// Force the 3x3 region centered on `spawn` to floor, clipped to the
/// interior (never touching the border ring of walls).
fn clear_spawn_region(map: &mut Map, spawn: Position) {
    for dy in -1..=1 {
        for dx in -1..=1 {
            let x = spawn.x + dx;
            let y = spawn.y + dy;
            if x <= 0 || y <= 0 || x >= map.size.width as i32 - 1 || y >= map.size.height as i32 - 1 {
                continue;
            }
            map.tiles[y as usize][x as usize] = Tile::new(TileKind::Floor);
        }
    }
}
