//! Grid pathfinding — A* with a Manhattan heuristic over the 4-connected
//! combat map.
//!
//! `find_path` is the single source of truth for whether one position can
//! reach another and at what cost; both move validation and NPC movement
//! policy go through it.

use std::collections::{BinaryHeap, HashMap};

use core_types::{GameState, Map, Position, UnitId};

#[derive(Debug, Clone, PartialEq, Eq)]
struct Frontier {
    priority: i64,
    position: Position,
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        other.priority.cmp(&self.priority)
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

/// A tile is occupiable for pathfinding purposes if it's walkable and either
/// empty or is the moving unit's own current tile.
fn step_is_open(map: &Map, state: &GameState, pos: Position, ignore: Position) -> bool {
    if !map.is_walkable(pos) {
        return false;
    }
    state.unit_at(pos).is_none_or(|u| u.position == ignore)
}

/// Find the shortest walkable, unoccupied path from `start` to `goal`,
/// treating `start` itself as open (the moving unit's own tile). Returns
/// `None` if unreachable, including when `goal` itself is occupied by
/// another live unit. The returned path excludes `start` and includes
/// `goal`.
pub fn find_path(map: &Map, state: &GameState, start: Position, goal: Position) -> Option<Vec<Position>> {
    if start == goal {
        return Some(Vec::new());
    }
    if !step_is_open(map, state, goal, start) {
        return None;
    }

    let mut frontier = BinaryHeap::new();
    frontier.push(Frontier {
        priority: 0,
        position: start,
    });
    let mut came_from: HashMap<Position, Position> = HashMap::new();
    let mut cost_so_far: HashMap<Position, i64> = HashMap::new();
    cost_so_far.insert(start, 0);

    while let Some(Frontier { position: current, .. }) = frontier.pop() {
        if current == goal {
            break;
        }
        for next in current.neighbors() {
            if !step_is_open(map, state, next, start) {
                continue;
            }
            let new_cost = cost_so_far[&current] + 1;
            if cost_so_far.get(&next).is_none_or(|&c| new_cost < c) {
                cost_so_far.insert(next, new_cost);
                let priority = new_cost + next.manhattan_distance(goal) as i64;
                frontier.push(Frontier {
                    priority,
                    position: next,
                });
                came_from.insert(next, current);
            }
        }
    }

    if !came_from.contains_key(&goal) {
        return None;
    }

    let mut path = vec![goal];
    let mut cursor = goal;
    while cursor != start {
        cursor = came_from[&cursor];
        if cursor != start {
            path.push(cursor);
        }
    }
    path.reverse();
    Some(path)
}

/// Every position a unit could end its move on this turn, given the move
/// points it has left. Used to answer "where can I move" queries without
/// re-running `find_path` once per candidate tile.
pub fn reachable_positions(map: &Map, state: &GameState, start: Position, budget: u32) -> Vec<Position> {
    let mut visited: HashMap<Position, u32> = HashMap::new();
    visited.insert(start, 0);
    let mut frontier = vec![start];

    while let Some(current) = frontier.pop() {
        let cost = visited[&current];
        if cost >= budget {
            continue;
        }
        for next in current.neighbors() {
            if !step_is_open(map, state, next, start) {
                continue;
            }
            let next_cost = cost + 1;
            if visited.get(&next).is_none_or(|&c| next_cost < c) {
                visited.insert(next, next_cost);
                frontier.push(next);
            }
        }
    }

    visited.into_keys().filter(|&p| p != start).collect()
}

/// Every tile the unit whose turn it currently is could end a `move` on,
/// given its remaining move budget this turn. Empty if it isn't anyone's
/// turn, or the unit named doesn't exist.
pub fn valid_move_targets(map: &Map, state: &GameState, unit_id: UnitId) -> Vec<Position> {
    let Some(turn) = state.combat.turn_state.as_ref().filter(|t| t.unit_id == unit_id) else {
        return Vec::new();
    };
    let Some(unit) = state.unit(unit_id) else {
        return Vec::new();
    };
    let budget = unit.stats.move_range.saturating_sub(turn.moves_used);
    reachable_positions(map, state, unit.position, budget)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{CombatState, GridSize, Tile, TileKind};

    fn open_map(w: u32, h: u32) -> Map {
        Map {
            id: "t".into(),
            size: GridSize::new(w, h),
            tiles: vec![vec![Tile::new(TileKind::Floor); w as usize]; h as usize],
        }
    }

    fn empty_state(map: Map) -> GameState {
        GameState {
            map,
            units: Vec::new(),
            combat: CombatState::not_started(),
            rng_seed: 1,
            tick: 0,
        }
    }

    #[test]
    fn straight_line_path_has_manhattan_length() {
        let state = empty_state(open_map(10, 10));
        let path = find_path(&state.map, &state, Position::new(0, 0), Position::new(3, 0)).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(*path.last().unwrap(), Position::new(3, 0));
    }

    #[test]
    fn path_to_self_is_empty() {
        let state = empty_state(open_map(5, 5));
        let path = find_path(&state.map, &state, Position::new(1, 1), Position::new(1, 1)).unwrap();
        assert!(path.is_empty());
    }

    #[test]
    fn wall_of_wall_tiles_blocks_path() {
        let mut map = open_map(5, 5);
        for y in 0..5 {
            map.tiles[y][2] = Tile::new(TileKind::Wall);
        }
        let state = empty_state(map);
        assert!(find_path(&state.map, &state, Position::new(0, 0), Position::new(4, 0)).is_none());
    }

    #[test]
    fn path_routes_around_single_obstacle() {
        let mut map = open_map(5, 5);
        map.tiles[0][1] = Tile::new(TileKind::Wall);
        let state = empty_state(map);
        let path = find_path(&state.map, &state, Position::new(0, 0), Position::new(2, 0)).unwrap();
        assert!(path.len() >= 3);
        assert_eq!(*path.last().unwrap(), Position::new(2, 0));
    }

    #[test]
    fn occupied_goal_is_unreachable() {
        let map = open_map(5, 5);
        let mut state = empty_state(map);
        state.units.push(core_types::Unit {
            id: core_types::UnitId::new(),
            unit_type: core_types::UnitType::Monster,
            name: "blocker".into(),
            position: Position::new(2, 0),
            stats: core_types::Stats {
                hp: 1,
                max_hp: 1,
                attack: 0,
                defense: 0,
                attack_range: 1,
                move_range: 1,
                initiative: 1,
            },
            controller_user_id: None,
        });
        let path = find_path(&state.map, &state, Position::new(0, 0), Position::new(2, 0));
        assert!(path.is_none(), "a tile occupied by another live unit is not a valid move destination");
    }

    #[test]
    fn valid_move_targets_empty_when_not_this_units_turn() {
        let state = empty_state(open_map(5, 5));
        assert!(valid_move_targets(&state.map, &state, core_types::UnitId::new()).is_empty());
    }

    #[test]
    fn valid_move_targets_respects_moves_already_used() {
        use core_types::{InitiativeEntry, Stats, TurnState, Unit, UnitType};

        let unit_id = core_types::UnitId::new();
        let mut state = empty_state(open_map(10, 10));
        state.units.push(Unit {
            id: unit_id,
            unit_type: UnitType::Player,
            name: "u".into(),
            position: Position::new(5, 5),
            stats: Stats {
                hp: 10,
                max_hp: 10,
                attack: 1,
                defense: 0,
                attack_range: 1,
                move_range: 3,
                initiative: 1,
            },
            controller_user_id: None,
        });
        let mut turn = TurnState::new(unit_id, 0);
        turn.moves_used = 2;
        state.combat.initiative_order = vec![InitiativeEntry { unit_id, initiative: 1 }];
        state.combat.turn_state = Some(turn);

        let targets = valid_move_targets(&state.map, &state, unit_id);
        assert!(targets.iter().all(|p| p.manhattan_distance(Position::new(5, 5)) <= 1));
        assert!(!targets.is_empty());
    }

    #[test]
    fn reachable_positions_respects_budget() {
        let state = empty_state(open_map(10, 10));
        let reachable = reachable_positions(&state.map, &state, Position::new(5, 5), 2);
        assert!(reachable.iter().all(|p| p.manhattan_distance(Position::new(5, 5)) <= 2));
        assert!(!reachable.contains(&Position::new(5, 5)));
    }
}
