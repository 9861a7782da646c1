//! Line of sight — symmetric Bresenham raycasting over the combat map.

use core_types::{GameState, Map, Position, UnitId};

/// The integer points of a Bresenham line from `from` to `to`, inclusive of
/// both endpoints. Deterministic and symmetric: the point set for
/// `line(a, b)` equals that of `line(b, a)`.
fn line(from: Position, to: Position) -> Vec<Position> {
    let mut points = Vec::new();
    let (mut x0, mut y0) = (from.x, from.y);
    let (x1, y1) = (to.x, to.y);

    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        points.push(Position::new(x0, y0));
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
    points
}

/// Whether `to` is visible from `from`: no tile strictly between the two
/// endpoints blocks sight. The endpoints themselves never block — a unit can
/// always see the tile it stands on and the tile it's looking at.
pub fn has_line_of_sight(map: &Map, from: Position, to: Position) -> bool {
    let points = line(from, to);
    points[1..points.len().saturating_sub(1)]
        .iter()
        .all(|&p| !map.blocks_sight(p))
}

/// Every live enemy of `unit_id` within its `attack_range` (Manhattan) with
/// line of sight, per `getValidAttackTargets`. Empty if the unit doesn't
/// exist, is dead, or has already acted this turn — a unit that has acted
/// has nothing left to target.
pub fn valid_attack_targets(map: &Map, state: &GameState, unit_id: UnitId) -> Vec<UnitId> {
    let Some(unit) = state.unit(unit_id) else {
        return Vec::new();
    };
    let has_acted = state
        .combat
        .turn_state
        .as_ref()
        .is_some_and(|turn| turn.unit_id == unit_id && turn.has_acted);
    if has_acted {
        return Vec::new();
    }

    state
        .live_units()
        .filter(|u| u.id != unit_id)
        .filter(|u| unit.unit_type.is_enemy_of(u.unit_type))
        .filter(|u| unit.position.manhattan_distance(u.position) <= unit.stats.attack_range)
        .filter(|u| has_line_of_sight(map, unit.position, u.position))
        .map(|u| u.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{CombatState, GridSize, Stats, Tile, TileKind, Unit, UnitId, UnitType};
    use proptest::prelude::*;

    fn open_map(w: u32, h: u32) -> Map {
        Map {
            id: "t".into(),
            size: GridSize::new(w, h),
            tiles: vec![vec![Tile::new(TileKind::Floor); w as usize]; h as usize],
        }
    }

    #[test]
    fn clear_line_has_sight() {
        let map = open_map(10, 10);
        assert!(has_line_of_sight(&map, Position::new(0, 0), Position::new(5, 5)));
    }

    #[test]
    fn wall_between_blocks_sight() {
        let mut map = open_map(5, 5);
        map.tiles[0][2] = Tile::new(TileKind::Wall);
        assert!(!has_line_of_sight(&map, Position::new(0, 0), Position::new(4, 0)));
    }

    #[test]
    fn sight_is_symmetric() {
        let mut map = open_map(6, 6);
        map.tiles[2][3] = Tile::new(TileKind::Wall);
        let a = Position::new(0, 2);
        let b = Position::new(5, 2);
        assert_eq!(has_line_of_sight(&map, a, b), has_line_of_sight(&map, b, a));
    }

    #[test]
    fn standing_on_a_wall_tile_does_not_block_seeing_out() {
        let map = open_map(5, 5);
        assert!(has_line_of_sight(&map, Position::new(0, 0), Position::new(0, 0)));
    }

    fn unit_at(unit_type: UnitType, pos: Position, attack_range: u32) -> Unit {
        Unit {
            id: UnitId::new(),
            unit_type,
            name: "u".into(),
            position: pos,
            stats: Stats {
                hp: 1,
                max_hp: 1,
                attack: 1,
                defense: 0,
                attack_range,
                move_range: 1,
                initiative: 1,
            },
            controller_user_id: None,
        }
    }

    #[test]
    fn valid_attack_targets_respects_range_sight_and_enemy_side() {
        let map = open_map(10, 10);
        let attacker = unit_at(UnitType::Player, Position::new(0, 0), 3);
        let near_enemy = unit_at(UnitType::Monster, Position::new(1, 0), 1);
        let far_enemy = unit_at(UnitType::Monster, Position::new(9, 0), 1);
        let near_ally = unit_at(UnitType::Npc, Position::new(0, 1), 1);
        let attacker_id = attacker.id;
        let near_enemy_id = near_enemy.id;
        let far_enemy_id = far_enemy.id;
        let near_ally_id = near_ally.id;
        let state = GameState {
            map: map.clone(),
            units: vec![attacker, near_enemy, far_enemy, near_ally],
            combat: CombatState::not_started(),
            rng_seed: 1,
            tick: 0,
        };
        let targets = valid_attack_targets(&map, &state, attacker_id);
        assert!(targets.contains(&near_enemy_id));
        assert!(!targets.contains(&far_enemy_id));
        assert!(!targets.contains(&near_ally_id));
    }

    #[test]
    fn valid_attack_targets_empty_once_unit_has_acted() {
        let map = open_map(10, 10);
        let attacker = unit_at(UnitType::Player, Position::new(0, 0), 3);
        let enemy = unit_at(UnitType::Monster, Position::new(1, 0), 1);
        let attacker_id = attacker.id;
        let mut combat = CombatState::not_started();
        combat.phase = core_types::CombatPhase::InProgress;
        combat.turn_state = Some(core_types::TurnState {
            unit_id: attacker_id,
            moves_used: 0,
            has_acted: true,
            started_at_tick: 0,
        });
        let state = GameState {
            map: map.clone(),
            units: vec![attacker, enemy],
            combat,
            rng_seed: 1,
            tick: 0,
        };
        assert!(valid_attack_targets(&map, &state, attacker_id).is_empty());
    }

    proptest::proptest! {
        #[test]
        fn sight_is_symmetric_for_any_two_points_and_one_wall(
            ax in 0i32..20, ay in 0i32..20, bx in 0i32..20, by in 0i32..20,
            wx in 0usize..20, wy in 0usize..20,
        ) {
            let mut map = open_map(20, 20);
            map.tiles[wy][wx] = Tile::new(TileKind::Wall);
            let a = Position::new(ax, ay);
            let b = Position::new(bx, by);
            prop_assert_eq!(has_line_of_sight(&map, a, b), has_line_of_sight(&map, b, a));
        }
    }
}
