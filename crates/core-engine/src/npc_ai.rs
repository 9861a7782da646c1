//! Turn policy for monster- and NPC-controlled units.
//!
//! There is no scripted behavior tree: an uncontrolled unit attacks its
//! nearest threat in range if it can, otherwise moves one step toward it,
//! otherwise ends its turn. A monster's threat is the nearest player or NPC;
//! an NPC's threat is the nearest monster — NPCs are party members, not
//! hostiles, and fight on the players' side. This is intentionally simple —
//! see the design notes for why a richer planner was out of scope.

use core_types::{Action, GameState, UnitId};

use crate::{los, pathfinding};

/// Decide the action for `unit_id`'s turn. Always returns a legal `Action`
/// for the unit's current state (an idle unit ends its turn rather than
/// producing an action `action_pipeline` would reject).
pub fn decide_turn(state: &GameState, unit_id: UnitId) -> Action {
    let Some(unit) = state.unit(unit_id) else {
        return Action::EndTurn { unit_id };
    };

    let Some(nearest) = state
        .live_units()
        .filter(|u| unit.unit_type.is_enemy_of(u.unit_type))
        .min_by_key(|u| unit.position.manhattan_distance(u.position))
    else {
        return Action::EndTurn { unit_id };
    };

    let in_range = unit.position.manhattan_distance(nearest.position) <= unit.stats.attack_range;
    if in_range && los::has_line_of_sight(&state.map, unit.position, nearest.position) {
        return Action::Attack {
            unit_id,
            target_id: nearest.id,
        };
    }

    // The target's own tile is occupied and therefore not a valid
    // destination, so path to whichever open tile adjacent to it is
    // shortest to reach instead.
    let approach = nearest
        .position
        .neighbors()
        .into_iter()
        .filter(|&p| state.map.is_walkable(p) && state.unit_at(p).is_none())
        .filter_map(|p| pathfinding::find_path(&state.map, state, unit.position, p).map(|path| (p, path)))
        .min_by_key(|(_, path)| path.len());

    if let Some((_, path)) = approach {
        let budget = unit.stats.move_range as usize;
        let steps = path.len().min(budget);
        if steps > 0 {
            return Action::Move {
                unit_id,
                path: path[..steps].to_vec(),
            };
        }
    }

    Action::EndTurn { unit_id }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{
        CombatState, GridSize, Map, Position, Stats, Tile, TileKind, Unit, UnitId, UnitType,
    };

    fn floor_map(w: u32, h: u32) -> Map {
        Map {
            id: "m".into(),
            size: GridSize::new(w, h),
            tiles: vec![vec![Tile::new(TileKind::Floor); w as usize]; h as usize],
        }
    }

    fn unit(unit_type: UnitType, pos: Position, attack_range: u32, move_range: u32) -> Unit {
        Unit {
            id: UnitId::new(),
            unit_type,
            name: "u".into(),
            position: pos,
            stats: Stats {
                hp: 10,
                max_hp: 10,
                attack: 3,
                defense: 0,
                attack_range,
                move_range,
                initiative: 1,
            },
            controller_user_id: None,
        }
    }

    fn state_with(units: Vec<Unit>) -> GameState {
        GameState {
            map: floor_map(10, 10),
            units,
            combat: CombatState::not_started(),
            rng_seed: 1,
            tick: 0,
        }
    }

    #[test]
    fn attacks_player_in_range_with_sight() {
        let monster = unit(UnitType::Monster, Position::new(1, 0), 2, 3);
        let player = unit(UnitType::Player, Position::new(2, 0), 1, 3);
        let monster_id = monster.id;
        let player_id = player.id;
        let state = state_with(vec![monster, player]);
        let action = decide_turn(&state, monster_id);
        assert_eq!(
            action,
            Action::Attack {
                unit_id: monster_id,
                target_id: player_id
            }
        );
    }

    #[test]
    fn moves_toward_distant_player_when_not_in_range() {
        let monster = unit(UnitType::Monster, Position::new(0, 0), 1, 3);
        let player = unit(UnitType::Player, Position::new(8, 0), 1, 3);
        let monster_id = monster.id;
        let state = state_with(vec![monster, player]);
        match decide_turn(&state, monster_id) {
            Action::Move { unit_id, path } => {
                assert_eq!(unit_id, monster_id);
                assert!(!path.is_empty());
                assert!(path.len() <= 3);
            }
            other => panic!("expected Move, got {other:?}"),
        }
    }

    #[test]
    fn npc_attacks_nearest_monster_not_nearest_player() {
        let npc = unit(UnitType::Npc, Position::new(1, 0), 2, 3);
        let player = unit(UnitType::Player, Position::new(5, 0), 1, 3);
        let monster = unit(UnitType::Monster, Position::new(2, 0), 1, 3);
        let npc_id = npc.id;
        let monster_id = monster.id;
        let state = state_with(vec![npc, player, monster]);
        assert_eq!(
            decide_turn(&state, npc_id),
            Action::Attack { unit_id: npc_id, target_id: monster_id }
        );
    }

    #[test]
    fn ends_turn_with_no_players_left() {
        let monster = unit(UnitType::Monster, Position::new(0, 0), 1, 3);
        let monster_id = monster.id;
        let state = state_with(vec![monster]);
        assert_eq!(decide_turn(&state, monster_id), Action::EndTurn { unit_id: monster_id });
    }
}
