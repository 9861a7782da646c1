//! Game setup — initial `GameState` construction for a newly started session.

use core_types::{
    CharacterClass, CombatState, GameState, Map, Position, SessionConfig, Stats, Unit, UnitId,
    UnitType, UserId,
};

use crate::error::SimError;
use crate::mapgen::generate_map;

/// One player seat's character, supplied by the coordinator when the DM
/// starts the game.
#[derive(Debug, Clone)]
pub struct PlayerSeat {
    pub user_id: UserId,
    pub class: CharacterClass,
    pub name: String,
}

/// Build the initial state for a session: generate the map, place each
/// player's unit, a monster roster sized by `config.monster_count`, and an
/// NPC party sized by `config.npc_count`, and leave combat in `NotStarted`
/// (the coordinator calls `combat::start_combat` once players are done
/// positioning, or immediately for a dungeon-crawl start — this function
/// only lays out the board). `seed` is the fallback map seed used when
/// `config.map_seed` wasn't client-supplied.
pub fn generate_game_state(
    config: &SessionConfig,
    seed: u64,
    players: &[PlayerSeat],
) -> Result<GameState, SimError> {
    let seed = config.map_seed.unwrap_or(seed);
    let map = generate_map(seed, config.map_width, config.map_height);

    let required = players.len() + config.npc_count as usize + config.monster_count as usize;
    let available = count_open_tiles(&map);
    if available < required {
        return Err(SimError::NotEnoughSpawnPoints {
            width: config.map_width,
            height: config.map_height,
            required,
            available,
        });
    }

    let mut units = Vec::new();

    let spawn_points = find_spawn_points(&map, players.len());
    for (seat, pos) in players.iter().zip(spawn_points) {
        let mut stats = core_data::starting_stats(seat.class);
        stats.move_range = config.player_move_range;
        units.push(Unit {
            id: UnitId::new(),
            unit_type: UnitType::Player,
            name: seat.name.clone(),
            position: pos,
            stats,
            controller_user_id: Some(seat.user_id),
        });
    }

    let npc_spawns = find_spawn_points_excluding(&map, config.npc_count as usize, &units);
    for (i, pos) in npc_spawns.into_iter().enumerate() {
        let class = npc_class_for(config, i);
        units.push(Unit {
            id: UnitId::new(),
            unit_type: UnitType::Npc,
            name: format!("{class:?}-{i}"),
            position: pos,
            stats: core_data::starting_stats(class),
            controller_user_id: None,
        });
    }

    let monster_spawns = find_spawn_points_excluding(&map, config.monster_count as usize, &units);
    for (i, pos) in monster_spawns.into_iter().enumerate() {
        units.push(Unit {
            id: UnitId::new(),
            unit_type: UnitType::Monster,
            name: format!("monster-{i}"),
            position: pos,
            stats: monster_stats(config),
            controller_user_id: None,
        });
    }

    Ok(GameState {
        map,
        units,
        combat: CombatState::not_started(),
        rng_seed: seed,
        tick: 0,
    })
}

fn count_open_tiles(map: &Map) -> usize {
    (0..map.size.height as i32)
        .flat_map(|y| (0..map.size.width as i32).map(move |x| Position::new(x, y)))
        .filter(|&pos| map.is_walkable(pos))
        .count()
}

/// The class for the `index`-th NPC party member, cycling through
/// `config.npc_classes` and falling back to `Warrior` if the list is empty.
fn npc_class_for(config: &SessionConfig, index: usize) -> CharacterClass {
    if config.npc_classes.is_empty() {
        CharacterClass::Warrior
    } else {
        config.npc_classes[index % config.npc_classes.len()]
    }
}

fn monster_stats(config: &SessionConfig) -> Stats {
    let scale = config.difficulty.reward_multiplier();
    Stats {
        hp: (18.0 * scale) as u32,
        max_hp: (18.0 * scale) as u32,
        attack: (5.0 * scale) as u32,
        defense: 1,
        attack_range: 1,
        move_range: 3,
        initiative: 4,
    }
}

/// Pick the first `count` walkable, empty floor tiles scanning row-major
/// from the top-left. Simple and fully deterministic given a fixed map.
fn find_spawn_points(map: &Map, count: usize) -> Vec<Position> {
    find_spawn_points_excluding(map, count, &[])
}

fn find_spawn_points_excluding(map: &Map, count: usize, occupied: &[Unit]) -> Vec<Position> {
    let mut found = Vec::new();
    for y in 0..map.size.height as i32 {
        for x in 0..map.size.width as i32 {
            if found.len() >= count {
                return found;
            }
            let pos = Position::new(x, y);
            if map.is_walkable(pos) && !occupied.iter().any(|u| u.position == pos) {
                found.push(pos);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use core_types::SessionConfig;

    fn seat(class: CharacterClass) -> PlayerSeat {
        PlayerSeat {
            user_id: UserId::new(),
            class,
            name: "hero".into(),
        }
    }

    #[test]
    fn spawns_one_unit_per_player() {
        let config = SessionConfig::default();
        let players = vec![seat(CharacterClass::Warrior), seat(CharacterClass::Mage)];
        let state = generate_game_state(&config, 1, &players).unwrap();
        let player_units = state.units.iter().filter(|u| u.unit_type == UnitType::Player).count();
        assert_eq!(player_units, 2);
    }

    #[test]
    fn no_two_units_share_a_spawn_position() {
        let config = SessionConfig::default();
        let players = vec![
            seat(CharacterClass::Warrior),
            seat(CharacterClass::Mage),
            seat(CharacterClass::Ranger),
        ];
        let state = generate_game_state(&config, 5, &players).unwrap();
        let mut positions: Vec<Position> = state.units.iter().map(|u| u.position).collect();
        let before = positions.len();
        positions.sort_by_key(|p| (p.x, p.y));
        positions.dedup();
        assert_eq!(positions.len(), before);
    }

    #[test]
    fn monster_count_is_config_driven() {
        let mut config = SessionConfig::default();
        let players = vec![seat(CharacterClass::Warrior)];

        config.monster_count = 1;
        let few = generate_game_state(&config, 9, &players).unwrap();

        config.monster_count = 5;
        let many = generate_game_state(&config, 9, &players).unwrap();

        let count = |s: &GameState| s.units.iter().filter(|u| u.unit_type == UnitType::Monster).count();
        assert_eq!(count(&few), 1);
        assert_eq!(count(&many), 5);
    }

    #[test]
    fn harder_difficulty_yields_tougher_monsters_at_the_same_count() {
        let mut config = SessionConfig::default();
        let players = vec![seat(CharacterClass::Warrior)];

        config.difficulty = core_types::Difficulty::Easy;
        let easy = generate_game_state(&config, 9, &players).unwrap();

        config.difficulty = core_types::Difficulty::Hard;
        let hard = generate_game_state(&config, 9, &players).unwrap();

        let monster_hp = |s: &GameState| {
            s.units.iter().find(|u| u.unit_type == UnitType::Monster).unwrap().stats.max_hp
        };
        assert!(monster_hp(&hard) > monster_hp(&easy));
    }

    #[test]
    fn npc_count_spawns_npc_units() {
        let mut config = SessionConfig::default();
        config.npc_count = 2;
        config.npc_classes = vec![CharacterClass::Mage, CharacterClass::Ranger];
        let players = vec![seat(CharacterClass::Warrior)];
        let state = generate_game_state(&config, 9, &players).unwrap();
        let npcs: Vec<_> = state.units.iter().filter(|u| u.unit_type == UnitType::Npc).collect();
        assert_eq!(npcs.len(), 2);
        assert!(npcs.iter().all(|u| u.controller_user_id.is_none()));
    }

    #[test]
    fn player_move_range_overrides_class_default() {
        let mut config = SessionConfig::default();
        config.player_move_range = 9;
        let players = vec![seat(CharacterClass::Warrior)];
        let state = generate_game_state(&config, 9, &players).unwrap();
        let player = state.units.iter().find(|u| u.unit_type == UnitType::Player).unwrap();
        assert_eq!(player.stats.move_range, 9);
    }

    #[test]
    fn too_many_units_for_the_map_is_a_sim_error() {
        let mut config = SessionConfig::default();
        config.map_width = 5;
        config.map_height = 5;
        config.monster_count = 100;
        let players = vec![seat(CharacterClass::Warrior)];
        let err = generate_game_state(&config, 9, &players).unwrap_err();
        assert!(matches!(err, SimError::NotEnoughSpawnPoints { .. }));
    }

    #[test]
    fn same_seed_and_config_is_deterministic() {
        let config = SessionConfig::default();
        let players = vec![seat(CharacterClass::Rogue)];
        let a = generate_game_state(&config, 123, &players).unwrap();
        let b = generate_game_state(&config, 123, &players).unwrap();
        assert_eq!(a.map, b.map);
        assert_eq!(
            a.units.iter().map(|u| u.position).collect::<Vec<_>>(),
            b.units.iter().map(|u| u.position).collect::<Vec<_>>()
        );
    }

    proptest::proptest! {
        #[test]
        fn no_two_units_ever_share_a_spawn_for_any_seed_and_counts(
            seed: u64, player_count in 1usize..4, monster_count in 0u32..8, npc_count in 0u32..4,
        ) {
            let mut config = SessionConfig::default();
            config.monster_count = monster_count;
            config.npc_count = npc_count;
            let players: Vec<PlayerSeat> = (0..player_count).map(|_| seat(CharacterClass::Warrior)).collect();
            let state = generate_game_state(&config, seed, &players).unwrap();

            let mut positions: Vec<Position> = state.units.iter().map(|u| u.position).collect();
            let before = positions.len();
            positions.sort_by_key(|p| (p.x, p.y));
            positions.dedup();
            prop_assert_eq!(positions.len(), before);
        }
    }
}
