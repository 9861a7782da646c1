//! Ability execution — applies a catalog `Ability`'s effect to the game
//! state and produces the resulting event.

use core_data::abilities::{AbilityEffect, AbilityRegistry};
use core_types::{AbilityId, EventKind, GameState, UnitId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbilityError {
    UnknownAbility,
    TargetRequired,
    TargetNotFound,
}

/// Apply `ability_id` (cast by `caster_id` against `target_id`, or the
/// caster itself for self-targeted abilities) and return the event
/// describing what happened. Range/line-of-sight/turn checks happen in
/// `action_pipeline` before this runs — this function only applies the
/// effect.
pub fn execute_ability(
    state: &mut GameState,
    registry: &AbilityRegistry,
    caster_id: UnitId,
    ability_id: &AbilityId,
    target_id: Option<UnitId>,
) -> Result<EventKind, AbilityError> {
    let ability = registry.get(ability_id).ok_or(AbilityError::UnknownAbility)?;

    let resolved_target = target_id.unwrap_or(caster_id);
    let target = state.unit_mut(resolved_target).ok_or(AbilityError::TargetNotFound)?;

    match ability.effect {
        AbilityEffect::Damage(amount) => target.stats.apply_damage(amount),
        AbilityEffect::Heal(amount) => target.stats.apply_heal(amount),
    }

    Ok(EventKind::UnitUsedAbility {
        unit_id: caster_id,
        ability_id: ability_id.clone(),
        target_id,
        target_position: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{CombatState, GridSize, Map, Position, Stats, Tile, TileKind, Unit, UnitType};

    fn state_with_units(units: Vec<Unit>) -> GameState {
        GameState {
            map: Map {
                id: "m".into(),
                size: GridSize::new(5, 5),
                tiles: vec![vec![Tile::new(TileKind::Floor); 5]; 5],
            },
            units,
            combat: CombatState::not_started(),
            rng_seed: 1,
            tick: 0,
        }
    }

    fn unit(hp: u32) -> Unit {
        Unit {
            id: core_types::UnitId::new(),
            unit_type: UnitType::Player,
            name: "u".into(),
            position: Position::new(0, 0),
            stats: Stats {
                hp,
                max_hp: 50,
                attack: 1,
                defense: 0,
                attack_range: 1,
                move_range: 1,
                initiative: 1,
            },
            controller_user_id: None,
        }
    }

    #[test]
    fn heal_ability_restores_hp() {
        let registry = AbilityRegistry::seed();
        let target = unit(10);
        let target_id = target.id;
        let mut state = state_with_units(vec![target]);
        execute_ability(&mut state, &registry, target_id, &AbilityId::from("heal"), Some(target_id)).unwrap();
        assert!(state.unit(target_id).unwrap().stats.hp > 10);
    }

    #[test]
    fn damage_ability_reduces_hp() {
        let registry = AbilityRegistry::seed();
        let caster = unit(20);
        let caster_id = caster.id;
        let target = unit(20);
        let target_id = target.id;
        let mut state = state_with_units(vec![caster, target]);
        execute_ability(
            &mut state,
            &registry,
            caster_id,
            &AbilityId::from("power_strike"),
            Some(target_id),
        )
        .unwrap();
        assert!(state.unit(target_id).unwrap().stats.hp < 20);
    }

    #[test]
    fn unknown_ability_is_rejected() {
        let registry = AbilityRegistry::seed();
        let caster = unit(20);
        let caster_id = caster.id;
        let mut state = state_with_units(vec![caster]);
        let result = execute_ability(&mut state, &registry, caster_id, &AbilityId::from("nope"), None);
        assert_eq!(result, Err(AbilityError::UnknownAbility));
    }

    #[test]
    fn self_targeted_ability_defaults_target_to_caster() {
        let registry = AbilityRegistry::seed();
        let caster = unit(10);
        let caster_id = caster.id;
        let mut state = state_with_units(vec![caster]);
        execute_ability(&mut state, &registry, caster_id, &AbilityId::from("rally"), None).unwrap();
        assert!(state.unit(caster_id).unwrap().stats.hp > 10);
    }
}
