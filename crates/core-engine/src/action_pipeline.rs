//! The single entry point for turning a submitted `Action` into state
//! mutations and events: `validate_action` then `execute_action`.
//!
//! Callers (the session coordinator) always validate before executing;
//! `execute_action` trusts its caller and panics on a precondition it
//! should never see, rather than silently no-opping.

use core_data::abilities::AbilityRegistry;
use core_types::{Action, ActionRejection, CombatPhase, EventKind, GameState, SimRng};

use crate::{abilities, combat, end_turn, los, pathfinding};

/// Validate `action` against `state` without mutating anything. Checks run
/// in a fixed order so the first applicable rejection is always returned,
/// matching what the protocol's `action_rejected` push documents.
pub fn validate_action(state: &GameState, registry: &AbilityRegistry, action: &Action) -> Result<(), ActionRejection> {
    if state.combat.phase != CombatPhase::InProgress {
        return Err(ActionRejection::NotInProgress);
    }
    let turn = state.combat.turn_state.as_ref().ok_or(ActionRejection::NotInProgress)?;
    if turn.unit_id != action.unit_id() {
        return Err(ActionRejection::NotYourTurn);
    }
    let unit = state.unit(action.unit_id()).ok_or(ActionRejection::UnitNotFound)?;
    if !unit.is_alive() {
        return Err(ActionRejection::UnitNotFound);
    }

    match action {
        Action::EndTurn { .. } => Ok(()),

        Action::Move { path, .. } => {
            if turn.has_acted {
                return Err(ActionRejection::AlreadyActed);
            }
            if path.is_empty() {
                return Err(ActionRejection::InvalidPath);
            }
            let mut cursor = unit.position;
            for &step in path {
                if !cursor.is_adjacent(step) {
                    return Err(ActionRejection::InvalidPath);
                }
                if !state.map.is_walkable(step) {
                    return Err(ActionRejection::BlockedTile);
                }
                if state.unit_at(step).is_some_and(|occupant| occupant.position != unit.position) {
                    return Err(ActionRejection::BlockedTile);
                }
                cursor = step;
            }
            let remaining = unit.stats.move_range.saturating_sub(turn.moves_used);
            if path.len() as u32 > remaining {
                return Err(ActionRejection::InsufficientMoves);
            }
            Ok(())
        }

        Action::Attack { target_id, .. } => {
            if turn.has_acted {
                return Err(ActionRejection::AlreadyActed);
            }
            let target = state.unit(*target_id).ok_or(ActionRejection::TargetNotFound)?;
            if !target.is_alive() {
                return Err(ActionRejection::TargetDead);
            }
            let distance = unit.position.manhattan_distance(target.position);
            if distance > unit.stats.attack_range {
                return Err(ActionRejection::OutOfRange);
            }
            if !los::has_line_of_sight(&state.map, unit.position, target.position) {
                return Err(ActionRejection::NoLineOfSight);
            }
            Ok(())
        }

        Action::UseAbility {
            ability_id,
            target_id,
            ..
        } => {
            if turn.has_acted {
                return Err(ActionRejection::AlreadyActed);
            }
            let ability = registry.get(ability_id).ok_or(ActionRejection::UnknownAbility)?;
            let resolved_target_id = target_id.unwrap_or(unit.id);
            let target = state.unit(resolved_target_id).ok_or(ActionRejection::TargetNotFound)?;
            if !target.is_alive() {
                return Err(ActionRejection::TargetDead);
            }
            let distance = unit.position.manhattan_distance(target.position);
            if distance > ability.range {
                return Err(ActionRejection::OutOfRange);
            }
            if ability.range > 0 && !los::has_line_of_sight(&state.map, unit.position, target.position) {
                return Err(ActionRejection::NoLineOfSight);
            }
            Ok(())
        }
    }
}

/// Apply an already-validated action, returning the events it produced in
/// order (a `Move` yields one `UnitMoved`; an `Attack` that kills its target
/// yields both `UnitDamaged` and `UnitKilled`; combat ending appends
/// `CombatEnded`). Callers append these to the session's event log in order.
pub fn execute_action(state: &mut GameState, registry: &AbilityRegistry, action: &Action) -> Vec<EventKind> {
    tracing::debug!(unit_id = %action.unit_id(), tick = state.tick, "executing action");
    let mut events = Vec::new();
    state.tick += 1;

    match action {
        Action::Move { unit_id, path } => {
            let from = state.unit(*unit_id).expect("validated").position;
            let to = *path.last().expect("validated non-empty path");
            {
                let unit = state.unit_mut(*unit_id).expect("validated");
                unit.position = to;
            }
            if let Some(turn) = state.combat.turn_state.as_mut() {
                turn.moves_used += path.len() as u32;
            }
            events.push(EventKind::UnitMoved {
                unit_id: *unit_id,
                from,
                to,
                path: path.clone(),
            });
        }

        Action::Attack { unit_id, target_id } => {
            let attack = state.unit(*unit_id).expect("validated").stats.attack;
            let defense = state.unit(*target_id).expect("validated").stats.defense;
            let mut rng = SimRng::derive(state.rng_seed, state.tick);
            let damage = ((attack + rng.roll(1, 6)) as i64 - defense as i64).max(1) as u32;
            let target = state.unit_mut(*target_id).expect("validated");
            target.stats.apply_damage(damage);
            let remaining_hp = target.stats.hp;
            let killed = !target.is_alive();

            events.push(EventKind::UnitAttacked {
                unit_id: *unit_id,
                target_id: *target_id,
            });
            events.push(EventKind::UnitDamaged {
                unit_id: *target_id,
                amount: damage,
                remaining_hp,
            });
            if killed {
                events.push(EventKind::UnitKilled { unit_id: *target_id });
            }
            mark_acted(state);
        }

        Action::UseAbility {
            unit_id,
            ability_id,
            target_id,
            ..
        } => {
            let event = abilities::execute_ability(state, registry, *unit_id, ability_id, *target_id)
                .expect("validated");
            events.push(event);
            mark_acted(state);
        }

        Action::EndTurn { .. } => {}
    }

    if let Some(phase) = combat::check_win_condition(state) {
        state.combat.phase = phase;
        events.push(EventKind::CombatEnded {
            victory: phase == CombatPhase::Victory,
        });
    } else if matches!(action, Action::EndTurn { .. }) || ends_turn_after_action(&events) {
        let ending_unit = action.unit_id();
        end_turn::advance_turn(state);
        events.push(EventKind::TurnEnded { unit_id: ending_unit });
        if let Some(turn) = &state.combat.turn_state {
            events.push(EventKind::TurnStarted {
                unit_id: turn.unit_id,
                round: state.combat.round,
            });
        }
    }

    events
}

fn mark_acted(state: &mut GameState) {
    if let Some(turn) = state.combat.turn_state.as_mut() {
        turn.has_acted = true;
    }
}

/// Attacks and ability uses end the turn immediately in this ruleset — a
/// unit gets one offensive action per turn, plus however much movement its
/// move budget allows before or after it.
fn ends_turn_after_action(events: &[EventKind]) -> bool {
    events
        .iter()
        .any(|e| matches!(e, EventKind::UnitAttacked { .. } | EventKind::UnitUsedAbility { .. }))
}
