//! Turns an inbound `Action`/DM command into validated state mutations plus
//! the events to broadcast and persist.

use core_data::abilities::AbilityRegistry;
use core_types::{Action, ActionRejection, EventKind, GameState, UserId};

/// Confirms the submitting user actually controls the unit the action
/// names, then runs it through `core_engine`'s validate/execute pipeline.
/// A spoofed `unit_id` for someone else's unit is rejected before it ever
/// reaches the simulation core.
pub fn submit_action(
    state: &mut GameState,
    registry: &AbilityRegistry,
    user_id: UserId,
    action: Action,
) -> Result<Vec<EventKind>, ActionRejection> {
    let unit = state.unit(action.unit_id()).ok_or(ActionRejection::UnitNotFound)?;
    if unit.controller_user_id != Some(user_id) {
        return Err(ActionRejection::NotYourUnit);
    }
    core_engine::action_pipeline::validate_action(state, registry, &action)?;
    Ok(core_engine::action_pipeline::execute_action(state, registry, &action))
}

/// DM-only out-of-band control. The parser here is intentionally small —
/// only what the roster screen exposes today — and logged verbatim as a
/// `DmCommandApplied` event regardless of whether it mutated anything, so
/// the session transcript always shows what the DM typed.
pub fn apply_dm_command(state: &mut GameState, command: &str) -> EventKind {
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some("kill"), Some(unit_id), None) => {
            if let Ok(id) = unit_id.parse::<core_types::UnitId>() {
                if let Some(unit) = state.unit_mut(id) {
                    unit.stats.hp = 0;
                }
            }
        }
        (Some("heal"), Some(unit_id), Some(amount)) => {
            if let (Ok(id), Ok(amount)) = (unit_id.parse::<core_types::UnitId>(), amount.parse::<u32>()) {
                if let Some(unit) = state.unit_mut(id) {
                    unit.stats.hp = (unit.stats.hp + amount).min(unit.stats.max_hp);
                }
            }
        }
        _ => {}
    }
    EventKind::DmCommandApplied {
        command: command.to_string(),
    }
}
