//! Turn and round advancement.

use core_types::{CombatPhase, GameState, TurnState};

/// Advance to the next unit in initiative order, wrapping to a new round
/// when the order is exhausted. Dead units are skipped without consuming a
/// round boundary of their own.
pub fn advance_turn(state: &mut GameState) {
    if state.combat.phase != CombatPhase::InProgress {
        return;
    }
    let order = state.combat.initiative_order.clone();
    if order.is_empty() {
        state.combat.turn_state = None;
        return;
    }

    let current_idx = state
        .combat
        .turn_state
        .as_ref()
        .and_then(|t| order.iter().position(|e| e.unit_id == t.unit_id));

    let start = current_idx.map(|i| (i + 1) % order.len()).unwrap_or(0);
    let mut idx = start;
    loop {
        let candidate = order[idx].unit_id;
        if state.unit(candidate).is_some_and(|u| u.is_alive()) {
            if idx <= current_idx.unwrap_or(usize::MAX) {
                state.combat.round += 1;
            }
            state.combat.turn_state = Some(TurnState::new(candidate, state.tick));
            return;
        }
        idx = (idx + 1) % order.len();
        if idx == start {
            // every unit in the order is dead; win-condition check elsewhere
            // will have already ended combat by the time this matters.
            state.combat.turn_state = None;
            return;
        }
    }
}
