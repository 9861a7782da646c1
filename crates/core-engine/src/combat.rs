//! Combat lifecycle: rolling initiative to start a fight, and deciding when
//! it's over.

use core_types::{CombatPhase, CombatState, GameState, InitiativeEntry, SimRng, TurnState, UnitType};

/// Roll initiative for every live unit and enter `InProgress`. The RNG
/// stream is derived from `(rng_seed, tick)` so re-running combat start from
/// an identical prior state always produces the same order.
pub fn start_combat(state: &mut GameState) {
    let mut rng = SimRng::derive(state.rng_seed, state.tick);
    let entries: Vec<InitiativeEntry> = state
        .live_units()
        .map(|u| InitiativeEntry {
            unit_id: u.id,
            initiative: u.stats.initiative + rng.roll(1, 20) as i32,
        })
        .collect();
    let order = core_types::combat_state::sort_initiative(entries);
    let first = order.first().map(|e| e.unit_id);

    state.combat = CombatState {
        phase: CombatPhase::InProgress,
        round: 1,
        initiative_order: order,
        turn_state: first.map(|id| TurnState::new(id, state.tick)),
    };
}

/// `Victory` once every monster is dead; `Defeat` once every player unit is
/// dead. A session with no monsters never auto-resolves to victory — that
/// would make an empty combat a win, which isn't a state the simulation core
/// produces on its own.
pub fn check_win_condition(state: &GameState) -> Option<CombatPhase> {
    let players_alive = state.live_units().any(|u| u.unit_type == UnitType::Player);
    let hostiles_alive = state.live_units().any(|u| u.unit_type == UnitType::Monster);

    if !players_alive {
        return Some(CombatPhase::Defeat);
    }
    if !hostiles_alive && state.units.iter().any(|u| u.unit_type == UnitType::Monster) {
        return Some(CombatPhase::Victory);
    }
    None
}
