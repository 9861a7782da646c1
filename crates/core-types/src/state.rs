//! `GameState` — the single source of truth for a session's combat
//! simulation.

use serde::{Deserialize, Serialize};

use crate::combat_state::CombatState;
use crate::map::Map;
use crate::unit::Unit;

/// The authoritative combat simulation state for one session.
///
/// `tick` is a monotonic counter incremented by every mutation made through
/// `core_engine`'s `execute_action`; it is never reset once combat starts,
/// and (together with `rng_seed`) lets every deterministic operation derive
/// an RNG stream that is reproducible from an event-log replay.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub map: Map,
    pub units: Vec<Unit>,
    pub combat: CombatState,
    pub rng_seed: u64,
    pub tick: u64,
}

impl GameState {
    pub fn unit(&self, id: crate::ids::UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub fn unit_mut(&mut self, id: crate::ids::UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub fn live_units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter().filter(|u| u.is_alive())
    }

    /// No two live units ever share a position, so this returns at most one.
    pub fn unit_at(&self, pos: crate::grid::Position) -> Option<&Unit> {
        self.live_units().find(|u| u.position == pos)
    }
}
