//! Units and their combat stats.

use serde::{Deserialize, Serialize};

use crate::enums::UnitType;
use crate::grid::Position;
use crate::ids::{UnitId, UserId};

/// Combat stats for a unit. Invariants (enforced by the simulation core, not
/// by this type): `0 <= hp <= max_hp`; `attack`/`defense` are non-negative by
/// construction (`u32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub hp: u32,
    pub max_hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub attack_range: u32,
    pub move_range: u32,
    pub initiative: i32,
}

impl Stats {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    /// Apply damage, clamped so `hp` never underflows below zero.
    pub fn apply_damage(&mut self, amount: u32) {
        self.hp = self.hp.saturating_sub(amount);
    }

    /// Heal, clamped so `hp` never exceeds `max_hp`.
    pub fn apply_heal(&mut self, amount: u32) {
        self.hp = (self.hp + amount).min(self.max_hp);
    }
}

/// A unit on the combat map — a player's avatar, a monster, or an NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub unit_type: UnitType,
    pub name: String,
    pub position: Position,
    pub stats: Stats,
    /// Set for player units once a `SessionPlayer` claims them; `None` for
    /// monsters and for NPCs with no current controller.
    pub controller_user_id: Option<UserId>,
}

impl Unit {
    pub fn is_alive(&self) -> bool {
        self.stats.is_alive()
    }
}
