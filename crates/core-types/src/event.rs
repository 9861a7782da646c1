//! The append-only event log: every effect the simulation core produces.
//!
//! Events are the unit of replay. Given the session's initial `GameState`
//! and `rng_seed`, replaying the event log in order reproduces an identical
//! `GameState` — `core_engine` never mutates state except by producing and
//! applying events from this enum.

use serde::{Deserialize, Serialize};

use crate::grid::Position;
use crate::ids::{AbilityId, SessionId, UnitId, UserId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    CombatStarted {
        initiative_order: Vec<UnitId>,
    },
    TurnStarted {
        unit_id: UnitId,
        round: u32,
    },
    TurnEnded {
        unit_id: UnitId,
    },
    UnitMoved {
        unit_id: UnitId,
        from: Position,
        to: Position,
        path: Vec<Position>,
    },
    UnitAttacked {
        unit_id: UnitId,
        target_id: UnitId,
    },
    UnitDamaged {
        unit_id: UnitId,
        amount: u32,
        remaining_hp: u32,
    },
    UnitKilled {
        unit_id: UnitId,
    },
    UnitUsedAbility {
        unit_id: UnitId,
        ability_id: AbilityId,
        target_id: Option<UnitId>,
        target_position: Option<Position>,
    },
    CombatEnded {
        victory: bool,
    },
    PlayerJoined {
        user_id: UserId,
        character_id: Option<UnitId>,
    },
    PlayerLeft {
        user_id: UserId,
    },
    PlayerDisconnected {
        user_id: UserId,
    },
    PlayerReconnected {
        user_id: UserId,
    },
    ChatMessage {
        user_id: UserId,
        text: String,
    },
    DmCommandApplied {
        command: String,
    },
}

/// A logged event: `EventKind` plus the bookkeeping needed for replay and
/// delta-sync ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub session_id: SessionId,
    /// Monotonic per-session sequence number, starting at 1.
    pub seq: u64,
    /// Milliseconds since the Unix epoch, server clock.
    pub ts: i64,
    #[serde(flatten)]
    pub kind: EventKind,
}
