//! Small closed enums shared across the runtime.
//!
//! Each uses `#[serde(rename_all = "snake_case")]` so the wire representation
//! matches the string constants the protocol documents.

use serde::{Deserialize, Serialize};

/// What a unit represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitType {
    Player,
    Monster,
    Npc,
}

impl UnitType {
    /// Whether a unit of `self`'s type is hostile to one of `other`'s type.
    /// Monsters fight players and NPCs; players and NPCs both fight
    /// monsters and are never hostile to each other.
    pub fn is_enemy_of(self, other: UnitType) -> bool {
        match self {
            UnitType::Monster => matches!(other, UnitType::Player | UnitType::Npc),
            UnitType::Player | UnitType::Npc => other == UnitType::Monster,
        }
    }
}

/// Character class — persona field, purely cosmetic/flavor at this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CharacterClass {
    Warrior,
    Ranger,
    Mage,
    Rogue,
}

/// Session difficulty, used by map/monster generation and the reward formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// Multiplier applied to base xp/gold rewards at combat end. Policy,
    /// not an invariant — see `core_engine::rewards`.
    pub fn reward_multiplier(self) -> f64 {
        match self {
            Difficulty::Easy => 0.75,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Normal
    }
}

/// Top-level phase of a session's combat state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CombatPhase {
    NotStarted,
    InProgress,
    Victory,
    Defeat,
}

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Lobby,
    Playing,
    Paused,
    Ended,
}

/// A session player's connection status within the roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlayerConnStatus {
    Connected,
    Disconnected,
    Spectating,
}

/// Why a server-initiated close happened, sent as the close/disconnect reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CloseReason {
    AuthFailed,
    Superseded,
    Timeout,
    Backpressure,
    PayloadTooLarge,
    ServerShutdown,
    ProtocolError,
}
