//! Persisted record shapes. Plain serde structs — the store crate owns no
//! simulation logic, only where these records live and how they're versioned.

use serde::{Deserialize, Serialize};

use core_types::{
    CharacterClass, CharacterId, GameState, PlayerConnStatus, SessionConfig, SessionId,
    SessionStatus, UnitId, UserId,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub display_name: String,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub owner_user_id: UserId,
    pub class: CharacterClass,
    pub name: String,
    #[serde(default)]
    pub appearance: String,
    #[serde(default)]
    pub backstory: Option<String>,
    /// Accumulated across every session this character has completed.
    pub total_xp: u32,
    #[serde(default)]
    pub gold: u32,
    #[serde(default)]
    pub silver: u32,
    #[serde(default)]
    pub inventory: Vec<String>,
}

impl Character {
    /// Derived from `total_xp`, never stored independently — `level 1` at
    /// zero xp, one level per 1000 xp banked.
    pub fn level(&self) -> u32 {
        self.total_xp / 1000 + 1
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionPlayer {
    pub user_id: UserId,
    pub character_id: Option<CharacterId>,
    /// Set once `generate_game_state` places this player's unit on the map.
    pub unit_id: Option<UnitId>,
    pub conn_status: PlayerConnStatus,
    pub is_dm: bool,
    pub ready: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: SessionId,
    pub join_code: String,
    pub status: SessionStatus,
    pub config: SessionConfig,
    pub state: GameState,
    /// Monotonic counter bumped on every persisted state mutation; the
    /// optimistic-concurrency token for `SessionStore::update_game_state`.
    pub state_version: u64,
    pub players: Vec<SessionPlayer>,
    pub dm_user_id: UserId,
    pub created_at_ms: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardLine {
    pub user_id: UserId,
    pub xp_awarded: u32,
    pub gold_awarded: u32,
}

/// Written once a session ends (victory or defeat); the live `SessionRecord`
/// is removed once archived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionArchive {
    pub session_id: SessionId,
    pub ended_at_ms: i64,
    pub victory: bool,
    pub rewards: Vec<RewardLine>,
}
