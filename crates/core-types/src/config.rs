//! Per-session configuration, set at `create_game` time and immutable
//! thereafter.

use serde::{Deserialize, Serialize};

use crate::enums::{CharacterClass, Difficulty};

fn default_map_width() -> u32 {
    20
}

fn default_map_height() -> u32 {
    20
}

fn default_max_players() -> u32 {
    4
}

fn default_turn_timer_secs() -> u32 {
    60
}

fn default_reconnect_grace_secs() -> u32 {
    30
}

fn default_dm_reconnect_grace_secs() -> u32 {
    120
}

fn default_monster_count() -> u32 {
    3
}

fn default_player_move_range() -> u32 {
    3
}

fn default_npc_count() -> u32 {
    0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default = "default_map_width")]
    pub map_width: u32,
    #[serde(default = "default_map_height")]
    pub map_height: u32,
    #[serde(default = "default_max_players")]
    pub max_players: u32,
    /// Seconds a unit's turn runs before the coordinator synthesizes an
    /// `end_turn` on its behalf. `0` disables the timer.
    #[serde(default = "default_turn_timer_secs")]
    pub turn_timer_secs: u32,
    /// Seconds a disconnected player keeps their seat before being marked
    /// disconnected permanently (unit reverts to NPC control).
    #[serde(default = "default_reconnect_grace_secs")]
    pub reconnect_grace_secs: u32,
    /// Grace period for the DM specifically; separate because losing the DM
    /// pauses the whole session rather than just benching one unit.
    #[serde(default = "default_dm_reconnect_grace_secs")]
    pub dm_reconnect_grace_secs: u32,
    /// Fixed map RNG seed. `None` means `generateGameState` derives one from
    /// the session id instead of a client-supplied value.
    #[serde(default)]
    pub map_seed: Option<u64>,
    #[serde(default = "default_monster_count")]
    pub monster_count: u32,
    #[serde(default = "default_player_move_range")]
    pub player_move_range: u32,
    /// Whether a player may join a session whose status is already
    /// `playing` rather than only while it's still in `lobby`.
    #[serde(default)]
    pub allow_late_join: bool,
    #[serde(default = "default_npc_count")]
    pub npc_count: u32,
    /// Class for each NPC party member, in spawn order. Extra entries
    /// beyond `npc_count` are ignored; a shortfall cycles back to the
    /// start of the list.
    #[serde(default)]
    pub npc_classes: Vec<CharacterClass>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            map_width: default_map_width(),
            map_height: default_map_height(),
            max_players: default_max_players(),
            turn_timer_secs: default_turn_timer_secs(),
            reconnect_grace_secs: default_reconnect_grace_secs(),
            dm_reconnect_grace_secs: default_dm_reconnect_grace_secs(),
            map_seed: None,
            monster_count: default_monster_count(),
            player_move_range: default_player_move_range(),
            allow_late_join: false,
            npc_count: default_npc_count(),
            npc_classes: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("map_width and map_height must be between 5 and 100, got {0}x{1}")]
    MapSizeOutOfRange(u32, u32),
    #[error("max_players must be between 1 and 8, got {0}")]
    MaxPlayersOutOfRange(u32),
    #[error("turn_timer_secs must be 0 (disabled) or between 10 and 600, got {0}")]
    TurnTimerOutOfRange(u32),
    #[error("player_move_range must be at least 1, got {0}")]
    PlayerMoveRangeOutOfRange(u32),
}

impl SessionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(5..=100).contains(&self.map_width) || !(5..=100).contains(&self.map_height) {
            return Err(ConfigError::MapSizeOutOfRange(self.map_width, self.map_height));
        }
        if !(1..=8).contains(&self.max_players) {
            return Err(ConfigError::MaxPlayersOutOfRange(self.max_players));
        }
        if self.turn_timer_secs != 0 && !(10..=600).contains(&self.turn_timer_secs) {
            return Err(ConfigError::TurnTimerOutOfRange(self.turn_timer_secs));
        }
        if self.player_move_range < 1 {
            return Err(ConfigError::PlayerMoveRangeOutOfRange(self.player_move_range));
        }
        Ok(())
    }
}
