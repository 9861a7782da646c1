//! The simulation core: map generation, pathfinding, line of sight,
//! combat lifecycle, turn advancement, NPC policy, and the
//! validate/execute action pipeline. No network or storage code lives here
//! — this crate is pure, deterministic game logic.

pub mod abilities;
pub mod action_pipeline;
pub mod combat;
pub mod end_turn;
pub mod error;
pub mod los;
pub mod mapgen;
pub mod npc_ai;
pub mod pathfinding;
pub mod rewards;
pub mod setup;

pub use error::SimError;
