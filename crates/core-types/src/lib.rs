//! Core types for the session runtime — zero external deps beyond serde,
//! uuid, and thiserror.
//!
//! This crate defines every type shared across the engine and server: IDs,
//! enums, the game-state aggregate, actions, events, and session config. It
//! carries no simulation logic — that lives in `core_engine`.

pub mod action;
pub mod combat_state;
pub mod config;
pub mod enums;
pub mod event;
pub mod grid;
pub mod ids;
pub mod map;
pub mod rng;
pub mod state;
pub mod unit;

pub use action::{Action, ActionRejection};
pub use combat_state::{CombatState, InitiativeEntry, TurnState};
pub use config::{ConfigError, SessionConfig};
pub use enums::*;
pub use event::{EventKind, GameEvent};
pub use grid::{GridSize, Position, Tile, TileKind};
pub use ids::*;
pub use map::Map;
pub use rng::SimRng;
pub use state::GameState;
pub use unit::{Stats, Unit};
