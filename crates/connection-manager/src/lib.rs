//! Tracks which users have a live websocket, enforces one socket per user,
//! and fans outbound messages out to session rosters.

pub mod error;
pub mod heartbeat;
pub mod manager;

pub use error::SendError;
pub use manager::{ConnectionManager, RegisteredConnection, OUTBOX_CAPACITY};
