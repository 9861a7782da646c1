//! Durable storage for users, characters, and sessions, behind a single
//! `SessionStore` trait so the coordinator never has to know whether it's
//! talking to an in-memory test double or a real disk-backed database.

pub mod error;
pub mod memory;
pub mod migrations;
pub mod schema;
pub mod sled_store;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use schema::{Character, RewardLine, SessionArchive, SessionPlayer, SessionRecord, User};
pub use sled_store::SledStore;
pub use store::SessionStore;
