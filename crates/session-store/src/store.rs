use async_trait::async_trait;

use core_types::{CharacterId, GameEvent, SessionId, UserId};

use crate::error::StoreResult;
use crate::schema::{Character, SessionArchive, SessionRecord, User};

/// Storage seam for everything that outlives a single connection.
///
/// Every mutation of a live session's game state goes through
/// `update_game_state`, which takes the version the caller last observed and
/// fails with `StoreError::VersionConflict` rather than silently clobbering a
/// concurrent write — the session coordinator is expected to hold the only
/// writer per session, so a conflict here means a bug, not a race to recover
/// from.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn create_user(&self, user: User) -> StoreResult<()>;
    async fn get_user(&self, id: UserId) -> StoreResult<User>;

    async fn create_character(&self, character: Character) -> StoreResult<()>;
    async fn get_character(&self, id: CharacterId) -> StoreResult<Character>;
    async fn list_characters_for_user(&self, owner: UserId) -> StoreResult<Vec<Character>>;
    async fn save_character(&self, character: Character) -> StoreResult<()>;

    async fn create_session(&self, record: SessionRecord) -> StoreResult<()>;
    async fn get_session(&self, id: SessionId) -> StoreResult<SessionRecord>;
    async fn get_session_by_join_code(&self, join_code: &str) -> StoreResult<SessionRecord>;
    async fn delete_session(&self, id: SessionId) -> StoreResult<()>;

    /// Replaces the roster and lobby-level fields (everything but
    /// `state`/`state_version`, which go through `update_game_state`).
    async fn save_session_meta(&self, record: SessionRecord) -> StoreResult<()>;

    /// Optimistic-concurrency state write: succeeds only if the stored
    /// `state_version` still equals `expected_version`.
    async fn update_game_state(
        &self,
        session_id: SessionId,
        expected_version: u64,
        new_state: core_types::GameState,
    ) -> StoreResult<u64>;

    /// Appends to a durable per-session event log, independent of the
    /// current-state blob — kept for resync and audit, never read back by
    /// the simulation itself.
    async fn append_events(&self, session_id: SessionId, events: &[GameEvent]) -> StoreResult<()>;

    async fn archive_session(&self, archive: SessionArchive) -> StoreResult<()>;
    async fn get_archive(&self, session_id: SessionId) -> StoreResult<SessionArchive>;
}
