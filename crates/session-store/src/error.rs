use core_types::SessionId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("user not found")]
    UserNotFound,
    #[error("character not found")]
    CharacterNotFound,
    #[error("session not found")]
    SessionNotFound,
    #[error("no session is registered under that join code")]
    JoinCodeNotFound,
    /// Raised by `SessionStore::update_game_state` when the caller's
    /// `expected_version` no longer matches the stored one — someone else
    /// already applied a newer state.
    #[error("session {session_id} is at version {actual} but caller expected {expected}")]
    VersionConflict {
        session_id: SessionId,
        expected: u64,
        actual: u64,
    },
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("storage backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
