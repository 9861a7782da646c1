use serde::{Deserialize, Serialize};

/// Stable, finite error codes sent in `ServerMessage::Error`. Clients match
/// on these, so — like `core_types::ActionRejection` — variants are never
/// renamed or removed once shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    AuthRequired,
    AuthFailed,
    SessionNotFound,
    SessionFull,
    AlreadyJoined,
    NotInLobby,
    NotReady,
    NotTheDm,
    InvalidMessage,
    ActionRejected,
    RateLimited,
    Internal,
}
