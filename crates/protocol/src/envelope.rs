use serde::{Deserialize, Serialize};

use core_types::{
    Action, ActionRejection, CharacterId, CloseReason, GameEvent, GameState, SessionConfig, SessionId, UserId,
};

use crate::error::ProtocolError;
use crate::error_code::ErrorCode;
use crate::MAX_MESSAGE_BYTES;

/// Everything a client can send, once connected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// First message on every connection; the socket is otherwise inert.
    Authenticate { token: String },
    CreateGame { config: SessionConfig },
    JoinGame {
        join_code: String,
        /// The character this player is bringing to the table, if any —
        /// determines the class their unit spawns as and where combat
        /// rewards get banked. `None` seats them without a character.
        #[serde(default)]
        character_id: Option<CharacterId>,
    },
    LeaveGame,
    Ready { ready: bool },
    /// DM-only; rejected with `ErrorCode::NotTheDm` from anyone else.
    StartGame,
    Action { action: Action },
    /// DM-only out-of-band control (e.g. force-kill a unit, grant an item) —
    /// free-form text, interpreted by the session coordinator's dm command
    /// parser, not validated by this crate.
    DmCommand { command: String },
    /// Ask the server to replace delta-sync with a full snapshot, used after
    /// a client detects it missed or misapplied a delta.
    RequestResync,
    Chat { text: String },
    Ping,
}

/// Everything the server can push, whether as a direct reply or
/// unprompted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Authenticated { user_id: UserId },
    Error { code: ErrorCode, message: String },
    SessionJoined {
        session_id: SessionId,
        join_code: String,
    },
    SessionUpdated {
        session_id: SessionId,
        status: core_types::SessionStatus,
        player_count: u32,
    },
    /// The full current state, sent on join and after a resync request.
    StateSnapshot {
        session_id: SessionId,
        state_version: u64,
        state: Box<GameState>,
    },
    /// Incremental change since `from_version`; clients that can't apply it
    /// (version mismatch) send `RequestResync` back.
    StateDelta {
        session_id: SessionId,
        from_version: u64,
        to_version: u64,
        events: Vec<GameEvent>,
    },
    ActionRejected { reason: ActionRejection },
    PlayerEvent { event: GameEvent },
    ChatMessage { user_id: UserId, text: String },
    Pong,
    /// Sent immediately before the server closes the socket.
    Closing { reason: CloseReason },
}

/// Turns a raw inbound text frame into a typed `ClientMessage`, enforcing
/// the size limit before serde ever sees the bytes.
pub fn decode_client_message(text: &str) -> Result<ClientMessage, ProtocolError> {
    if text.len() > MAX_MESSAGE_BYTES {
        return Err(ProtocolError::TooLarge { size: text.len(), limit: MAX_MESSAGE_BYTES });
    }
    Ok(serde_json::from_str(text)?)
}
