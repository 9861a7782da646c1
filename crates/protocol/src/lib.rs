//! The client/server wire protocol.
//!
//! Every message is JSON, tagged by `"type"`. `ClientMessage` covers
//! everything a client sends; `ServerMessage` covers everything the server
//! pushes back, whether in direct response to a request or as an
//! unprompted event (a teammate's move, a reconnect, a chat line).

pub mod envelope;
pub mod error;
pub mod error_code;

pub use envelope::{decode_client_message, ClientMessage, ServerMessage};
pub use error::ProtocolError;
pub use error_code::ErrorCode;

/// Maximum size of a single inbound message, enforced before it's even
/// handed to serde — a bigger payload is rejected with `CloseReason::PayloadTooLarge`
/// without ever being parsed.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;
