/// Boundary error for turning raw inbound bytes into a `ClientMessage`,
/// mirroring `core_types::ActionRejection`'s role one layer further out:
/// this is what can go wrong before a message is even a typed value.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("message is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<&ProtocolError> for crate::error_code::ErrorCode {
    fn from(err: &ProtocolError) -> Self {
        match err {
            ProtocolError::TooLarge { .. } => crate::error_code::ErrorCode::InvalidMessage,
            ProtocolError::Malformed(_) => crate::error_code::ErrorCode::InvalidMessage,
        }
    }
}
