#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("user is not connected")]
    NotConnected,
    #[error("outbound queue is full")]
    Backpressure,
}
