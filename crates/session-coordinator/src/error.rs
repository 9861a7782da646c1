#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinatorError {
    #[error("session is full")]
    SessionFull,
    #[error("you have already joined this session")]
    AlreadyJoined,
    #[error("you are not a player in this session")]
    NotAPlayer,
    #[error("the session is not in its lobby phase")]
    NotInLobby,
    #[error("not every player is ready")]
    NotReady,
    #[error("only the dungeon master can do that")]
    NotTheDm,
    #[error("session has already ended")]
    SessionEnded,
    #[error("storage backend error: {0}")]
    Store(String),
    #[error("could not set up the session: {0}")]
    Sim(String),
}

impl From<session_store::StoreError> for CoordinatorError {
    fn from(err: session_store::StoreError) -> Self {
        CoordinatorError::Store(err.to_string())
    }
}

impl From<core_engine::SimError> for CoordinatorError {
    fn from(err: core_engine::SimError) -> Self {
        CoordinatorError::Sim(err.to_string())
    }
}
