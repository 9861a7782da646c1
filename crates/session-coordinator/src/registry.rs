//! Top-level supervisor: one `CoordinatorHandle` per live session, keyed
//! both by session id and by join code.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use core_types::{SessionConfig, SessionId, UserId};
use session_store::SessionStore;

use crate::coordinator::{self, CoordinatorHandle};
use crate::error::CoordinatorError;
use connection_manager::ConnectionManager;

#[derive(Default)]
pub struct SessionRegistry {
    by_id: RwLock<HashMap<SessionId, CoordinatorHandle>>,
    by_join_code: RwLock<HashMap<String, SessionId>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new lobby, spawns its coordinator, and registers it for
    /// lookup by both id and join code. The caller still has to call
    /// `handle.join(dm_user_id, None)` to actually seat the DM.
    pub async fn create_session(
        &self,
        config: SessionConfig,
        dm_user_id: UserId,
        store: Arc<dyn SessionStore>,
        connections: Arc<ConnectionManager>,
    ) -> Result<(SessionId, String, CoordinatorHandle), CoordinatorError> {
        let exists = |code: &str| self.by_join_code.read().expect("join_codes lock poisoned").contains_key(code);
        let record = coordinator::new_lobby_record(config, dm_user_id, exists)?;

        let session_id = record.id;
        let join_code = record.join_code.clone();
        store.create_session(record).await?;

        let handle = coordinator::spawn(
            store.get_session(session_id).await?,
            store,
            connections,
        );

        self.by_id.write().expect("sessions lock poisoned").insert(session_id, handle.clone());
        self.by_join_code
            .write()
            .expect("join_codes lock poisoned")
            .insert(join_code.clone(), session_id);

        Ok((session_id, join_code, handle))
    }

    pub fn get(&self, session_id: SessionId) -> Option<CoordinatorHandle> {
        self.by_id.read().expect("sessions lock poisoned").get(&session_id).cloned()
    }

    pub fn get_by_join_code(&self, join_code: &str) -> Option<(SessionId, CoordinatorHandle)> {
        let session_id = *self.by_join_code.read().expect("join_codes lock poisoned").get(join_code)?;
        self.get(session_id).map(|handle| (session_id, handle))
    }

    /// Drops the registry's handle once a session has ended and been
    /// archived. The coordinator task itself exits once every clone of its
    /// handle (this one plus any held by connected sockets) is dropped.
    pub fn remove(&self, session_id: SessionId, join_code: &str) {
        self.by_id.write().expect("sessions lock poisoned").remove(&session_id);
        self.by_join_code.write().expect("join_codes lock poisoned").remove(join_code);
    }
}
