use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use core_types::{CharacterId, GameEvent, GameState, SessionId, UserId};

use crate::error::{StoreError, StoreResult};
use crate::schema::{Character, SessionArchive, SessionRecord, User};
use crate::store::SessionStore;

/// Non-durable `SessionStore`, backing tests and local dev — everything
/// lives in process memory and is lost on restart.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, User>>,
    characters: RwLock<HashMap<CharacterId, Character>>,
    sessions: RwLock<HashMap<SessionId, SessionRecord>>,
    join_codes: RwLock<HashMap<String, SessionId>>,
    events: RwLock<HashMap<SessionId, Vec<GameEvent>>>,
    archives: RwLock<HashMap<SessionId, SessionArchive>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(what: &str) -> StoreError {
    StoreError::Backend(format!("{what} lock poisoned"))
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_user(&self, user: User) -> StoreResult<()> {
        self.users
            .write()
            .map_err(|_| lock_poisoned("users"))?
            .insert(user.id, user);
        Ok(())
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        self.users
            .read()
            .map_err(|_| lock_poisoned("users"))?
            .get(&id)
            .cloned()
            .ok_or(StoreError::UserNotFound)
    }

    async fn create_character(&self, character: Character) -> StoreResult<()> {
        self.characters
            .write()
            .map_err(|_| lock_poisoned("characters"))?
            .insert(character.id, character);
        Ok(())
    }

    async fn get_character(&self, id: CharacterId) -> StoreResult<Character> {
        self.characters
            .read()
            .map_err(|_| lock_poisoned("characters"))?
            .get(&id)
            .cloned()
            .ok_or(StoreError::CharacterNotFound)
    }

    async fn list_characters_for_user(&self, owner: UserId) -> StoreResult<Vec<Character>> {
        Ok(self
            .characters
            .read()
            .map_err(|_| lock_poisoned("characters"))?
            .values()
            .filter(|c| c.owner_user_id == owner)
            .cloned()
            .collect())
    }

    async fn save_character(&self, character: Character) -> StoreResult<()> {
        self.characters
            .write()
            .map_err(|_| lock_poisoned("characters"))?
            .insert(character.id, character);
        Ok(())
    }

    async fn create_session(&self, record: SessionRecord) -> StoreResult<()> {
        let mut join_codes = self.join_codes.write().map_err(|_| lock_poisoned("join_codes"))?;
        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned("sessions"))?;
        join_codes.insert(record.join_code.clone(), record.id);
        sessions.insert(record.id, record);
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> StoreResult<SessionRecord> {
        self.sessions
            .read()
            .map_err(|_| lock_poisoned("sessions"))?
            .get(&id)
            .cloned()
            .ok_or(StoreError::SessionNotFound)
    }

    async fn get_session_by_join_code(&self, join_code: &str) -> StoreResult<SessionRecord> {
        let id = *self
            .join_codes
            .read()
            .map_err(|_| lock_poisoned("join_codes"))?
            .get(join_code)
            .ok_or(StoreError::JoinCodeNotFound)?;
        self.get_session(id).await
    }

    async fn delete_session(&self, id: SessionId) -> StoreResult<()> {
        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned("sessions"))?;
        if let Some(record) = sessions.remove(&id) {
            self.join_codes
                .write()
                .map_err(|_| lock_poisoned("join_codes"))?
                .remove(&record.join_code);
        }
        Ok(())
    }

    async fn save_session_meta(&self, record: SessionRecord) -> StoreResult<()> {
        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned("sessions"))?;
        let existing = sessions.get(&record.id).ok_or(StoreError::SessionNotFound)?;
        let mut updated = record;
        updated.state = existing.state.clone();
        updated.state_version = existing.state_version;
        sessions.insert(updated.id, updated);
        Ok(())
    }

    async fn update_game_state(
        &self,
        session_id: SessionId,
        expected_version: u64,
        new_state: GameState,
    ) -> StoreResult<u64> {
        let mut sessions = self.sessions.write().map_err(|_| lock_poisoned("sessions"))?;
        let record = sessions.get_mut(&session_id).ok_or(StoreError::SessionNotFound)?;
        if record.state_version != expected_version {
            return Err(StoreError::VersionConflict {
                session_id,
                expected: expected_version,
                actual: record.state_version,
            });
        }
        record.state = new_state;
        record.state_version += 1;
        Ok(record.state_version)
    }

    async fn append_events(&self, session_id: SessionId, events: &[GameEvent]) -> StoreResult<()> {
        self.events
            .write()
            .map_err(|_| lock_poisoned("events"))?
            .entry(session_id)
            .or_default()
            .extend_from_slice(events);
        Ok(())
    }

    async fn archive_session(&self, archive: SessionArchive) -> StoreResult<()> {
        self.archives
            .write()
            .map_err(|_| lock_poisoned("archives"))?
            .insert(archive.session_id, archive);
        Ok(())
    }

    async fn get_archive(&self, session_id: SessionId) -> StoreResult<SessionArchive> {
        self.archives
            .read()
            .map_err(|_| lock_poisoned("archives"))?
            .get(&session_id)
            .cloned()
            .ok_or(StoreError::SessionNotFound)
    }
}
