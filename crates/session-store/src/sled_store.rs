use async_trait::async_trait;
use sled::{transaction::ConflictableTransactionError, Db, Tree};

use core_types::{CharacterId, GameEvent, GameState, SessionId, UserId};

use crate::error::{StoreError, StoreResult};
use crate::migrations;
use crate::schema::{Character, SessionArchive, SessionRecord, User};
use crate::store::SessionStore;

/// Durable `SessionStore` backed by an embedded `sled` database. Every
/// record is a JSON blob; the tree name is the only real schema.
pub struct SledStore {
    db: Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<std::path::Path>) -> StoreResult<Self> {
        let db = sled::open(path).map_err(|e| StoreError::Backend(e.to_string()))?;
        migrations::apply_pending(&db)?;
        Ok(Self { db })
    }

    fn tree(&self, name: &str) -> StoreResult<Tree> {
        self.db.open_tree(name).map_err(|e| StoreError::Backend(e.to_string()))
    }
}

fn get_json<T: serde::de::DeserializeOwned>(tree: &Tree, key: impl AsRef<[u8]>) -> StoreResult<Option<T>> {
    tree.get(key)
        .map_err(|e| StoreError::Backend(e.to_string()))?
        .map(|bytes| serde_json::from_slice(&bytes).map_err(StoreError::from))
        .transpose()
}

fn put_json<T: serde::Serialize>(tree: &Tree, key: impl AsRef<[u8]>, value: &T) -> StoreResult<()> {
    let bytes = serde_json::to_vec(value)?;
    tree.insert(key, bytes).map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(())
}

#[async_trait]
impl SessionStore for SledStore {
    async fn create_user(&self, user: User) -> StoreResult<()> {
        let tree = self.tree("users")?;
        put_json(&tree, user.id.to_string(), &user)
    }

    async fn get_user(&self, id: UserId) -> StoreResult<User> {
        let tree = self.tree("users")?;
        get_json(&tree, id.to_string())?.ok_or(StoreError::UserNotFound)
    }

    async fn create_character(&self, character: Character) -> StoreResult<()> {
        let tree = self.tree("characters")?;
        put_json(&tree, character.id.to_string(), &character)
    }

    async fn get_character(&self, id: CharacterId) -> StoreResult<Character> {
        let tree = self.tree("characters")?;
        get_json(&tree, id.to_string())?.ok_or(StoreError::CharacterNotFound)
    }

    async fn list_characters_for_user(&self, owner: UserId) -> StoreResult<Vec<Character>> {
        let tree = self.tree("characters")?;
        let mut out = Vec::new();
        for entry in tree.iter() {
            let (_, bytes) = entry.map_err(|e| StoreError::Backend(e.to_string()))?;
            let character: Character = serde_json::from_slice(&bytes)?;
            if character.owner_user_id == owner {
                out.push(character);
            }
        }
        Ok(out)
    }

    async fn save_character(&self, character: Character) -> StoreResult<()> {
        self.create_character(character).await
    }

    async fn create_session(&self, record: SessionRecord) -> StoreResult<()> {
        let sessions = self.tree("sessions")?;
        let join_codes = self.tree("join_codes")?;
        put_json(&sessions, record.id.to_string(), &record)?;
        join_codes
            .insert(record.join_code.as_bytes(), record.id.to_string().as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> StoreResult<SessionRecord> {
        let tree = self.tree("sessions")?;
        get_json(&tree, id.to_string())?.ok_or(StoreError::SessionNotFound)
    }

    async fn get_session_by_join_code(&self, join_code: &str) -> StoreResult<SessionRecord> {
        let join_codes = self.tree("join_codes")?;
        let id_bytes = join_codes
            .get(join_code.as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .ok_or(StoreError::JoinCodeNotFound)?;
        let id_str = std::str::from_utf8(&id_bytes)
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .to_string();
        let id: SessionId = id_str.parse().map_err(|_| StoreError::Backend("corrupt join code entry".into()))?;
        self.get_session(id).await
    }

    async fn delete_session(&self, id: SessionId) -> StoreResult<()> {
        let sessions = self.tree("sessions")?;
        if let Some(record) = get_json::<SessionRecord>(&sessions, id.to_string())? {
            let join_codes = self.tree("join_codes")?;
            join_codes
                .remove(record.join_code.as_bytes())
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        sessions
            .remove(id.to_string().as_bytes())
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn save_session_meta(&self, record: SessionRecord) -> StoreResult<()> {
        let sessions = self.tree("sessions")?;
        let existing: SessionRecord = get_json(&sessions, record.id.to_string())?.ok_or(StoreError::SessionNotFound)?;
        let mut updated = record;
        updated.state = existing.state;
        updated.state_version = existing.state_version;
        put_json(&sessions, updated.id.to_string(), &updated)
    }

    async fn update_game_state(
        &self,
        session_id: SessionId,
        expected_version: u64,
        new_state: GameState,
    ) -> StoreResult<u64> {
        let sessions = self.tree("sessions")?;
        let key = session_id.to_string();

        let result = sessions.transaction(|tx_tree| {
            let bytes = tx_tree
                .get(key.as_bytes())?
                .ok_or(ConflictableTransactionError::Abort(StoreError::SessionNotFound))?;
            let mut record: SessionRecord = serde_json::from_slice(&bytes)
                .map_err(|e| ConflictableTransactionError::Abort(StoreError::Serialization(e)))?;
            if record.state_version != expected_version {
                return Err(ConflictableTransactionError::Abort(StoreError::VersionConflict {
                    session_id,
                    expected: expected_version,
                    actual: record.state_version,
                }));
            }
            record.state = new_state.clone();
            record.state_version += 1;
            let new_bytes = serde_json::to_vec(&record)
                .map_err(|e| ConflictableTransactionError::Abort(StoreError::Serialization(e)))?;
            tx_tree.insert(key.as_bytes(), new_bytes)?;
            Ok(record.state_version)
        });

        result.map_err(|e| match e {
            sled::transaction::TransactionError::Abort(store_err) => store_err,
            sled::transaction::TransactionError::Storage(sled_err) => StoreError::Backend(sled_err.to_string()),
        })
    }

    async fn append_events(&self, session_id: SessionId, events: &[GameEvent]) -> StoreResult<()> {
        let tree = self.tree("events")?;
        let key = session_id.to_string();
        let mut existing: Vec<GameEvent> = get_json(&tree, &key)?.unwrap_or_default();
        existing.extend_from_slice(events);
        put_json(&tree, key, &existing)
    }

    async fn archive_session(&self, archive: SessionArchive) -> StoreResult<()> {
        let tree = self.tree("archives")?;
        put_json(&tree, archive.session_id.to_string(), &archive)
    }

    async fn get_archive(&self, session_id: SessionId) -> StoreResult<SessionArchive> {
        let tree = self.tree("archives")?;
        get_json(&tree, session_id.to_string())?.ok_or(StoreError::SessionNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_engine::setup::{generate_game_state, PlayerSeat};
    use core_types::{CharacterClass, SessionConfig, SessionStatus};

    fn store() -> (SledStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SledStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn session(id: SessionId, join_code: &str, owner: UserId) -> SessionRecord {
        let config = SessionConfig::default();
        let seats = vec![PlayerSeat {
            user_id: owner,
            class: CharacterClass::Ranger,
            name: "scout".into(),
        }];
        SessionRecord {
            id,
            join_code: join_code.to_string(),
            status: SessionStatus::Lobby,
            state: generate_game_state(&config, 7, &seats).unwrap(),
            config,
            state_version: 0,
            players: Vec::new(),
            dm_user_id: owner,
            created_at_ms: 0,
        }
    }

    #[tokio::test]
    async fn round_trips_a_session_through_disk() {
        let (store, _dir) = store();
        let owner = UserId::new();
        let id = SessionId::new();
        store.create_session(session(id, "DISK01", owner)).await.unwrap();

        let fetched = store.get_session(id).await.unwrap();
        assert_eq!(fetched.join_code, "DISK01");
    }

    #[tokio::test]
    async fn update_game_state_persists_and_bumps_version() {
        let (store, _dir) = store();
        let owner = UserId::new();
        let id = SessionId::new();
        let record = session(id, "DISK02", owner);
        let state = record.state.clone();
        store.create_session(record).await.unwrap();

        let new_version = store.update_game_state(id, 0, state).await.unwrap();
        assert_eq!(new_version, 1);

        let fetched = store.get_session(id).await.unwrap();
        assert_eq!(fetched.state_version, 1);
    }

    #[tokio::test]
    async fn stale_version_is_rejected_on_disk_too() {
        let (store, _dir) = store();
        let owner = UserId::new();
        let id = SessionId::new();
        let record = session(id, "DISK03", owner);
        let state = record.state.clone();
        store.create_session(record).await.unwrap();

        store.update_game_state(id, 0, state.clone()).await.unwrap();
        let err = store.update_game_state(id, 0, state).await.unwrap_err();
        assert!(matches!(err, StoreError::VersionConflict { .. }));
    }

    #[tokio::test]
    async fn events_accumulate_across_appends() {
        let (store, _dir) = store();
        let id = SessionId::new();
        let events = vec![GameEvent {
            session_id: id,
            seq: 1,
            ts: 0,
            kind: core_types::EventKind::PlayerLeft { user_id: UserId::new() },
        }];
        store.append_events(id, &events).await.unwrap();
        store.append_events(id, &events).await.unwrap();

        let tree = store.tree("events").unwrap();
        let stored: Vec<GameEvent> = get_json(&tree, id.to_string()).unwrap().unwrap();
        assert_eq!(stored.len(), 2);
    }
}
