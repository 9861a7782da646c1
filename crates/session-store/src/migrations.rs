//! Schema versioning for the sled-backed store.
//!
//! The current on-disk layout is versioned by a single integer kept in the
//! `meta` tree under `schema_version`. Each `Migration` knows how to step the
//! database from `from` to `from + 1`; `apply_pending` walks forward from
//! whatever is on disk to `CURRENT_SCHEMA_VERSION`, refusing to open a
//! database stamped with a version newer than this binary understands.

use sled::Db;

use crate::error::{StoreError, StoreResult};

pub const CURRENT_SCHEMA_VERSION: u64 = 1;

const SCHEMA_VERSION_KEY: &[u8] = b"schema_version";

pub struct Migration {
    pub from: u64,
    pub run: fn(&Db) -> StoreResult<()>,
}

fn migrations() -> Vec<Migration> {
    // No migrations yet: version 1 is the first on-disk layout. Future
    // migrations append here, each moving `from` -> `from + 1`.
    Vec::new()
}

fn read_schema_version(db: &Db) -> StoreResult<u64> {
    let meta = db.open_tree("meta").map_err(|e| StoreError::Backend(e.to_string()))?;
    match meta.get(SCHEMA_VERSION_KEY).map_err(|e| StoreError::Backend(e.to_string()))? {
        Some(bytes) => {
            let arr: [u8; 8] = bytes
                .as_ref()
                .try_into()
                .map_err(|_| StoreError::Backend("corrupt schema_version entry".into()))?;
            Ok(u64::from_be_bytes(arr))
        }
        None => Ok(CURRENT_SCHEMA_VERSION),
    }
}

fn write_schema_version(db: &Db, version: u64) -> StoreResult<()> {
    let meta = db.open_tree("meta").map_err(|e| StoreError::Backend(e.to_string()))?;
    meta.insert(SCHEMA_VERSION_KEY, &version.to_be_bytes())
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(())
}

/// Applies every migration needed to bring `db` up to
/// `CURRENT_SCHEMA_VERSION`. A database stamped with a newer version than
/// this binary knows about is a downgrade attempt and is rejected outright.
pub fn apply_pending(db: &Db) -> StoreResult<()> {
    let mut version = read_schema_version(db)?;
    if version > CURRENT_SCHEMA_VERSION {
        return Err(StoreError::Backend(format!(
            "database schema version {version} is newer than this binary supports ({CURRENT_SCHEMA_VERSION})"
        )));
    }
    for migration in migrations() {
        if migration.from == version {
            (migration.run)(db)?;
            version += 1;
        }
    }
    write_schema_version(db, CURRENT_SCHEMA_VERSION)?;
    db.flush().map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(())
}
