//! SQLite-backed key/value store.
//!
//! One `kv` table keyed by `(user_id, key)`, so several local identities
//! can share a database file without seeing each other's gardens.

use rusqlite::{params, Connection};
use std::path::Path;

use super::data_dir;
use super::persistence::PersistenceProvider;
use crate::error::{CoreError, PersistenceError};

/// SQLite database holding one document per `(user_id, key)`.
pub struct SqliteStore {
    conn: Connection,
    user_id: String,
}

impl SqliteStore {
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Open (or create) the database at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path, user_id: impl Into<String>) -> Result<Self, PersistenceError> {
        let conn = Connection::open(path).map_err(|source| PersistenceError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let store = Self {
            conn,
            user_id: user_id.into(),
        };
        store.migrate()?;
        tracing::debug!(path = %path.display(), user = %store.user_id, "opened sqlite store");
        Ok(store)
    }

    /// Open the database at `<data_dir>/tendly.db`.
    pub fn open_default(user_id: impl Into<String>) -> Result<Self, CoreError> {
        let path = data_dir()?.join("tendly.db");
        Ok(Self::open(&path, user_id)?)
    }

    /// Open an in-memory database.
    pub fn open_memory(user_id: impl Into<String>) -> Result<Self, PersistenceError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn,
            user_id: user_id.into(),
        };
        store.migrate()?;
        Ok(store)
    }

    fn migrate(&self) -> Result<(), PersistenceError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS kv (
                    user_id TEXT NOT NULL,
                    key TEXT NOT NULL,
                    value TEXT NOT NULL,
                    updated_at TEXT NOT NULL DEFAULT (datetime('now')),
                    PRIMARY KEY (user_id, key)
                );",
            )
            .map_err(|e| PersistenceError::MigrationFailed(e.to_string()))
    }
}

impl PersistenceProvider for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn load(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM kv WHERE user_id = ?1 AND key = ?2")
            .map_err(|e| load_failed(key, e))?;
        let result = stmt.query_row(params![self.user_id, key], |row| row.get::<_, String>(0));
        match result {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(load_failed(key, e)),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        self.conn
            .execute(
                "INSERT OR REPLACE INTO kv (user_id, key, value, updated_at)
                 VALUES (?1, ?2, ?3, datetime('now'))",
                params![self.user_id, key, value],
            )
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(err, _)
                    if err.code == rusqlite::ErrorCode::DatabaseBusy
                        || err.code == rusqlite::ErrorCode::DatabaseLocked =>
                {
                    PersistenceError::Locked
                }
                other => PersistenceError::SaveFailed {
                    key: key.to_string(),
                    message: other.to_string(),
                },
            })?;
        Ok(())
    }
}

fn load_failed(key: &str, e: rusqlite::Error) -> PersistenceError {
    PersistenceError::LoadFailed {
        key: key.to_string(),
        message: e.to_string(),
    }
}
