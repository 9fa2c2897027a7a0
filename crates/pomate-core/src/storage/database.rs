//! SQLite-backed key-value store.
//!
//! A single `kv` table holds one row per settings key. Writes use
//! `INSERT OR REPLACE`, which SQLite applies atomically, so a failed write
//! never clobbers the last good value.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, OptionalExtension};

use super::{data_dir, KeyValueStore};
use crate::error::StoreError;

/// SQLite database holding the persisted settings blobs.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Default location: `<data_dir>/pomate.db`.
    pub fn default_path() -> Result<PathBuf, StoreError> {
        Ok(data_dir()?.join("pomate.db"))
    }

    /// Open the database at the default location.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StoreError> {
        Self::open_at(Self::default_path()?)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StoreError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        tracing::debug!(path = %path.display(), "opened settings database");
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS kv (
                key   TEXT PRIMARY KEY,
                value BLOB NOT NULL
            );",
        )?;
        Ok(())
    }

    /// Get a value from the kv store.
    pub fn kv_get(&self, key: &str) -> Result<Option<Vec<u8>>, rusqlite::Error> {
        self.conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, Vec<u8>>(0)
            })
            .optional()
    }

    /// Set a value in the kv store.
    pub fn kv_set(&self, key: &str, value: &[u8]) -> Result<(), rusqlite::Error> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }
}

impl KeyValueStore for Database {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        self.kv_get(key).map_err(|e| StoreError::ReadFailed {
            key: key.to_string(),
            message: e.to_string(),
        })
    }

    fn save(&mut self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.kv_set(key, bytes).map_err(|e| StoreError::WriteFailed {
            key: key.to_string(),
            message: e.to_string(),
        })
    }
}
