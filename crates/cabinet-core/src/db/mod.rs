//! Storage layer for cabinet-medical.

mod schema;
mod appointments;
mod patients;
mod numbers;
mod payments;

pub use schema::*;

use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

/// Storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    NotFound(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Local store wrapper.
///
/// All collection reads and writes go through whole-document JSON values
/// in the `storage` table; there are no partial updates at this layer.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the store at path, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Create an in-memory store (for testing).
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.initialize()?;
        Ok(db)
    }

    /// Initialize schema.
    fn initialize(&self) -> StoreResult<()> {
        self.conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Get raw connection (for advanced queries).
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Raw JSON value under a storage key.
    pub(crate) fn read_raw(&self, key: &str) -> StoreResult<Option<String>> {
        self.conn
            .query_row("SELECT value FROM storage WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
            .map_err(Into::into)
    }

    /// Deserialize the collection stored under a key, if present.
    pub(crate) fn read_json<T: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<T>> {
        match self.read_raw(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize and persist a whole collection under a key.
    pub(crate) fn write_json<T: Serialize>(&self, key: &str, value: &T) -> StoreResult<()> {
        let raw = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO storage (key, value, updated_at) VALUES (?, ?, datetime('now'))",
            [key, raw.as_str()],
        )?;
        Ok(())
    }
}
