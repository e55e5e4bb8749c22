//! SQLite-backed store: a single `settings` table behind an async mutex.
//! Several processes opening the same file share values, but each instance
//! only notifies about its own writes.

use std::path::Path;

use async_trait::async_trait;
use rusqlite::{Connection, OptionalExtension};
use tokio::sync::{broadcast, Mutex};

use beacon_core::errors::{BeaconError, BeaconResult, StorageError};
use beacon_core::traits::{IKeyValueStore, StorageChange};

use super::CHANGE_CHANNEL_CAPACITY;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS settings (
    key   TEXT PRIMARY KEY NOT NULL,
    value TEXT NOT NULL
)";

fn to_storage_err(message: String) -> BeaconError {
    StorageError::SqliteError { message }.into()
}

/// Persisted key/value store on a single SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    changes: broadcast::Sender<StorageChange>,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `path`.
    pub fn open(path: &Path) -> BeaconResult<Self> {
        let conn = Connection::open(path).map_err(|e| to_storage_err(e.to_string()))?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> BeaconResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| to_storage_err(e.to_string()))?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> BeaconResult<Self> {
        conn.execute_batch(CREATE_TABLE)
            .map_err(|e| to_storage_err(e.to_string()))?;
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self {
            conn: Mutex::new(conn),
            changes,
        })
    }

    /// Acquire the connection and run `f` with it.
    async fn with_conn<F, T>(&self, f: F) -> BeaconResult<T>
    where
        F: FnOnce(&Connection) -> BeaconResult<T>,
    {
        let guard = self.conn.lock().await;
        f(&guard)
    }
}

#[async_trait]
impl IKeyValueStore for SqliteStore {
    async fn get(&self, key: &str) -> BeaconResult<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM settings WHERE key = ?1",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(|e| {
                BeaconError::from(StorageError::ReadFailed {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            })
        })
        .await
    }

    async fn set(&self, key: &str, value: &str) -> BeaconResult<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO settings (key, value) VALUES (?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value",
                [key, value],
            )
            .map(|_| ())
            .map_err(|e| {
                BeaconError::from(StorageError::WriteFailed {
                    key: key.to_string(),
                    reason: e.to_string(),
                })
            })
        })
        .await?;
        let _ = self.changes.send(StorageChange {
            key: key.to_string(),
            new_value: Some(value.to_string()),
        });
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
