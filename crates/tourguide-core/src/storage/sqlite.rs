//! SQLite-backed storage scopes.

use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::Storage;
use crate::error::{Result, StorageResultExt};

/// Scope name used for durable items.
pub const DURABLE_SCOPE: &str = "durable";

const SELECT_ITEM_SQL: &str =
    "SELECT item_value FROM storage_items WHERE scope = ?1 AND item_key = ?2";
const UPSERT_ITEM_SQL: &str = "INSERT INTO storage_items (scope, item_key, item_value, updated_at) VALUES (?1, ?2, ?3, ?4) ON CONFLICT(scope, item_key) DO UPDATE SET item_value = excluded.item_value, updated_at = excluded.updated_at";
const DELETE_ITEM_SQL: &str = "DELETE FROM storage_items WHERE scope = ?1 AND item_key = ?2";
const SELECT_KEYS_SQL: &str =
    "SELECT item_key FROM storage_items WHERE scope = ?1 ORDER BY item_key";
const DELETE_SCOPE_SQL: &str = "DELETE FROM storage_items WHERE scope = ?1";

/// One storage scope inside a SQLite database file.
pub struct SqliteStorage {
    connection: Mutex<Connection>,
    scope: String,
}

impl SqliteStorage {
    /// Opens (creating if needed) the database at `path` and binds to `scope`.
    pub fn open<P: AsRef<Path>>(path: P, scope: impl Into<String>) -> Result<Self> {
        let connection =
            Connection::open(path).storage_context("Failed to open storage database")?;
        Self::with_connection(connection, scope.into())
    }

    /// The durable scope of the database at `path`.
    pub fn durable<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open(path, DURABLE_SCOPE)
    }

    /// The session scope for `session_id` in the database at `path`.
    pub fn session<P: AsRef<Path>>(path: P, session_id: &str) -> Result<Self> {
        Self::open(path, format!("session:{session_id}"))
    }

    /// A private in-memory database, mostly useful in tests.
    pub fn in_memory(scope: impl Into<String>) -> Result<Self> {
        let connection =
            Connection::open_in_memory().storage_context("Failed to open in-memory database")?;
        Self::with_connection(connection, scope.into())
    }

    fn with_connection(connection: Connection, scope: String) -> Result<Self> {
        // Several CLI processes may share one file.
        connection
            .busy_timeout(Duration::from_secs(5))
            .storage_context("Failed to set busy timeout")?;
        connection
            .execute_batch(include_str!("../../assets/schema.sql"))
            .storage_context("Failed to initialize storage schema")?;

        Ok(Self {
            connection: Mutex::new(connection),
            scope,
        })
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn connection(&self) -> MutexGuard<'_, Connection> {
        self.connection.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Storage for SqliteStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        self.connection()
            .query_row(SELECT_ITEM_SQL, params![self.scope, key], |row| row.get(0))
            .optional()
            .storage_context("Failed to read storage item")
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let now = Timestamp::now().to_string();
        self.connection()
            .execute(UPSERT_ITEM_SQL, params![self.scope, key, value, now])
            .storage_context("Failed to write storage item")?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.connection()
            .execute(DELETE_ITEM_SQL, params![self.scope, key])
            .storage_context("Failed to remove storage item")?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let connection = self.connection();
        let mut stmt = connection
            .prepare(SELECT_KEYS_SQL)
            .storage_context("Failed to prepare key listing")?;
        let keys = stmt
            .query_map(params![self.scope], |row| row.get(0))
            .storage_context("Failed to list storage keys")?
            .collect::<rusqlite::Result<Vec<String>>>()
            .storage_context("Failed to read storage key")?;
        Ok(keys)
    }

    fn clear(&self) -> Result<()> {
        self.connection()
            .execute(DELETE_SCOPE_SQL, params![self.scope])
            .storage_context("Failed to clear storage scope")?;
        Ok(())
    }
}
