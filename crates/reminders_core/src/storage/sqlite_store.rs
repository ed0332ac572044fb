//! SQLite-backed document store.
//!
//! # Responsibility
//! - Persist whole documents in the `documents` table.
//! - Keep SQL details inside the storage boundary.
//!
//! # Invariants
//! - Connections come from `db::open_db*`, so migrations are applied.
//! - One row per key; `save` is an upsert of the full body.

use super::{DocumentStore, StorageError, StorageResult};
use crate::db::{open_db, open_db_in_memory, DbResult};
use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Document store over one SQLite connection.
pub struct SqliteDocumentStore {
    conn: Mutex<Connection>,
}

impl SqliteDocumentStore {
    /// Opens (or creates) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps an already migrated connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Lists stored document keys in ascending order.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT key FROM documents ORDER BY key ASC;")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut keys = Vec::new();
        for key in rows {
            keys.push(key?);
        }
        Ok(keys)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl DocumentStore for SqliteDocumentStore {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        let conn = self.lock()?;
        let body = conn
            .query_row(
                "SELECT body FROM documents WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        debug!(
            "event=document_load module=storage status=ok found={} bytes={}",
            body.is_some(),
            body.as_ref().map_or(0, Vec::len)
        );
        Ok(body)
    }

    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO documents (key, body, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at;",
            params![key, bytes],
        )?;
        debug!(
            "event=document_save module=storage status=ok bytes={}",
            bytes.len()
        );
        Ok(())
    }
}
