//! Document store contract and adapters.
//!
//! # Responsibility
//! - Define the narrow key/bytes persistence contract used by stores.
//! - Provide in-memory and SQLite-backed implementations.
//!
//! # Invariants
//! - `save` replaces the whole document stored under `key`.
//! - `load` of a never-saved key returns `Ok(None)`, not an error.

use crate::db::DbError;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Mutex, MutexGuard};

mod sqlite_store;

pub use sqlite_store::SqliteDocumentStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Serialization or durable-write failure.
///
/// Surfaced to callers as a non-fatal warning; in-memory store state remains
/// authoritative for the session.
#[derive(Debug)]
pub enum StorageError {
    Db(DbError),
    Serialization(serde_json::Error),
    /// Backend-specific failure reported as text (custom adapters).
    Backend(String),
    /// A previous panic poisoned the adapter lock.
    Poisoned,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialization(err) => write!(f, "document serialization failed: {err}"),
            Self::Backend(message) => write!(f, "document store failure: {message}"),
            Self::Poisoned => write!(f, "document store lock poisoned"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::Backend(_) | Self::Poisoned => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialization(value)
    }
}

/// Durable key/bytes persistence used by contact and event stores.
pub trait DocumentStore: Send + Sync {
    /// Returns the document saved under `key`, if any.
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;
    /// Replaces the document saved under `key`.
    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()>;
}

/// Process-local document store.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    documents: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.lock().map(|docs| docs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        self.documents.lock().map_err(|_| StorageError::Poisoned)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn save(&self, key: &str, bytes: &[u8]) -> StorageResult<()> {
        self.lock()?.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{DocumentStore, MemoryDocumentStore};

    #[test]
    fn memory_store_replaces_documents_per_key() {
        let store = MemoryDocumentStore::new();
        assert!(store.load("contacts").unwrap().is_none());

        store.save("contacts", b"[1]").unwrap();
        store.save("contacts", b"[1,2]").unwrap();
        store.save("events", b"[]").unwrap();

        assert_eq!(store.load("contacts").unwrap().as_deref(), Some(&b"[1,2]"[..]));
        assert_eq!(store.len(), 2);
    }
}
