//! Persisted record collection shared by the contact and event stores.
//!
//! # Responsibility
//! - Hold the in-memory mirror of one collection document.
//! - Apply mutate-then-flush: every public mutation ends with a full
//!   collection rewrite through the document store.
//! - Record an explicit change-log for observers.
//!
//! # Invariants
//! - The mirror is updated before the flush is issued.
//! - A failed flush leaves the collection dirty; the next flush rewrites it.
//! - Mutations are only accepted in `StoreState::Open`.

use super::{RepoError, RepoResult};
use crate::storage::{DocumentStore, StorageError};
use log::{error, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Record persisted in a collection document.
pub trait Record: Clone + Serialize + DeserializeOwned {
    /// Collection name used in logs and errors.
    const COLLECTION: &'static str;

    fn record_id(&self) -> &str;
}

/// Store lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    Uninitialized,
    Open,
    Closed,
}

/// Change-log entry emitted for every applied mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Created(String),
    Updated(String),
    Deleted(String),
}

impl StoreChange {
    pub fn record_id(&self) -> &str {
        match self {
            Self::Created(id) | Self::Updated(id) | Self::Deleted(id) => id,
        }
    }
}

/// Result of a mutation plus any non-fatal storage warnings.
///
/// A warning means the change is applied in memory but may not survive a
/// restart.
#[derive(Debug)]
pub struct Persisted<T> {
    pub value: T,
    pub warnings: Vec<StorageError>,
}

impl<T> Persisted<T> {
    pub fn clean(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warning(value: T, warning: Option<StorageError>) -> Self {
        Self {
            value,
            warnings: warning.into_iter().collect(),
        }
    }

    /// Whether every flush behind this result reached durable storage.
    pub fn is_durable(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Persisted<U> {
        Persisted {
            value: f(self.value),
            warnings: self.warnings,
        }
    }

    /// Moves the warnings of `other` into `self` and returns its value.
    pub fn absorb<U>(&mut self, other: Persisted<U>) -> U {
        self.warnings.extend(other.warnings);
        other.value
    }
}

pub(crate) struct RecordCollection<T: Record> {
    key: String,
    documents: Arc<dyn DocumentStore>,
    items: Vec<T>,
    state: StoreState,
    dirty: bool,
    /// Load found no document or an empty one. False after a failed load.
    seedable: bool,
    changes: Vec<StoreChange>,
}

impl<T: Record> RecordCollection<T> {
    pub(crate) fn new(documents: Arc<dyn DocumentStore>, key: String) -> Self {
        Self {
            key,
            documents,
            items: Vec::new(),
            state: StoreState::Uninitialized,
            dirty: false,
            seedable: false,
            changes: Vec::new(),
        }
    }

    /// Loads the persisted document once and opens the collection.
    ///
    /// A missing document yields an empty collection. A load or decode
    /// failure opens the collection empty, reports a warning and blocks
    /// sample seeding so the stored document is not replaced.
    pub(crate) fn init(&mut self) -> Persisted<usize> {
        if self.state == StoreState::Open {
            return Persisted::clean(self.items.len());
        }

        let loaded = self
            .documents
            .load(&self.key)
            .and_then(|body| match body {
                Some(bytes) => serde_json::from_slice::<Vec<T>>(&bytes).map_err(StorageError::from),
                None => Ok(Vec::new()),
            });

        self.state = StoreState::Open;
        self.dirty = false;
        match loaded {
            Ok(items) => {
                self.seedable = items.is_empty();
                self.items = items;
                info!(
                    "event=store_init module=repo collection={} status=ok records={}",
                    T::COLLECTION,
                    self.items.len()
                );
                Persisted::clean(self.items.len())
            }
            Err(err) => {
                self.items.clear();
                self.seedable = false;
                error!(
                    "event=store_init module=repo collection={} status=error error={err}",
                    T::COLLECTION
                );
                Persisted::with_warning(0, Some(err))
            }
        }
    }

    /// Final flush when dirty, then closes the collection.
    pub(crate) fn shutdown(&mut self) -> Persisted<()> {
        if self.state != StoreState::Open {
            return Persisted::clean(());
        }
        let result = self.flush_if_dirty();
        self.state = StoreState::Closed;
        info!(
            "event=store_shutdown module=repo collection={} status={} records={}",
            T::COLLECTION,
            if result.is_durable() { "ok" } else { "error" },
            self.items.len()
        );
        result
    }

    pub(crate) fn state(&self) -> StoreState {
        self.state
    }

    pub(crate) fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Whether first-run sample data may be written.
    pub(crate) fn is_seedable(&self) -> bool {
        self.seedable && self.items.is_empty()
    }

    pub(crate) fn items(&self) -> &[T] {
        &self.items
    }

    pub(crate) fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.record_id() == id)
    }

    pub(crate) fn ensure_open(&self) -> RepoResult<()> {
        if self.state == StoreState::Open {
            return Ok(());
        }
        Err(RepoError::NotOpen {
            collection: T::COLLECTION,
            state: self.state,
        })
    }

    pub(crate) fn insert(&mut self, item: T) -> RepoResult<Persisted<()>> {
        self.ensure_open()?;
        if self.get(item.record_id()).is_some() {
            return Err(RepoError::DuplicateId(item.record_id().to_string()));
        }

        self.changes
            .push(StoreChange::Created(item.record_id().to_string()));
        self.items.push(item);
        Ok(self.flush())
    }

    /// Appends many records with a single flush. Ids must be unique.
    pub(crate) fn insert_many(&mut self, new_items: Vec<T>) -> RepoResult<Persisted<usize>> {
        self.ensure_open()?;
        for (index, item) in new_items.iter().enumerate() {
            let id = item.record_id();
            let repeated = new_items[..index].iter().any(|prev| prev.record_id() == id);
            if repeated || self.get(id).is_some() {
                return Err(RepoError::DuplicateId(id.to_string()));
            }
        }

        let count = new_items.len();
        for item in new_items {
            self.changes
                .push(StoreChange::Created(item.record_id().to_string()));
            self.items.push(item);
        }
        Ok(self.flush().map(|()| count))
    }

    /// Replaces the record with the same id. `false` when absent.
    pub(crate) fn replace(&mut self, item: T) -> RepoResult<Persisted<bool>> {
        self.ensure_open()?;
        let Some(index) = self.position(item.record_id()) else {
            return Ok(Persisted::clean(false));
        };

        self.changes
            .push(StoreChange::Updated(item.record_id().to_string()));
        self.items[index] = item;
        Ok(self.flush().map(|()| true))
    }

    /// Removes the record with `id`, returning it when found.
    pub(crate) fn remove(&mut self, id: &str) -> RepoResult<Persisted<Option<T>>> {
        self.ensure_open()?;
        let Some(index) = self.position(id) else {
            return Ok(Persisted::clean(None));
        };

        let removed = self.items.remove(index);
        self.changes.push(StoreChange::Deleted(id.to_string()));
        Ok(self.flush().map(|()| Some(removed)))
    }

    /// Rewrites the full collection document.
    pub(crate) fn flush(&mut self) -> Persisted<()> {
        self.dirty = true;
        let written = serde_json::to_vec(&self.items)
            .map_err(StorageError::from)
            .and_then(|bytes| self.documents.save(&self.key, &bytes));

        match written {
            Ok(()) => {
                self.dirty = false;
                Persisted::clean(())
            }
            Err(err) => {
                warn!(
                    "event=store_flush module=repo collection={} status=error records={} error={err}",
                    T::COLLECTION,
                    self.items.len()
                );
                Persisted::with_warning((), Some(err))
            }
        }
    }

    /// Retries a previously failed flush; no-op when clean.
    pub(crate) fn flush_if_dirty(&mut self) -> Persisted<()> {
        if !self.dirty {
            return Persisted::clean(());
        }
        info!(
            "event=store_flush_retry module=repo collection={} status=start",
            T::COLLECTION
        );
        self.flush()
    }

    pub(crate) fn drain_changes(&mut self) -> Vec<StoreChange> {
        std::mem::take(&mut self.changes)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.record_id() == id)
    }
}
