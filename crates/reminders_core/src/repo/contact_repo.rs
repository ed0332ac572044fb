//! Contact store.
//!
//! # Responsibility
//! - CRUD and read queries over the contact collection.
//! - Assign ids and maintain `created_at`/`updated_at`.
//!
//! # Invariants
//! - Created contacts receive a fresh UUID id.
//! - `update` keeps the stored `created_at` and refreshes `updated_at`, never
//!   moving it before `created_at`.
//! - Read queries never touch the document store.

use super::collection::{Persisted, Record, RecordCollection, StoreChange, StoreState};
use super::RepoResult;
use crate::clock::Clock;
use crate::model::contact::{Contact, ContactDraft};
use crate::storage::DocumentStore;
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;
use uuid::Uuid;

/// Default document key, compatible with existing browser-client storage.
pub const DEFAULT_CONTACTS_KEY: &str = "sg_contacts_v1";

impl Record for Contact {
    const COLLECTION: &'static str = "contacts";

    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Explicit owner of the contact collection.
pub struct ContactStore {
    inner: RecordCollection<Contact>,
    clock: Arc<dyn Clock>,
}

impl ContactStore {
    pub fn new(documents: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self::with_key(documents, clock, DEFAULT_CONTACTS_KEY)
    }

    pub fn with_key(
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        key: impl Into<String>,
    ) -> Self {
        Self {
            inner: RecordCollection::new(documents, key.into()),
            clock,
        }
    }

    /// Loads persisted contacts. Returns the number of loaded records.
    pub fn init(&mut self) -> Persisted<usize> {
        self.inner.init()
    }

    pub fn shutdown(&mut self) -> Persisted<()> {
        self.inner.shutdown()
    }

    pub fn state(&self) -> StoreState {
        self.inner.state()
    }

    /// Seeds the store with `provider` output when it loaded empty.
    ///
    /// Never overwrites existing data, including a stored document that
    /// failed to decode. Returns the number of seeded records.
    pub fn ensure_sample_data<F>(&mut self, provider: F) -> RepoResult<Persisted<usize>>
    where
        F: FnOnce(DateTime<Utc>) -> Vec<Contact>,
    {
        self.inner.ensure_open()?;
        if !self.inner.is_seedable() {
            return Ok(Persisted::clean(0));
        }

        let samples = provider(self.clock.now());
        for contact in &samples {
            contact.validate()?;
        }
        let seeded = self.inner.insert_many(samples)?;
        info!(
            "event=sample_data module=repo collection=contacts status=ok records={}",
            seeded.value
        );
        Ok(seeded)
    }

    /// Validates and stores a new contact, returning the full record.
    pub fn create(&mut self, draft: ContactDraft) -> RepoResult<Persisted<Contact>> {
        self.inner.ensure_open()?;
        draft.validate()?;

        let contact = Contact::from_draft(Uuid::new_v4().to_string(), draft, self.clock.now());
        let flushed = self.inner.insert(contact.clone())?;
        Ok(flushed.map(|()| contact))
    }

    /// Replaces the contact with the same id. `false` when absent.
    pub fn update(&mut self, mut contact: Contact) -> RepoResult<Persisted<bool>> {
        self.inner.ensure_open()?;
        contact.validate()?;

        let Some(existing) = self.inner.get(&contact.id) else {
            return Ok(Persisted::clean(false));
        };
        contact.created_at = existing.created_at;
        contact.updated_at = self.clock.now().max(existing.created_at);
        self.inner.replace(contact)
    }

    /// Removes a contact. `false` when absent.
    pub fn delete(&mut self, id: &str) -> RepoResult<Persisted<bool>> {
        Ok(self.inner.remove(id)?.map(|removed| removed.is_some()))
    }

    /// Flips `is_favorite`. `false` when absent.
    pub fn toggle_favorite(&mut self, id: &str) -> RepoResult<Persisted<bool>> {
        self.inner.ensure_open()?;
        let Some(mut contact) = self.get(id).cloned() else {
            return Ok(Persisted::clean(false));
        };
        contact.is_favorite = !contact.is_favorite;
        self.update(contact)
    }

    pub fn get(&self, id: &str) -> Option<&Contact> {
        self.inner.get(id)
    }

    pub fn all(&self) -> &[Contact] {
        self.inner.items()
    }

    pub fn len(&self) -> usize {
        self.inner.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items().is_empty()
    }

    pub fn find<P>(&self, predicate: P) -> Vec<&Contact>
    where
        P: Fn(&Contact) -> bool,
    {
        self.all()
            .iter()
            .filter(|contact| predicate(contact))
            .collect()
    }

    /// Case-insensitive substring search across name, phone, email, notes.
    pub fn search(&self, query: &str) -> Vec<&Contact> {
        let lowered = query.to_lowercase();
        self.find(|contact| contact.matches_lowered(&lowered))
    }

    pub fn by_category(&self, category: &str) -> Vec<&Contact> {
        self.find(|contact| contact.category.as_deref() == Some(category))
    }

    pub fn favorites(&self) -> Vec<&Contact> {
        self.find(|contact| contact.is_favorite)
    }

    /// Distinct non-empty categories in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for category in self.all().iter().filter_map(|c| c.category.as_deref()) {
            if !category.is_empty() && !categories.contains(&category) {
                categories.push(category);
            }
        }
        categories
    }

    pub fn drain_changes(&mut self) -> Vec<StoreChange> {
        self.inner.drain_changes()
    }

    pub fn is_dirty(&self) -> bool {
        self.inner.is_dirty()
    }

    /// Retries a failed flush. No-op when the last flush succeeded.
    pub fn flush_if_dirty(&mut self) -> Persisted<()> {
        self.inner.flush_if_dirty()
    }
}
