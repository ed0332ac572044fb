//! Memorial event store.
//!
//! # Responsibility
//! - CRUD and read queries over the event collection.
//! - Answer scheduling queries (upcoming events, due reminders).
//!
//! # Invariants
//! - No uniqueness is enforced on `related_contact_id` here; the birthday
//!   engine owns that invariant.
//! - `reminder_days` is deduplicated on every write.

use super::collection::{Persisted, Record, RecordCollection, StoreChange, StoreState};
use super::RepoResult;
use crate::model::calendar::days_until;
use crate::model::event::{EventDraft, EventId, MemorialEvent};
use crate::storage::DocumentStore;
use chrono::NaiveDate;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

/// Default document key, compatible with existing browser-client storage.
pub const DEFAULT_EVENTS_KEY: &str = "sg_events_v1";

impl Record for MemorialEvent {
    const COLLECTION: &'static str = "events";

    fn record_id(&self) -> &str {
        &self.id
    }
}

/// Reminder that falls due on a given day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueReminder {
    pub event_id: EventId,
    pub title: String,
    pub date: NaiveDate,
    /// Days left until `date`; 0 means the event is today.
    pub days_left: u32,
}

/// Explicit owner of the event collection.
pub struct EventStore {
    inner: RecordCollection<MemorialEvent>,
}

impl EventStore {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self::with_key(documents, DEFAULT_EVENTS_KEY)
    }

    pub fn with_key(documents: Arc<dyn DocumentStore>, key: impl Into<String>) -> Self {
        Self {
            inner: RecordCollection::new(documents, key.into()),
        }
    }

    /// Loads persisted events. Returns the number of loaded records.
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
    /// No-op after a failed load.
    pub fn ensure_sample_data<F>(&mut self, provider: F) -> RepoResult<Persisted<usize>>
    where
        F: FnOnce() -> Vec<MemorialEvent>,
    {
        self.inner.ensure_open()?;
        if !self.inner.is_seedable() {
            return Ok(Persisted::clean(0));
        }

        let mut samples = provider();
        for event in &mut samples {
            event.validate()?;
            event.normalize_reminder_days();
        }
        let seeded = self.inner.insert_many(samples)?;
        info!(
            "event=sample_data module=repo collection=events status=ok records={}",
            seeded.value
        );
        Ok(seeded)
    }

    /// Validates and stores a user event with a fresh id.
    pub fn create(&mut self, draft: EventDraft) -> RepoResult<Persisted<MemorialEvent>> {
        self.inner.ensure_open()?;
        draft.validate()?;
        self.insert(MemorialEvent::from_draft(Uuid::new_v4().to_string(), draft))
    }

    /// Stores an event with a caller-provided id.
    ///
    /// Used by the birthday engine for deterministic derived ids.
    pub fn insert(&mut self, mut event: MemorialEvent) -> RepoResult<Persisted<MemorialEvent>> {
        self.inner.ensure_open()?;
        event.validate()?;
        event.normalize_reminder_days();

        let flushed = self.inner.insert(event.clone())?;
        Ok(flushed.map(|()| event))
    }

    /// Replaces the event with the same id. `false` when absent.
    pub fn update(&mut self, mut event: MemorialEvent) -> RepoResult<Persisted<bool>> {
        self.inner.ensure_open()?;
        event.validate()?;
        event.normalize_reminder_days();
        self.inner.replace(event)
    }

    /// Removes an event. `false` when absent.
    pub fn delete(&mut self, id: &str) -> RepoResult<Persisted<bool>> {
        Ok(self.inner.remove(id)?.map(|removed| removed.is_some()))
    }

    pub fn get(&self, id: &str) -> Option<&MemorialEvent> {
        self.inner.get(id)
    }

    pub fn all(&self) -> &[MemorialEvent] {
        self.inner.items()
    }

    pub fn len(&self) -> usize {
        self.inner.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.items().is_empty()
    }

    pub fn find<P>(&self, predicate: P) -> Vec<&MemorialEvent>
    where
        P: Fn(&MemorialEvent) -> bool,
    {
        self.all().iter().filter(|event| predicate(event)).collect()
    }

    /// Case-insensitive substring search across title, description, category.
    pub fn search(&self, query: &str) -> Vec<&MemorialEvent> {
        let lowered = query.to_lowercase();
        self.find(|event| event.matches_lowered(&lowered))
    }

    /// Derived events pointing at `contact_id`, in storage order.
    pub fn derived_for_contact(&self, contact_id: &str) -> Vec<&MemorialEvent> {
        self.find(|event| event.related_contact_id.as_deref() == Some(contact_id))
    }

    /// All auto-managed birthday events.
    pub fn derived(&self) -> Vec<&MemorialEvent> {
        self.find(MemorialEvent::is_derived)
    }

    /// Events dated within `[today, today + within_days]`, soonest first.
    pub fn upcoming(&self, today: NaiveDate, within_days: u32) -> Vec<&MemorialEvent> {
        let horizon = i64::from(within_days);
        let mut events = self.find(|event| {
            let left = days_until(event.date, today);
            (0..=horizon).contains(&left)
        });
        events.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        events
    }

    /// Reminders due on `today`.
    ///
    /// An event is due when the days left until it equal one of its
    /// `reminder_days`, or on the event day itself.
    pub fn due_reminders(&self, today: NaiveDate) -> Vec<DueReminder> {
        let mut due: Vec<DueReminder> = self
            .all()
            .iter()
            .filter_map(|event| {
                let days_left = u32::try_from(days_until(event.date, today)).ok()?;
                let is_due = days_left == 0 || event.reminder_days.contains(&days_left);
                is_due.then(|| DueReminder {
                    event_id: event.id.clone(),
                    title: event.title.clone(),
                    date: event.date,
                    days_left,
                })
            })
            .collect();
        due.sort_by(|a, b| a.days_left.cmp(&b.days_left).then_with(|| a.event_id.cmp(&b.event_id)));
        due
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
