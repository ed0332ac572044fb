//! Reminders use-case facade.
//!
//! # Responsibility
//! - Own the contact store, event store, birthday engine and linker.
//! - Run every contact mutation as validate, mutate, retry pending event
//!   flush, then synchronize derived events.
//!
//! # Invariants
//! - Callers never reach the stores mutably; all writes go through here so
//!   the derived-event invariant cannot be bypassed.
//! - User event updates cannot add, change or clear `related_contact_id`.

use crate::clock::Clock;
use crate::config::CoreConfig;
use crate::model::contact::{Contact, ContactDraft};
use crate::model::event::{Attendee, EventDraft, MemorialEvent};
use crate::repo::contact_repo::ContactStore;
use crate::repo::event_repo::{DueReminder, EventStore};
use crate::repo::Persisted;
use crate::seed::{sample_contacts, sample_events};
use crate::service::attendee_linker::{AttendeeLinker, ResolvedAttendee};
use crate::service::birthday_sync::{BirthdaySync, SyncOutcome, SyncResult};
use crate::storage::DocumentStore;
use chrono::NaiveDate;
use log::{info, warn};
use std::sync::Arc;

/// Contacts, events and their synchronization behind one API.
pub struct RemindersService {
    contacts: ContactStore,
    events: EventStore,
    sync: BirthdaySync,
    linker: AttendeeLinker,
    clock: Arc<dyn Clock>,
}

impl RemindersService {
    /// Opens both stores, seeds first-run data when enabled and reconciles
    /// derived events.
    ///
    /// Load failures are reported as warnings; the service still opens.
    pub fn open(
        documents: Arc<dyn DocumentStore>,
        clock: Arc<dyn Clock>,
        config: &CoreConfig,
    ) -> SyncResult<Persisted<Self>> {
        let mut contacts = ContactStore::with_key(
            Arc::clone(&documents),
            Arc::clone(&clock),
            config.storage.contacts_key.clone(),
        );
        let mut events = EventStore::with_key(documents, config.storage.events_key.clone());

        let mut report = Persisted::clean(());
        let loaded_contacts = report.absorb(contacts.init());
        let loaded_events = report.absorb(events.init());

        if config.seed_sample_data {
            report.absorb(contacts.ensure_sample_data(sample_contacts)?);
            let today = clock.today();
            report.absorb(events.ensure_sample_data(|| sample_events(today))?);
        }

        let service = Self {
            contacts,
            events,
            sync: BirthdaySync::new(config.birthday.clone(), Arc::clone(&clock)),
            linker: AttendeeLinker::new(),
            clock,
        };
        let mut service = report.map(|()| service);
        let reconciled = {
            let inner = &mut service.value;
            inner
                .sync
                .reconcile(&mut inner.events, &inner.contacts, inner.clock.today())?
        };
        service.absorb(reconciled);

        info!(
            "event=service_open module=service status={} contacts={} events={} loaded_contacts={} loaded_events={}",
            if service.is_durable() { "ok" } else { "degraded" },
            service.value.contacts.len(),
            service.value.events.len(),
            loaded_contacts,
            loaded_events
        );
        Ok(service)
    }

    pub fn contacts(&self) -> &ContactStore {
        &self.contacts
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn create_contact(&mut self, draft: ContactDraft) -> SyncResult<Persisted<Contact>> {
        let mut result = self.contacts.create(draft)?;
        result.absorb(self.events.flush_if_dirty());
        let synced = self.sync.on_contact_created(&mut self.events, &result.value)?;
        result.absorb(synced);
        Ok(result)
    }

    /// Replaces a contact and propagates birthday/name changes.
    ///
    /// Returns `false` (and syncs nothing) when no contact has that id.
    pub fn update_contact(&mut self, contact: Contact) -> SyncResult<Persisted<bool>> {
        contact.validate()?;
        let Some(old) = self.contacts.get(&contact.id).cloned() else {
            return Ok(Persisted::clean(false));
        };

        let mut result = self.contacts.update(contact)?;
        let Some(new) = self.contacts.get(&old.id).cloned() else {
            return Ok(result);
        };
        result.absorb(self.events.flush_if_dirty());
        let synced = self.sync.on_contact_updated(&mut self.events, &old, &new)?;
        result.absorb(synced);
        Ok(result)
    }

    /// Deletes a contact and its derived birthday event.
    pub fn delete_contact(&mut self, id: &str) -> SyncResult<Persisted<bool>> {
        let mut result = self.contacts.delete(id)?;
        if !result.value {
            return Ok(result);
        }
        result.absorb(self.events.flush_if_dirty());
        let synced = self.sync.on_contact_deleted(&mut self.events, id)?;
        result.absorb(synced);
        Ok(result)
    }

    pub fn toggle_favorite(&mut self, id: &str) -> SyncResult<Persisted<bool>> {
        Ok(self.contacts.toggle_favorite(id)?)
    }

    pub fn create_event(&mut self, draft: EventDraft) -> SyncResult<Persisted<MemorialEvent>> {
        Ok(self.events.create(draft)?)
    }

    /// Replaces an event, keeping its stored `related_contact_id`.
    pub fn update_event(&mut self, mut event: MemorialEvent) -> SyncResult<Persisted<bool>> {
        let Some(stored) = self.events.get(&event.id) else {
            return Ok(Persisted::clean(false));
        };
        if event.related_contact_id != stored.related_contact_id {
            warn!("event=event_update module=service status=adjusted reason=related_contact_locked");
            event.related_contact_id = stored.related_contact_id.clone();
        }
        Ok(self.events.update(event)?)
    }

    pub fn delete_event(&mut self, id: &str) -> SyncResult<Persisted<bool>> {
        Ok(self.events.delete(id)?)
    }

    pub fn add_attendee(
        &mut self,
        event_id: &str,
        attendee: Attendee,
    ) -> SyncResult<Persisted<bool>> {
        Ok(self.linker.add_attendee(&mut self.events, event_id, attendee)?)
    }

    /// Adds the stored contact `contact_id` to an event. `false` when either
    /// side is missing or the contact is already attending.
    pub fn link_contact(&mut self, event_id: &str, contact_id: &str) -> SyncResult<Persisted<bool>> {
        let Some(contact) = self.contacts.get(contact_id) else {
            return Ok(Persisted::clean(false));
        };
        Ok(self.linker.link_contact(&mut self.events, event_id, contact)?)
    }

    pub fn remove_attendee(&mut self, event_id: &str, name: &str) -> SyncResult<Persisted<bool>> {
        Ok(self.linker.remove_attendee(&mut self.events, event_id, name)?)
    }

    pub fn resolve_attendees(&self, event_id: &str) -> Vec<ResolvedAttendee> {
        self.linker
            .resolve_attendees(&self.events, &self.contacts, event_id)
    }

    /// Rolls stale derived events forward relative to the clock's today.
    pub fn roll_forward(&mut self) -> SyncResult<Persisted<SyncOutcome>> {
        let today = self.clock.today();
        self.roll_forward_at(today)
    }

    pub fn roll_forward_at(&mut self, today: NaiveDate) -> SyncResult<Persisted<SyncOutcome>> {
        self.sync
            .roll_forward_all_birthdays(&mut self.events, &self.contacts, today)
    }

    /// Re-runs the full derived-event reconciliation.
    pub fn reconcile(&mut self) -> SyncResult<Persisted<SyncOutcome>> {
        let today = self.clock.today();
        self.sync.reconcile(&mut self.events, &self.contacts, today)
    }

    pub fn due_reminders(&self) -> Vec<DueReminder> {
        self.events.due_reminders(self.clock.today())
    }

    pub fn upcoming(&self, within_days: u32) -> Vec<&MemorialEvent> {
        self.events.upcoming(self.clock.today(), within_days)
    }

    /// Flushes pending writes and closes both stores.
    pub fn shutdown(&mut self) -> Persisted<()> {
        let mut result = Persisted::clean(());
        result.absorb(self.contacts.shutdown());
        result.absorb(self.events.shutdown());
        info!(
            "event=service_shutdown module=service status={}",
            if result.is_durable() { "ok" } else { "error" }
        );
        result
    }
}
