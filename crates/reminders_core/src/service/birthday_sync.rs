//! Birthday synchronization engine.
//!
//! # Responsibility
//! - Project one derived birthday event per contact with a birthday.
//! - Propagate contact edits and deletions to the derived event.
//! - Roll stale derived events forward to the next occurrence.
//!
//! # Invariants
//! - Every contact with a birthday has exactly one event with
//!   `related_contact_id == contact.id`, dated on the next occurrence of the
//!   birthday on/after today (UTC).
//! - Contacts without a birthday have no derived event.
//! - Events without `related_contact_id` are never read or written here.
//! - Dates are computed before any event mutation, so a date error leaves
//!   the event store untouched.

use crate::clock::Clock;
use crate::config::BirthdayConfig;
use crate::model::calendar::next_occurrence;
use crate::model::contact::Contact;
use crate::model::event::{EventId, MemorialEvent};
use crate::model::validation::ValidationError;
use crate::repo::contact_repo::ContactStore;
use crate::repo::event_repo::EventStore;
use crate::repo::{Persisted, RepoError};
use chrono::NaiveDate;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

const DERIVED_ID_PREFIX: &str = "birthday-";

pub type SyncResult<T> = Result<T, SyncError>;

/// Errors from synchronization and facade operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    Validation(ValidationError),
    Repo(RepoError),
}

impl Display for SyncError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SyncError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ValidationError> for SyncError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for SyncError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Repo(other),
        }
    }
}

/// Counts of derived-event changes applied by one engine call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncOutcome {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}

impl SyncOutcome {
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0
    }

    fn merge(&mut self, other: SyncOutcome) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
    }
}

/// Deterministic id of the derived birthday event of `contact_id`.
pub fn derived_event_id(contact_id: &str) -> EventId {
    format!("{DERIVED_ID_PREFIX}{contact_id}")
}

pub fn birthday_title(name: &str) -> String {
    format!("Birthday: {name}")
}

pub fn birthday_description(name: &str) -> String {
    format!("Don't forget to congratulate {name}!")
}

/// Keeps derived birthday events consistent with contacts.
pub struct BirthdaySync {
    template: BirthdayConfig,
    clock: Arc<dyn Clock>,
}

impl BirthdaySync {
    pub fn new(template: BirthdayConfig, clock: Arc<dyn Clock>) -> Self {
        Self { template, clock }
    }

    /// Creates the derived event for a new contact with a birthday.
    pub fn on_contact_created(
        &self,
        events: &mut EventStore,
        contact: &Contact,
    ) -> SyncResult<Persisted<SyncOutcome>> {
        match contact.birthday {
            Some(birthday) => self.upsert(events, contact, birthday, self.clock.today()),
            None => Ok(Persisted::clean(SyncOutcome::default())),
        }
    }

    /// Propagates a contact edit to its derived event.
    ///
    /// Unchanged birthday with a derived event still dated on/after today
    /// leaves the event untouched, except that a rename refreshes its title
    /// and description.
    pub fn on_contact_updated(
        &self,
        events: &mut EventStore,
        old: &Contact,
        new: &Contact,
    ) -> SyncResult<Persisted<SyncOutcome>> {
        let today = self.clock.today();
        let Some(birthday) = new.birthday else {
            return self.remove_derived(events, &new.id);
        };
        if old.birthday != Some(birthday) {
            return self.upsert(events, new, birthday, today);
        }

        let current = match events.derived_for_contact(&new.id).as_slice() {
            [single] if single.date >= today => Some((*single).clone()),
            _ => None,
        };
        let Some(current) = current else {
            return self.upsert(events, new, birthday, today);
        };
        if old.name == new.name {
            debug!("event=birthday_sync module=sync status=noop reason=unchanged");
            return Ok(Persisted::clean(SyncOutcome::default()));
        }
        self.refresh_labels(events, current, &new.name)
    }

    /// Deletes every derived event of a removed contact.
    ///
    /// A derived event has no meaning without its source contact, so it is
    /// deleted rather than orphaned.
    pub fn on_contact_deleted(
        &self,
        events: &mut EventStore,
        contact_id: &str,
    ) -> SyncResult<Persisted<SyncOutcome>> {
        self.remove_derived(events, contact_id)
    }

    /// Advances every derived event dated before `today` to the next
    /// occurrence of its contact's birthday.
    ///
    /// Without this sweep, derived events are only moved on contact edits and
    /// go stale once their date passes. Orphaned events are left to
    /// [`BirthdaySync::reconcile`].
    pub fn roll_forward_all_birthdays(
        &self,
        events: &mut EventStore,
        contacts: &ContactStore,
        today: NaiveDate,
    ) -> SyncResult<Persisted<SyncOutcome>> {
        let mut planned: Vec<MemorialEvent> = Vec::new();
        for event in events.derived() {
            if event.date >= today {
                continue;
            }
            let birthday = event
                .related_contact_id
                .as_deref()
                .and_then(|contact_id| contacts.get(contact_id))
                .and_then(|contact| contact.birthday);
            let Some(birthday) = birthday else {
                continue;
            };

            let mut rolled = event.clone();
            rolled.date = next_occurrence(birthday, today)?;
            planned.push(rolled);
        }

        let mut result = Persisted::clean(SyncOutcome::default());
        for event in planned {
            if result.absorb(events.update(event)?) {
                result.value.updated += 1;
            }
        }
        info!(
            "event=birthday_roll_forward module=sync status=ok today={today} updated={}",
            result.value.updated
        );
        Ok(result)
    }

    /// Full pass enforcing the derived-event invariant for all contacts.
    ///
    /// Removes derived events whose contact is gone or has no birthday,
    /// creates missing ones, collapses duplicates and repairs stale dates.
    pub fn reconcile(
        &self,
        events: &mut EventStore,
        contacts: &ContactStore,
        today: NaiveDate,
    ) -> SyncResult<Persisted<SyncOutcome>> {
        let mut pending: Vec<(&Contact, NaiveDate)> = Vec::new();
        for contact in contacts.all() {
            if let Some(birthday) = contact.birthday {
                pending.push((contact, next_occurrence(birthday, today)?));
            }
        }

        let orphaned: Vec<EventId> = events
            .derived()
            .into_iter()
            .filter(|event| {
                event
                    .related_contact_id
                    .as_deref()
                    .and_then(|contact_id| contacts.get(contact_id))
                    .and_then(|contact| contact.birthday)
                    .is_none()
            })
            .map(|event| event.id.clone())
            .collect();

        let mut result = Persisted::clean(SyncOutcome::default());
        for event_id in orphaned {
            if result.absorb(events.delete(&event_id)?) {
                result.value.deleted += 1;
            }
        }
        for (contact, next_date) in pending {
            let is_current = matches!(
                events.derived_for_contact(&contact.id).as_slice(),
                [single] if single.date >= today && single.title == birthday_title(&contact.name)
            );
            if is_current {
                continue;
            }
            let applied = self.apply(events, contact, next_date)?;
            let outcome = result.absorb(applied);
            result.value.merge(outcome);
        }

        info!(
            "event=birthday_reconcile module=sync status=ok contacts={} created={} updated={} deleted={}",
            contacts.len(),
            result.value.created,
            result.value.updated,
            result.value.deleted
        );
        Ok(result)
    }

    fn upsert(
        &self,
        events: &mut EventStore,
        contact: &Contact,
        birthday: NaiveDate,
        today: NaiveDate,
    ) -> SyncResult<Persisted<SyncOutcome>> {
        let next_date = next_occurrence(birthday, today)?;
        self.apply(events, contact, next_date)
    }

    /// Creates or updates the single derived event for `contact`.
    fn apply(
        &self,
        events: &mut EventStore,
        contact: &Contact,
        next_date: NaiveDate,
    ) -> SyncResult<Persisted<SyncOutcome>> {
        let preferred_id = derived_event_id(&contact.id);
        let mut existing: Vec<MemorialEvent> = events
            .derived_for_contact(&contact.id)
            .into_iter()
            .cloned()
            .collect();
        let keep_index = existing
            .iter()
            .position(|event| event.id == preferred_id)
            .unwrap_or(0);

        let mut result = Persisted::clean(SyncOutcome::default());
        let kept = (!existing.is_empty()).then(|| existing.swap_remove(keep_index));
        for duplicate in existing {
            if result.absorb(events.delete(&duplicate.id)?) {
                result.value.deleted += 1;
            }
        }

        let title = birthday_title(&contact.name);
        let description = birthday_description(&contact.name);
        match kept {
            None => {
                let id = if events.get(&preferred_id).is_some() {
                    format!("{preferred_id}-{}", Uuid::new_v4())
                } else {
                    preferred_id
                };
                let event = self.build_event(id, contact, next_date, title, description);
                result.absorb(events.insert(event)?);
                result.value.created += 1;
                info!("event=birthday_sync module=sync status=ok action=create");
            }
            Some(mut event) => {
                let unchanged = event.date == next_date
                    && event.title == title
                    && event.description.as_deref() == Some(description.as_str());
                if !unchanged {
                    event.date = next_date;
                    event.title = title;
                    event.description = Some(description);
                    if result.absorb(events.update(event)?) {
                        result.value.updated += 1;
                    }
                    info!("event=birthday_sync module=sync status=ok action=update");
                }
            }
        }
        Ok(result)
    }

    fn refresh_labels(
        &self,
        events: &mut EventStore,
        mut event: MemorialEvent,
        name: &str,
    ) -> SyncResult<Persisted<SyncOutcome>> {
        event.title = birthday_title(name);
        event.description = Some(birthday_description(name));
        let mut result = Persisted::clean(SyncOutcome::default());
        if result.absorb(events.update(event)?) {
            result.value.updated += 1;
        }
        info!("event=birthday_sync module=sync status=ok action=rename");
        Ok(result)
    }

    fn remove_derived(
        &self,
        events: &mut EventStore,
        contact_id: &str,
    ) -> SyncResult<Persisted<SyncOutcome>> {
        let ids: Vec<EventId> = events
            .derived_for_contact(contact_id)
            .into_iter()
            .map(|event| event.id.clone())
            .collect();

        let mut result = Persisted::clean(SyncOutcome::default());
        for id in ids {
            if result.absorb(events.delete(&id)?) {
                result.value.deleted += 1;
            }
        }
        if result.value.deleted > 0 {
            info!(
                "event=birthday_sync module=sync status=ok action=delete count={}",
                result.value.deleted
            );
        }
        Ok(result)
    }

    fn build_event(
        &self,
        id: EventId,
        contact: &Contact,
        date: NaiveDate,
        title: String,
        description: String,
    ) -> MemorialEvent {
        MemorialEvent {
            id,
            title,
            date,
            description: Some(description),
            category: Some(self.template.category.clone()),
            is_important: true,
            reminder_days: self.template.reminder_days.clone(),
            color: self.template.color.clone(),
            budget: Some(0.0),
            spent: Some(0.0),
            related_contact_id: Some(contact.id.clone()),
            contacts: Vec::new(),
        }
    }
}
