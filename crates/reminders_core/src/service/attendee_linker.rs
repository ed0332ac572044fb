//! Event-attendee linker.
//!
//! # Responsibility
//! - Attach and detach attendees stored denormalized on events.
//! - Resolve free-form attendee snippets to stored contacts for display.
//!
//! # Invariants
//! - The contact store is never mutated here.
//! - Resolution is a read-only view; it is not written back to the event.
//! - Missing events and duplicate attendees are no-ops, not errors.

use crate::model::contact::Contact;
use crate::model::event::{Attendee, AttendeeLink};
use crate::repo::contact_repo::ContactStore;
use crate::repo::event_repo::EventStore;
use crate::repo::{Persisted, RepoResult};
use log::debug;

/// Attendee as seen after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedAttendee {
    /// Snippet matched to a stored contact.
    Contact(Contact),
    /// Stored attendee passed through unchanged.
    Attendee(Attendee),
}

/// Stateless linker over the event and contact stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct AttendeeLinker;

impl AttendeeLinker {
    pub fn new() -> Self {
        Self
    }

    /// Appends `attendee` unless the event already has the same person.
    ///
    /// Returns `true` when the attendee list changed.
    pub fn add_attendee(
        &self,
        events: &mut EventStore,
        event_id: &str,
        attendee: Attendee,
    ) -> RepoResult<Persisted<bool>> {
        attendee.validate()?;
        let Some(mut event) = events.get(event_id).cloned() else {
            debug!("event=attendee_add module=linker status=noop reason=event_missing");
            return Ok(Persisted::clean(false));
        };
        if event
            .contacts
            .iter()
            .any(|existing| existing.is_same_person(&attendee))
        {
            debug!("event=attendee_add module=linker status=noop reason=duplicate");
            return Ok(Persisted::clean(false));
        }

        event.contacts.push(attendee);
        events.update(event)
    }

    /// Adds a stored contact as an attendee carrying its id.
    pub fn link_contact(
        &self,
        events: &mut EventStore,
        event_id: &str,
        contact: &Contact,
    ) -> RepoResult<Persisted<bool>> {
        self.add_attendee(events, event_id, Attendee::from_contact(contact))
    }

    /// Removes the first attendee named `name`.
    ///
    /// Returns `true` when an attendee was removed.
    pub fn remove_attendee(
        &self,
        events: &mut EventStore,
        event_id: &str,
        name: &str,
    ) -> RepoResult<Persisted<bool>> {
        let Some(mut event) = events.get(event_id).cloned() else {
            return Ok(Persisted::clean(false));
        };
        let Some(index) = event
            .contacts
            .iter()
            .position(|attendee| attendee.name == name)
        else {
            return Ok(Persisted::clean(false));
        };

        event.contacts.remove(index);
        events.update(event)
    }

    /// Resolves the attendees of `event_id` against stored contacts.
    ///
    /// Snippets without an id become the first contact with the same name and
    /// a matching phone or email. Attendees with an id pass through as-is,
    /// even when the referenced contact no longer exists. Unknown events
    /// yield an empty list.
    pub fn resolve_attendees(
        &self,
        events: &EventStore,
        contacts: &ContactStore,
        event_id: &str,
    ) -> Vec<ResolvedAttendee> {
        let Some(event) = events.get(event_id) else {
            return Vec::new();
        };

        event
            .contacts
            .iter()
            .map(|attendee| match attendee.link() {
                AttendeeLink::Resolved { .. } => ResolvedAttendee::Attendee(attendee.clone()),
                AttendeeLink::Unresolved { .. } => contacts
                    .all()
                    .iter()
                    .find(|contact| attendee.matches_contact(contact))
                    .map(|contact| ResolvedAttendee::Contact(contact.clone()))
                    .unwrap_or_else(|| ResolvedAttendee::Attendee(attendee.clone())),
            })
            .collect()
    }
}
