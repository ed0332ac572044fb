//! Memorial event and attendee model.
//!
//! # Responsibility
//! - Define the persisted event record and its user-facing draft.
//! - Define attendees stored denormalized on events, and the matching rules
//!   used for deduplication and contact resolution.
//!
//! # Invariants
//! - `title` is non-blank; `budget`/`spent` are finite and non-negative.
//! - `reminder_days` holds no duplicates and keeps insertion order.
//! - `related_contact_id` is set only on derived birthday events.

use crate::model::contact::{validate_name, Contact, ContactId};
use crate::model::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Opaque stable event identifier.
pub type EventId = String;

/// Persisted memorial event (birthday, anniversary, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorialEvent {
    pub id: EventId,
    pub title: String,
    /// Date-only value serialized as `YYYY-MM-DD`.
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default)]
    pub is_important: bool,
    /// Days before `date` on which a reminder is due.
    #[serde(default)]
    pub reminder_days: Vec<u32>,
    /// Display tag, opaque to core.
    #[serde(default)]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spent: Option<f64>,
    /// Back-reference to the source contact of a derived birthday event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_contact_id: Option<ContactId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<Attendee>,
}

impl MemorialEvent {
    /// Builds a user event from a draft. User events are never derived.
    pub fn from_draft(id: impl Into<EventId>, draft: EventDraft) -> Self {
        Self {
            id: id.into(),
            title: draft.title,
            date: draft.date,
            description: draft.description,
            category: draft.category,
            is_important: draft.is_important,
            reminder_days: draft.reminder_days,
            color: draft.color,
            budget: draft.budget,
            spent: draft.spent,
            related_contact_id: None,
            contacts: draft.contacts,
        }
    }

    /// Whether this event is auto-managed by the birthday engine.
    pub fn is_derived(&self) -> bool {
        self.related_contact_id.is_some()
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_event_fields(&self.title, self.budget, self.spent)
    }

    /// Drops repeated reminder offsets, keeping the first occurrence.
    pub(crate) fn normalize_reminder_days(&mut self) {
        let mut seen = Vec::with_capacity(self.reminder_days.len());
        self.reminder_days.retain(|day| {
            if seen.contains(day) {
                false
            } else {
                seen.push(*day);
                true
            }
        });
    }

    pub(crate) fn matches_lowered(&self, lowered_query: &str) -> bool {
        let hit = |value: Option<&str>| {
            value.is_some_and(|text| text.to_lowercase().contains(lowered_query))
        };
        hit(Some(self.title.as_str()))
            || hit(self.description.as_deref())
            || hit(self.category.as_deref())
    }
}

/// User-supplied data for a new event.
///
/// Has no `related_contact_id`: only the birthday engine creates derived
/// events.
#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category: Option<String>,
    pub is_important: bool,
    pub reminder_days: Vec<u32>,
    pub color: String,
    pub budget: Option<f64>,
    pub spent: Option<f64>,
    pub contacts: Vec<Attendee>,
}

impl EventDraft {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            date,
            description: None,
            category: None,
            is_important: false,
            reminder_days: Vec::new(),
            color: String::new(),
            budget: None,
            spent: None,
            contacts: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_reminder_days(mut self, days: impl IntoIterator<Item = u32>) -> Self {
        self.reminder_days = days.into_iter().collect();
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn important(mut self) -> Self {
        self.is_important = true;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_event_fields(&self.title, self.budget, self.spent)
    }
}

fn validate_event_fields(
    title: &str,
    budget: Option<f64>,
    spent: Option<f64>,
) -> Result<(), ValidationError> {
    if title.trim().is_empty() {
        return Err(ValidationError::BlankTitle);
    }
    validate_amount("budget", budget)?;
    validate_amount("spent", spent)?;
    Ok(())
}

fn validate_amount(field: &'static str, value: Option<f64>) -> Result<(), ValidationError> {
    match value {
        Some(amount) if !amount.is_finite() || amount < 0.0 => {
            Err(ValidationError::InvalidAmount { field })
        }
        _ => Ok(()),
    }
}

/// Contact-like attendee stored on an event.
///
/// With `id` it points at a stored contact; without one it is a free-form
/// snippet that may still match a contact by name and phone/email.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ContactId>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tel: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Borrowed tagged view of an attendee's link state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttendeeLink<'a> {
    /// Attendee refers to a stored contact by id.
    Resolved { contact_id: &'a str },
    /// Free-form snippet.
    Unresolved {
        name: &'a str,
        tel: Option<&'a str>,
        email: Option<&'a str>,
    },
}

impl Attendee {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_tel(mut self, tel: impl Into<String>) -> Self {
        self.tel = Some(tel.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attendee pointing at a stored contact.
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            id: Some(contact.id.clone()),
            name: contact.name.clone(),
            tel: contact.phone.clone(),
            email: contact.email.clone(),
        }
    }

    pub fn link(&self) -> AttendeeLink<'_> {
        match self.id.as_deref() {
            Some(contact_id) => AttendeeLink::Resolved { contact_id },
            None => AttendeeLink::Unresolved {
                name: self.name.as_str(),
                tel: self.tel.as_deref(),
                email: self.email.as_deref(),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }

    /// Deduplication rule for attendees on one event.
    ///
    /// Same `name` and same `tel`, or same `name` and same `email`. Exact,
    /// case-sensitive comparison. An absent value never equals a present
    /// one; two attendees carrying neither `tel` nor `email` match on name.
    pub fn is_same_person(&self, other: &Attendee) -> bool {
        if self.name != other.name {
            return false;
        }
        let tel_match = matches_present(self.tel.as_deref(), other.tel.as_deref());
        let email_match = matches_present(self.email.as_deref(), other.email.as_deref());
        let both_bare = self.has_no_details() && other.has_no_details();
        tel_match || email_match || both_bare
    }

    /// Contact resolution rule: exact `name` plus `phone == tel` or
    /// `email == email`.
    pub fn matches_contact(&self, contact: &Contact) -> bool {
        contact.name == self.name
            && (matches_present(self.tel.as_deref(), contact.phone.as_deref())
                || matches_present(self.email.as_deref(), contact.email.as_deref()))
    }

    fn has_no_details(&self) -> bool {
        self.tel.is_none() && self.email.is_none()
    }
}

fn matches_present(left: Option<&str>, right: Option<&str>) -> bool {
    matches!((left, right), (Some(a), Some(b)) if a == b)
}
