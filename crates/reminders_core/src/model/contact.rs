//! Contact domain model.
//!
//! # Responsibility
//! - Define the persisted contact record and its creation draft.
//! - Provide read-side matching used by store queries.
//!
//! # Invariants
//! - `id` is unique and never changes after creation.
//! - `updated_at >= created_at`.
//! - `name` is non-blank.

use crate::model::calendar::{self, parse_calendar_date};
use crate::model::validation::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Opaque stable contact identifier.
pub type ContactId = String;

/// Persisted contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Free-form grouping such as "Family" or "Colleagues".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Avatar URL or initials. Opaque to core.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    /// Full calendar date of birth. Only month/day drive scheduling.
    #[serde(
        default,
        with = "calendar::birthday_serde",
        skip_serializing_if = "Option::is_none"
    )]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub is_favorite: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Contact {
    /// Builds a record from a draft with caller-provided identity and time.
    pub fn from_draft(id: impl Into<ContactId>, draft: ContactDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            name: draft.name,
            phone: draft.phone,
            email: draft.email,
            notes: draft.notes,
            category: draft.category,
            avatar: draft.avatar,
            birthday: draft.birthday,
            is_favorite: draft.is_favorite,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }

    /// Case-insensitive substring match across name, phone, email and notes.
    ///
    /// `lowered_query` must already be lowercase.
    pub(crate) fn matches_lowered(&self, lowered_query: &str) -> bool {
        let hit = |value: Option<&str>| {
            value.is_some_and(|text| text.to_lowercase().contains(lowered_query))
        };
        hit(Some(self.name.as_str()))
            || hit(self.phone.as_deref())
            || hit(self.email.as_deref())
            || hit(self.notes.as_deref())
    }
}

/// User-supplied data for a new contact.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactDraft {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub category: Option<String>,
    pub avatar: Option<String>,
    pub birthday: Option<NaiveDate>,
    pub is_favorite: bool,
}

impl ContactDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_birthday(mut self, birthday: NaiveDate) -> Self {
        self.birthday = Some(birthday);
        self
    }

    /// Sets the birthday from `YYYY-MM-DD` text.
    ///
    /// # Errors
    /// - `ValidationError::MalformedDate` when the text is not a real date.
    pub fn with_birthday_str(self, birthday: &str) -> Result<Self, ValidationError> {
        let parsed = parse_calendar_date(birthday)?;
        Ok(self.with_birthday(parsed))
    }

    pub fn favorite(mut self) -> Self {
        self.is_favorite = true;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_name(&self.name)
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{Contact, ContactDraft};
    use crate::model::validation::ValidationError;
    use chrono::{NaiveDate, TimeZone, Utc};

    fn sample() -> Contact {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap();
        Contact::from_draft(
            "c1",
            ContactDraft::new("Anna Petrova")
                .with_phone("+7 999 123")
                .with_email("Anna@Example.com")
                .with_notes("Sister"),
            now,
        )
    }

    #[test]
    fn search_match_is_case_insensitive_across_fields() {
        let contact = sample();
        assert!(contact.matches_lowered("anna"));
        assert!(contact.matches_lowered("example.com"));
        assert!(contact.matches_lowered("999"));
        assert!(contact.matches_lowered("sister"));
        assert!(!contact.matches_lowered("colleague"));
    }

    #[test]
    fn draft_rejects_blank_name_and_bad_birthday() {
        assert_eq!(
            ContactDraft::new("   ").validate(),
            Err(ValidationError::BlankName)
        );
        assert!(ContactDraft::new("Anna")
            .with_birthday_str("1990-02-31")
            .is_err());
    }

    #[test]
    fn json_uses_camel_case_and_reads_legacy_birthday() {
        let json = r#"{
            "id": "1",
            "name": "Anna",
            "birthday": "1990-03-15T00:00:00.000Z",
            "isFavorite": true,
            "createdAt": "2024-01-01T00:00:00Z",
            "updatedAt": "2024-01-02T00:00:00Z"
        }"#;
        let contact: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.birthday, NaiveDate::from_ymd_opt(1990, 3, 15));
        assert!(contact.is_favorite);

        let written = serde_json::to_value(&contact).unwrap();
        assert_eq!(written["birthday"], "1990-03-15");
        assert_eq!(written["isFavorite"], true);
        assert!(written.get("phone").is_none());
    }

    #[test]
    fn empty_birthday_string_reads_as_none() {
        let json = r#"{"id":"1","name":"A","birthday":"","createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}"#;
        let contact: Contact = serde_json::from_str(json).unwrap();
        assert_eq!(contact.birthday, None);
        assert!(!contact.is_favorite);
    }
}
