//! First-run sample data.
//!
//! Pure providers; stores apply them only when empty after `init()`.

use crate::model::calendar::YearlyDate;
use crate::model::contact::Contact;
use crate::model::event::{EventDraft, MemorialEvent};
use chrono::{DateTime, NaiveDate, Utc};

/// Sample contacts stamped with `now`.
pub fn sample_contacts(now: DateTime<Utc>) -> Vec<Contact> {
    let contact = |id: &str,
                   name: &str,
                   phone: &str,
                   email: &str,
                   notes: &str,
                   category: &str,
                   birthday: (i32, u32, u32),
                   is_favorite: bool| Contact {
        id: id.to_string(),
        name: name.to_string(),
        phone: Some(phone.to_string()),
        email: Some(email.to_string()),
        notes: Some(notes.to_string()),
        category: Some(category.to_string()),
        avatar: None,
        birthday: NaiveDate::from_ymd_opt(birthday.0, birthday.1, birthday.2),
        is_favorite,
        created_at: now,
        updated_at: now,
    };

    vec![
        contact(
            "1",
            "Anna Petrova",
            "+7 (999) 123-45-67",
            "anna.petrova@example.com",
            "Sister, birthday on March 15",
            "Family",
            (1990, 3, 15),
            true,
        ),
        contact(
            "2",
            "Mikhail Ivanov",
            "+7 (999) 234-56-78",
            "mikhail.ivanov@example.com",
            "Colleague",
            "Colleagues",
            (1985, 7, 22),
            false,
        ),
        contact(
            "3",
            "Elena Smirnova",
            "+7 (999) 345-67-89",
            "elena.smirnova@example.com",
            "Best friend",
            "Friends",
            (1992, 12, 10),
            true,
        ),
    ]
}

/// Sample user events placed on their next occurrence after `today`.
pub fn sample_events(today: NaiveDate) -> Vec<MemorialEvent> {
    let samples = [
        ("Wedding anniversary", 6, 12, "Anniversary", "#e91e63", Some(300.0)),
        ("Parents' anniversary", 9, 3, "Anniversary", "#9c27b0", Some(150.0)),
        ("Remembrance day", 11, 20, "Memorial", "#607d8b", None),
    ];

    samples
        .into_iter()
        .enumerate()
        .filter_map(|(index, (title, month, day, category, color, budget))| {
            let anchor = NaiveDate::from_ymd_opt(2000, month, day)?;
            let date = YearlyDate::of(anchor).next_on_or_after(today).ok()?;
            let mut draft = EventDraft::new(title, date)
                .with_category(category)
                .with_color(color)
                .with_reminder_days([7, 1]);
            if let Some(amount) = budget {
                draft = draft.with_budget(amount).important();
            }
            let mut event = MemorialEvent::from_draft((index + 1).to_string(), draft);
            event.spent = event.budget.map(|_| 0.0);
            Some(event)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{sample_contacts, sample_events};
    use chrono::{NaiveDate, Utc};

    #[test]
    fn sample_contacts_are_valid_and_uniquely_identified() {
        let contacts = sample_contacts(Utc::now());
        assert_eq!(contacts.len(), 3);
        for contact in &contacts {
            contact.validate().unwrap();
            assert!(contact.birthday.is_some());
        }
        assert_eq!(contacts[0].id, "1");
        assert_eq!(contacts[2].id, "3");
    }

    #[test]
    fn sample_events_are_never_derived_and_not_in_the_past() {
        let today = NaiveDate::from_ymd_opt(2024, 10, 1).unwrap();
        let events = sample_events(today);
        assert_eq!(events.len(), 3);
        for event in &events {
            event.validate().unwrap();
            assert!(!event.is_derived());
            assert!(event.date >= today);
        }
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2025, 6, 12).unwrap());
    }
}
