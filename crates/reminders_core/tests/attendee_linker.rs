use chrono::NaiveDate;
use reminders_core::{
    Attendee, ContactDraft, CoreConfig, EventDraft, FixedClock, MemoryDocumentStore,
    RemindersService, ResolvedAttendee, SyncError, ValidationError,
};
use std::sync::Arc;

fn open_with_event() -> (RemindersService, String) {
    let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
    let clock = Arc::new(FixedClock::at_date(today));
    let documents = Arc::new(MemoryDocumentStore::new());
    let mut service = RemindersService::open(documents, clock, &CoreConfig::default())
        .unwrap()
        .into_value();
    let event = service
        .create_event(EventDraft::new("Dinner", NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()))
        .unwrap()
        .into_value();
    (service, event.id)
}

fn attendee_names(service: &RemindersService, event_id: &str) -> Vec<String> {
    service
        .events()
        .get(event_id)
        .unwrap()
        .contacts
        .iter()
        .map(|attendee| attendee.name.clone())
        .collect()
}

#[test]
fn adding_identical_attendee_twice_keeps_one() {
    let (mut service, event_id) = open_with_event();
    let bob = Attendee::new("Bob").with_tel("123");

    assert!(service.add_attendee(&event_id, bob.clone()).unwrap().value);
    assert!(!service.add_attendee(&event_id, bob).unwrap().value);

    assert_eq!(attendee_names(&service, &event_id), vec!["Bob"]);
}

#[test]
fn dedup_is_exact_and_case_sensitive() {
    let (mut service, event_id) = open_with_event();
    service
        .add_attendee(&event_id, Attendee::new("Bob").with_tel("123"))
        .unwrap();

    service
        .add_attendee(
            &event_id,
            Attendee::new("Bob").with_tel("999").with_email("bob@example.com"),
        )
        .unwrap();
    // Same name and email, different phone.
    service
        .add_attendee(
            &event_id,
            Attendee::new("Bob").with_tel("777").with_email("bob@example.com"),
        )
        .unwrap();
    service
        .add_attendee(&event_id, Attendee::new("bob").with_tel("123"))
        .unwrap();

    assert_eq!(attendee_names(&service, &event_id), vec!["Bob", "Bob", "bob"]);
}

#[test]
fn add_then_remove_restores_prior_list() {
    let (mut service, event_id) = open_with_event();
    service
        .add_attendee(&event_id, Attendee::new("Alice").with_email("a@example.com"))
        .unwrap();
    let before = service.events().get(&event_id).unwrap().contacts.clone();

    service
        .add_attendee(&event_id, Attendee::new("Carol"))
        .unwrap();
    assert!(service.remove_attendee(&event_id, "Carol").unwrap().value);

    assert_eq!(service.events().get(&event_id).unwrap().contacts, before);
    assert!(!service.remove_attendee(&event_id, "Carol").unwrap().value);
}

#[test]
fn missing_event_is_a_noop() {
    let (mut service, _event_id) = open_with_event();

    assert!(!service
        .add_attendee("missing", Attendee::new("Bob"))
        .unwrap()
        .value);
    assert!(!service.remove_attendee("missing", "Bob").unwrap().value);
    assert!(service.resolve_attendees("missing").is_empty());
}

#[test]
fn blank_attendee_name_is_rejected() {
    let (mut service, event_id) = open_with_event();

    let err = service
        .add_attendee(&event_id, Attendee::new("  "))
        .unwrap_err();
    assert_eq!(err, SyncError::Validation(ValidationError::BlankName));
    assert!(attendee_names(&service, &event_id).is_empty());
}

#[test]
fn resolve_substitutes_matching_contacts_without_persisting() {
    let (mut service, event_id) = open_with_event();
    let anna = service
        .create_contact(
            ContactDraft::new("Anna")
                .with_phone("555")
                .with_email("anna@example.com"),
        )
        .unwrap()
        .into_value();
    let contacts_before = service.contacts().all().to_vec();

    service
        .add_attendee(&event_id, Attendee::new("Anna").with_email("anna@example.com"))
        .unwrap();
    service
        .add_attendee(&event_id, Attendee::new("Anna").with_tel("000"))
        .unwrap();
    service
        .add_attendee(&event_id, Attendee::new("Stranger"))
        .unwrap();

    let resolved = service.resolve_attendees(&event_id);
    assert_eq!(resolved.len(), 3);
    assert_eq!(resolved[0], ResolvedAttendee::Contact(anna));
    assert_eq!(
        resolved[1],
        ResolvedAttendee::Attendee(Attendee::new("Anna").with_tel("000"))
    );
    assert_eq!(
        resolved[2],
        ResolvedAttendee::Attendee(Attendee::new("Stranger"))
    );

    let stored = &service.events().get(&event_id).unwrap().contacts;
    assert!(stored.iter().all(|attendee| attendee.id.is_none()));
    assert_eq!(service.contacts().all(), contacts_before.as_slice());
}

#[test]
fn linked_contact_passes_through_even_when_stale() {
    let (mut service, event_id) = open_with_event();
    let anna = service
        .create_contact(ContactDraft::new("Anna").with_phone("555"))
        .unwrap()
        .into_value();

    assert!(service.link_contact(&event_id, &anna.id).unwrap().value);
    assert!(!service.link_contact(&event_id, &anna.id).unwrap().value);
    assert!(!service.link_contact(&event_id, "missing").unwrap().value);

    service.delete_contact(&anna.id).unwrap();
    let resolved = service.resolve_attendees(&event_id);
    assert_eq!(
        resolved,
        vec![ResolvedAttendee::Attendee(Attendee::from_contact(&anna))]
    );
}
