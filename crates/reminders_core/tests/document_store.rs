use chrono::NaiveDate;
use reminders_core::{
    derived_event_id, ContactDraft, CoreConfig, DocumentStore, FixedClock, RemindersService,
    SqliteDocumentStore,
};
use std::sync::Arc;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn sqlite_store_upserts_documents_by_key() {
    let store = SqliteDocumentStore::open_in_memory().unwrap();
    assert!(store.load("sg_contacts_v1").unwrap().is_none());

    store.save("sg_contacts_v1", b"[]").unwrap();
    store.save("sg_contacts_v1", b"[1]").unwrap();
    store.save("sg_events_v1", b"[]").unwrap();

    assert_eq!(store.load("sg_contacts_v1").unwrap().unwrap(), b"[1]".to_vec());
    assert_eq!(store.keys().unwrap(), vec!["sg_contacts_v1", "sg_events_v1"]);
}

#[test]
fn service_state_survives_reopen_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reminders.db");
    let clock = Arc::new(FixedClock::at_date(date(2024, 6, 1)));
    let config = CoreConfig::default();

    let anna_id = {
        let documents = Arc::new(SqliteDocumentStore::open(&path).unwrap());
        let mut service = RemindersService::open(documents, clock.clone(), &config)
            .unwrap()
            .into_value();
        let anna = service
            .create_contact(ContactDraft::new("Anna").with_birthday(date(1990, 3, 15)))
            .unwrap();
        assert!(anna.is_durable());
        assert!(service.shutdown().is_durable());
        anna.into_value().id
    };

    let documents = Arc::new(SqliteDocumentStore::open(&path).unwrap());
    let service = RemindersService::open(documents, clock, &config)
        .unwrap()
        .into_value();

    let anna = service.contacts().get(&anna_id).unwrap();
    assert_eq!(anna.birthday, Some(date(1990, 3, 15)));
    let event = service.events().get(&derived_event_id(&anna_id)).unwrap();
    assert_eq!(event.date, date(2025, 3, 15));
}

#[test]
fn custom_document_keys_are_honored() {
    let documents = Arc::new(SqliteDocumentStore::open_in_memory().unwrap());
    let clock = Arc::new(FixedClock::at_date(date(2024, 6, 1)));
    let config = CoreConfig::from_toml_str(
        r#"
        [storage]
        contacts_key = "people"
        events_key = "dates"
        "#,
    )
    .unwrap();

    let mut service = RemindersService::open(documents.clone(), clock, &config)
        .unwrap()
        .into_value();
    service
        .create_contact(ContactDraft::new("Anna").with_birthday(date(1990, 3, 15)))
        .unwrap();

    assert_eq!(documents.keys().unwrap(), vec!["dates", "people"]);
}
