use chrono::NaiveDate;
use reminders_core::{
    DocumentStore, DueReminder, EventDraft, EventStore, MemoryDocumentStore, RepoError,
    StoreChange, ValidationError,
};
use std::sync::Arc;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn open_store() -> (EventStore, Arc<MemoryDocumentStore>) {
    let documents = Arc::new(MemoryDocumentStore::new());
    let mut store = EventStore::new(documents.clone());
    assert!(store.init().is_durable());
    (store, documents)
}

#[test]
fn create_stores_user_event_and_dedups_reminder_days() {
    let (mut store, documents) = open_store();

    let event = store
        .create(
            EventDraft::new("Anniversary", date(2024, 6, 12))
                .with_reminder_days([7, 1, 7])
                .with_budget(100.0),
        )
        .unwrap()
        .into_value();

    assert!(!event.is_derived());
    assert_eq!(event.reminder_days, vec![7, 1]);
    assert_eq!(store.get(&event.id).unwrap().reminder_days, vec![7, 1]);

    let mut reopened = EventStore::new(documents);
    assert_eq!(reopened.init().value, 1);
    assert_eq!(reopened.get(&event.id).unwrap().title, "Anniversary");
}

#[test]
fn invalid_events_are_rejected_without_writes() {
    let (mut store, documents) = open_store();

    let err = store
        .create(EventDraft::new(" ", date(2024, 6, 12)))
        .unwrap_err();
    assert_eq!(err, RepoError::Validation(ValidationError::BlankTitle));

    let err = store
        .create(EventDraft::new("Party", date(2024, 6, 12)).with_budget(-5.0))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::InvalidAmount { field: "budget" })
    ));

    assert!(store.is_empty());
    assert!(documents.load("sg_events_v1").unwrap().is_none());
}

#[test]
fn insert_with_existing_id_is_rejected() {
    let (mut store, _documents) = open_store();
    let event = store
        .create(EventDraft::new("Party", date(2024, 6, 12)))
        .unwrap()
        .into_value();

    let err = store.insert(event.clone()).unwrap_err();
    assert_eq!(err, RepoError::DuplicateId(event.id));
    assert_eq!(store.len(), 1);
}

#[test]
fn update_and_delete_report_presence() {
    let (mut store, _documents) = open_store();
    let mut event = store
        .create(EventDraft::new("Party", date(2024, 6, 12)))
        .unwrap()
        .into_value();

    event.title = "Garden party".to_string();
    assert!(store.update(event.clone()).unwrap().value);
    assert_eq!(store.search("garden").len(), 1);

    assert!(store.delete(&event.id).unwrap().value);
    assert!(!store.delete(&event.id).unwrap().value);
    assert!(!store.update(event.clone()).unwrap().value);

    let changes = store.drain_changes();
    assert_eq!(changes.len(), 3);
    assert_eq!(changes[2], StoreChange::Deleted(event.id));
}

#[test]
fn upcoming_returns_events_within_horizon_sorted_by_date() {
    let (mut store, _documents) = open_store();
    let today = date(2024, 6, 1);
    for (title, day) in [("Later", date(2024, 6, 20)), ("Today", today), ("Soon", date(2024, 6, 5))] {
        store.create(EventDraft::new(title, day)).unwrap();
    }
    store
        .create(EventDraft::new("Past", date(2024, 5, 31)))
        .unwrap();

    let titles: Vec<&str> = store
        .upcoming(today, 7)
        .into_iter()
        .map(|event| event.title.as_str())
        .collect();
    assert_eq!(titles, vec!["Today", "Soon"]);
    assert_eq!(store.upcoming(today, 30).len(), 3);
}

#[test]
fn due_reminders_fire_on_offsets_and_event_day() {
    let (mut store, _documents) = open_store();
    let today = date(2024, 6, 1);
    let week_out = store
        .create(EventDraft::new("Week out", date(2024, 6, 8)).with_reminder_days([7, 1]))
        .unwrap()
        .into_value();
    let same_day = store
        .create(EventDraft::new("Same day", today))
        .unwrap()
        .into_value();
    store
        .create(EventDraft::new("Not yet", date(2024, 6, 4)).with_reminder_days([1]))
        .unwrap();

    let due = store.due_reminders(today);
    assert_eq!(
        due,
        vec![
            DueReminder {
                event_id: same_day.id,
                title: "Same day".to_string(),
                date: today,
                days_left: 0,
            },
            DueReminder {
                event_id: week_out.id,
                title: "Week out".to_string(),
                date: date(2024, 6, 8),
                days_left: 7,
            },
        ]
    );
}

#[test]
fn sample_events_seed_once() {
    let (mut store, _documents) = open_store();
    let today = date(2024, 10, 1);

    let seeded = store
        .ensure_sample_data(|| reminders_core::seed::sample_events(today))
        .unwrap();
    assert_eq!(seeded.value, 3);
    assert!(store.derived().is_empty());

    let again = store
        .ensure_sample_data(|| reminders_core::seed::sample_events(today))
        .unwrap();
    assert_eq!(again.value, 0);
}
