//! Core domain logic for personal reminders.
//! Contacts, memorial events and the birthday events derived between them.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod seed;
pub mod service;
pub mod storage;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{BirthdayConfig, ConfigError, CoreConfig, LoggingConfig, StorageConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::calendar::{next_occurrence, parse_calendar_date, YearlyDate};
pub use model::contact::{Contact, ContactDraft, ContactId};
pub use model::event::{Attendee, AttendeeLink, EventDraft, EventId, MemorialEvent};
pub use model::validation::ValidationError;
pub use repo::contact_repo::ContactStore;
pub use repo::event_repo::{DueReminder, EventStore};
pub use repo::{Persisted, RepoError, RepoResult, StoreChange, StoreState};
pub use service::attendee_linker::{AttendeeLinker, ResolvedAttendee};
pub use service::birthday_sync::{derived_event_id, BirthdaySync, SyncError, SyncOutcome, SyncResult};
pub use service::reminders_service::RemindersService;
pub use storage::{DocumentStore, MemoryDocumentStore, SqliteDocumentStore, StorageError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
