//! CLI entry point.
//!
//! # Responsibility
//! - Open a reminders database, roll derived birthdays forward and print
//!   the reminders due today.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `reminders_cli [DB_PATH] [CONFIG_PATH]`. Without a database path
//! an in-memory store is used.

use reminders_core::{
    init_logging_from_config, CoreConfig, DocumentStore, Persisted, RemindersService,
    SqliteDocumentStore, SystemClock,
};
use std::error::Error;
use std::sync::Arc;

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let db_path = args.next();
    let config_path = args.next();

    println!("reminders_core ping={}", reminders_core::ping());
    println!("reminders_core version={}", reminders_core::core_version());

    let config = match config_path {
        Some(path) => CoreConfig::load(path)?,
        None => CoreConfig::default(),
    };
    init_logging_from_config(&config.logging)?;

    let documents: Arc<dyn DocumentStore> = match db_path.as_deref() {
        Some(path) => Arc::new(SqliteDocumentStore::open(path)?),
        None => Arc::new(SqliteDocumentStore::open_in_memory()?),
    };

    let opened = RemindersService::open(documents, Arc::new(SystemClock), &config)?;
    report_warnings("open", &opened);
    let mut service = opened.into_value();

    let rolled = service.roll_forward()?;
    report_warnings("roll_forward", &rolled);
    let outcome = rolled.into_value();
    println!(
        "contacts={} events={} rolled_forward={}",
        service.contacts().len(),
        service.events().len(),
        outcome.updated
    );

    for reminder in service.due_reminders() {
        println!(
            "due event={} date={} days_left={} title={}",
            reminder.event_id, reminder.date, reminder.days_left, reminder.title
        );
    }

    let closed = service.shutdown();
    report_warnings("shutdown", &closed);
    Ok(())
}

fn report_warnings<T>(stage: &str, result: &Persisted<T>) {
    for warning in &result.warnings {
        log::warn!("event=cli_warning module=cli status=degraded stage={stage}");
        eprintln!("warning ({stage}): {warning}");
    }
}
