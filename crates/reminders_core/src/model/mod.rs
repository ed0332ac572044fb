//! Domain model for contacts, memorial events and attendees.
//!
//! # Responsibility
//! - Define the records persisted by the contact and event stores.
//! - Own date-only calendar arithmetic used by birthday scheduling.
//!
//! # Invariants
//! - Record ids are opaque strings, stable for the record lifetime.
//! - Persisted JSON keeps camelCase field names for document compatibility.

pub mod calendar;
pub mod contact;
pub mod event;
pub mod validation;
