//! Use-case services over the contact and event stores.
//!
//! # Responsibility
//! - Keep derived birthday events consistent with contacts.
//! - Link attendees to events without touching contacts.
//! - Expose one facade that orders mutate, sync and flush steps.

pub mod attendee_linker;
pub mod birthday_sync;
pub mod reminders_service;
