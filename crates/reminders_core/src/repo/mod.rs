//! Contact and event stores over the document store.
//!
//! # Responsibility
//! - Own in-memory mirrors of the contact and event collections.
//! - Flush the full collection after every public mutation.
//!
//! # Invariants
//! - Writes validate records before touching the mirror.
//! - The mirror is updated before the flush is issued.
//! - A missing update/delete target is reported as `false`, never an error.

pub mod collection;
pub mod contact_repo;
pub mod event_repo;

use crate::model::validation::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub use collection::{Persisted, StoreChange, StoreState};

pub type RepoResult<T> = Result<T, RepoError>;

/// Store-level error for rejected mutations.
///
/// Storage failures are not errors here; they ride along in
/// [`Persisted::warnings`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    Validation(ValidationError),
    /// Mutation attempted before `init()` or after `shutdown()`.
    NotOpen {
        collection: &'static str,
        state: StoreState,
    },
    /// Record with caller-provided id already exists.
    DuplicateId(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotOpen { collection, state } => {
                write!(f, "{collection} store is not open (state: {state:?})")
            }
            Self::DuplicateId(id) => write!(f, "record id already exists: {id}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotOpen { .. } | Self::DuplicateId(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}
