//! Validation errors raised before any store mutation.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Input rejected by model validation.
///
/// Validation always runs before a store or the birthday engine mutates
/// anything, so a returned error leaves prior state untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Date text is not a real `YYYY-MM-DD` calendar date.
    MalformedDate(String),
    /// Yearly date cannot be placed in the requested year.
    DateOutOfRange { year: i32 },
    /// Contact or attendee name is blank after trim.
    BlankName,
    /// Event title is blank after trim.
    BlankTitle,
    /// Money field is negative or not finite.
    InvalidAmount { field: &'static str },
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedDate(value) => {
                write!(f, "malformed calendar date `{value}`; expected YYYY-MM-DD")
            }
            Self::DateOutOfRange { year } => write!(f, "year {year} is out of supported range"),
            Self::BlankName => write!(f, "name must not be blank"),
            Self::BlankTitle => write!(f, "event title must not be blank"),
            Self::InvalidAmount { field } => {
                write!(f, "`{field}` must be a finite non-negative amount")
            }
        }
    }
}

impl Error for ValidationError {}
