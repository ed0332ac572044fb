//! Date-only calendar helpers for yearly reminders.
//!
//! # Responsibility
//! - Parse strict ISO calendar dates from user input.
//! - Accept legacy birthday values that still carry a time component.
//! - Compute the next occurrence of a yearly date.
//!
//! # Invariants
//! - All arithmetic is date-only in the UTC calendar; no local time or DST.
//! - The year of a stored birthday never influences scheduling.
//! - Feb 29 resolves to Feb 28 in non-leap years.

use crate::model::validation::ValidationError;
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("valid iso date regex"));
static LEGACY_DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{4})-(\d{2})-(\d{2})(?:[T ]\S*)?$").expect("valid legacy date regex")
});

/// Month/day pair of a date that repeats every year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearlyDate {
    month: u32,
    day: u32,
}

impl YearlyDate {
    /// Drops the year component of `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn month(self) -> u32 {
        self.month
    }

    pub fn day(self) -> u32 {
        self.day
    }

    pub fn is_leap_day(self) -> bool {
        self.month == 2 && self.day == 29
    }

    /// Places this month/day in `year`.
    ///
    /// Feb 29 falls back to Feb 28 when `year` is not a leap year. Returns
    /// `None` only when `year` is outside chrono's supported range.
    pub fn in_year(self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).or_else(|| {
            if self.is_leap_day() {
                NaiveDate::from_ymd_opt(year, 2, 28)
            } else {
                None
            }
        })
    }

    /// First occurrence on or after `today`.
    pub fn next_on_or_after(self, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
        let year = today.year();
        let candidate = self
            .in_year(year)
            .ok_or(ValidationError::DateOutOfRange { year })?;
        if candidate >= today {
            return Ok(candidate);
        }

        let next_year = year + 1;
        self.in_year(next_year)
            .ok_or(ValidationError::DateOutOfRange { year: next_year })
    }
}

/// Next occurrence of `birthday` on or after `today`, ignoring its year.
pub fn next_occurrence(birthday: NaiveDate, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    YearlyDate::of(birthday).next_on_or_after(today)
}

/// Parses a strict `YYYY-MM-DD` calendar date.
///
/// Shape is checked before chrono so that lenient forms such as `2024-3-5`
/// are rejected.
pub fn parse_calendar_date(value: &str) -> Result<NaiveDate, ValidationError> {
    parse_with(&ISO_DATE_RE, value)
}

/// Parses a date that may carry a trailing ISO time (`1990-03-15T00:00:00Z`).
///
/// Only the date prefix is kept.
pub fn parse_legacy_date(value: &str) -> Result<NaiveDate, ValidationError> {
    parse_with(&LEGACY_DATE_RE, value)
}

/// Signed number of days from `today` until `date`.
pub fn days_until(date: NaiveDate, today: NaiveDate) -> i64 {
    date.signed_duration_since(today).num_days()
}

fn parse_with(pattern: &Regex, value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    let malformed = || ValidationError::MalformedDate(trimmed.to_string());
    let caps = pattern.captures(trimmed).ok_or_else(malformed)?;

    let year: i32 = caps[1].parse().map_err(|_| malformed())?;
    let month: u32 = caps[2].parse().map_err(|_| malformed())?;
    let day: u32 = caps[3].parse().map_err(|_| malformed())?;
    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(malformed)
}

/// Serde adapter for optional birthdays.
///
/// Writes `YYYY-MM-DD`; reads strict dates, legacy timestamps, `null` and the
/// empty string (treated as "no birthday").
pub mod birthday_serde {
    use super::parse_legacy_date;
    use chrono::NaiveDate;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(text) => parse_legacy_date(text).map(Some).map_err(D::Error::custom),
        }
    }
}
