//! Calendar dates for attendance records.
//!
//! `AttendanceDate` only exists for valid `YYYY-MM-DD` dates, so every date
//! that reaches the store has already been parsed.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Format used in the spreadsheet and on the command line.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A validated calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AttendanceDate(NaiveDate);

impl AttendanceDate {
    /// Today's date in the local timezone.
    pub fn today() -> Self {
        Self(Local::now().date_naive())
    }

    /// Wrap an already-valid date.
    pub const fn from_naive(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Get the underlying date.
    pub const fn as_naive(&self) -> NaiveDate {
        self.0
    }

    /// Check whether this date is today.
    pub fn is_today(&self) -> bool {
        *self == Self::today()
    }
}

impl fmt::Display for AttendanceDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for AttendanceDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Self)
            .map_err(|_| DateError::Invalid(s.to_string()))
    }
}

impl TryFrom<String> for AttendanceDate {
    type Error = DateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AttendanceDate> for String {
    fn from(date: AttendanceDate) -> Self {
        date.to_string()
    }
}

/// Error type for date parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Invalid(String),
}
