//! Session labels.
//!
//! A session is a named attendance slot within a day. "Morning" and
//! "Afternoon" are canonical; any other non-empty label is accepted verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MORNING: &str = "Morning";
const AFTERNOON: &str = "Afternoon";

/// A named attendance slot.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Session(String);

impl Session {
    /// The morning session. Absentee notifications are scoped to it.
    pub fn morning() -> Self {
        Self(MORNING.to_string())
    }

    /// The afternoon session.
    pub fn afternoon() -> Self {
        Self(AFTERNOON.to_string())
    }

    /// Get the label.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if this is the morning session.
    pub fn is_morning(&self) -> bool {
        self.0 == MORNING
    }
}

impl fmt::Display for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Session {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(SessionError::Empty);
        }

        if s.eq_ignore_ascii_case(MORNING) {
            Ok(Self::morning())
        } else if s.eq_ignore_ascii_case(AFTERNOON) {
            Ok(Self::afternoon())
        } else {
            Ok(Self(s.to_string()))
        }
    }
}

impl TryFrom<String> for Session {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Session> for String {
    fn from(session: Session) -> Self {
        session.0
    }
}

/// Error type for session parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("session label cannot be empty")]
    Empty,
}
