//! Attendance records and their composite key.

use super::{AttendanceDate, Session};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Attendance status of a student for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Status {
    Present,
    Absent,
    Late,
    Excused,
}

impl Status {
    /// All statuses, in display order.
    pub const ALL: [Status; 4] = [Self::Present, Self::Absent, Self::Late, Self::Excused];

    /// Check if the student was absent.
    pub fn is_absent(self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl Default for Status {
    fn default() -> Self {
        Self::Present
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Present => write!(f, "Present"),
            Self::Absent => write!(f, "Absent"),
            Self::Late => write!(f, "Late"),
            Self::Excused => write!(f, "Excused"),
        }
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "present" | "p" => Ok(Self::Present),
            "absent" | "a" => Ok(Self::Absent),
            "late" | "l" => Ok(Self::Late),
            "excused" | "e" => Ok(Self::Excused),
            _ => Err(format!("unknown status: {}", s.trim())),
        }
    }
}

/// Stored tables only carry the exact labels. Short forms are for typing.
impl TryFrom<String> for Status {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|status| status.to_string() == value.trim())
            .ok_or_else(|| format!("unknown status: {}", value.trim()))
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.to_string()
    }
}

/// One row of the attendance table.
///
/// Field names match the spreadsheet columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceRecord {
    #[serde(rename = "Date")]
    pub date: AttendanceDate,
    #[serde(rename = "Session")]
    pub session: Session,
    #[serde(rename = "Student")]
    pub student: String,
    #[serde(rename = "Status")]
    pub status: Status,
}

impl AttendanceRecord {
    /// Create a new record.
    pub fn new(
        date: AttendanceDate,
        session: Session,
        student: impl Into<String>,
        status: Status,
    ) -> Self {
        Self {
            date,
            session,
            student: student.into(),
            status,
        }
    }

    /// The identity of this record in the table.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            date: self.date,
            session: self.session.clone(),
            student: self.student.clone(),
        }
    }
}

/// Composite identity of a record: at most one row per key is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordKey {
    pub date: AttendanceDate,
    pub session: Session,
    pub student: String,
}

/// A status chosen for one student in a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentMark {
    pub student: String,
    pub status: Status,
}

impl StudentMark {
    /// Create a new mark.
    pub fn new(student: impl Into<String>, status: Status) -> Self {
        Self {
            student: student.into(),
            status,
        }
    }
}
