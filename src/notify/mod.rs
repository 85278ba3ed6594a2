//! Absentee notifications.
//!
//! Best-effort delivery of "student absent" notices for the morning session.
//! Delivery never affects the attendance write: failures are collected in a
//! [`DispatchReport`] for the caller to show.

mod dispatch;
mod sent_log;
mod smtp;

pub use dispatch::{dispatch, DispatchReport};
pub use sent_log::SentLog;
pub use smtp::SmtpNotifier;

use crate::error::NotifyResult;
use crate::storage::SubmitResult;
use crate::types::{AttendanceDate, RecordKey, Session};

/// A notice that one student was absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbsenceNotice {
    pub student: String,
    pub session: Session,
    pub date: AttendanceDate,
}

impl AbsenceNotice {
    /// Create a new notice.
    pub fn new(student: impl Into<String>, session: Session, date: AttendanceDate) -> Self {
        Self {
            student: student.into(),
            session,
            date,
        }
    }

    /// One notice per absentee of a submission.
    pub fn from_submission(result: &SubmitResult) -> Vec<Self> {
        result
            .absentees
            .iter()
            .map(|student| Self::new(student, result.session.clone(), result.date))
            .collect()
    }

    /// Identity used for duplicate suppression.
    pub fn key(&self) -> RecordKey {
        RecordKey {
            date: self.date,
            session: self.session.clone(),
            student: self.student.clone(),
        }
    }

    /// Email subject line.
    pub fn subject(&self) -> String {
        format!(
            "Urgent: Student Absent - {} ({} Session)",
            self.student, self.session
        )
    }

    /// Plain-text email body.
    pub fn body(&self) -> String {
        format!(
            "Dear Authority,\n\n\
             This is an automated notification.\n\n\
             Student: {} is marked ABSENT for the {} session today, {}.\n\n\
             Please take necessary action.\n\n\
             Sincerely,\n\
             Attendance System",
            self.student, self.session, self.date
        )
    }
}

/// Something that can deliver absence notices.
pub trait Notifier {
    /// Deliver one notice.
    fn notify(&self, notice: &AbsenceNotice) -> NotifyResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notice() -> AbsenceNotice {
        AbsenceNotice::new("Alice", Session::morning(), "2024-01-01".parse().unwrap())
    }

    #[test]
    fn test_subject_names_student_and_session() {
        assert_eq!(
            notice().subject(),
            "Urgent: Student Absent - Alice (Morning Session)"
        );
    }

    #[test]
    fn test_body_mentions_date() {
        let body = notice().body();
        assert!(body.contains("Student: Alice is marked ABSENT for the Morning session today, 2024-01-01."));
        assert!(body.ends_with("Attendance System"));
    }

    #[test]
    fn test_from_submission() {
        let result = SubmitResult {
            written: true,
            date: "2024-01-01".parse().unwrap(),
            session: Session::morning(),
            submitted: 3,
            total_rows: 3,
            absentees: vec!["Alice".to_string(), "Bob".to_string()],
        };

        let notices = AbsenceNotice::from_submission(&result);
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[1].student, "Bob");
        assert_eq!(notices[0], notice());
    }
}
