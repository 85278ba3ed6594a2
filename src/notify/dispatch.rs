//! Delivery of a batch of notices with duplicate suppression.

use super::{AbsenceNotice, Notifier, SentLog};
use crate::error::NotifyResult;
use serde::Serialize;
use tracing::warn;

/// What happened to each notice of a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Students whose notice was delivered.
    pub sent: Vec<String>,
    /// Students skipped because they were notified before.
    pub already_sent: Vec<String>,
    /// Students whose notice failed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl DispatchReport {
    /// Check if every notice was delivered or already sent.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Deliver `notices`, skipping any already in `log`, and persist the log.
///
/// A failed notice does not stop the others. The error case is reserved for
/// failing to save the log after delivery.
pub fn dispatch(
    notifier: &dyn Notifier,
    log: &mut SentLog,
    notices: &[AbsenceNotice],
) -> NotifyResult<DispatchReport> {
    let mut report = DispatchReport::default();

    for notice in notices {
        let key = notice.key();
        if log.contains(&key) {
            report.already_sent.push(notice.student.clone());
            continue;
        }

        match notifier.notify(notice) {
            Ok(()) => {
                log.record(key);
                report.sent.push(notice.student.clone());
            }
            Err(e) => {
                warn!(student = %notice.student, error = %e, "failed to send absence notification");
                report.failed.push((notice.student.clone(), e.to_string()));
            }
        }
    }

    if !report.sent.is_empty() {
        log.save()?;
    }

    Ok(report)
}
