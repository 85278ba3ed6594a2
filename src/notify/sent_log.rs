//! Record of notices already delivered.
//!
//! Resubmitting a morning session must not email the same absence twice, so
//! every delivered notice is remembered by its `(date, session, student)` key.

use crate::config::{read_json_or_default, write_json, Paths};
use crate::error::NotifyResult;
use crate::types::{AttendanceDate, RecordKey};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Persisted set of notified keys.
#[derive(Debug, Clone)]
pub struct SentLog {
    file: PathBuf,
    sent: BTreeSet<RecordKey>,
}

impl SentLog {
    /// Load the log from the data directory.
    pub fn load(paths: &Paths) -> NotifyResult<Self> {
        Self::load_from(paths.sent_log_file())
    }

    /// Load the log from a specific file. A missing file is empty.
    pub fn load_from(file: impl Into<PathBuf>) -> NotifyResult<Self> {
        let file = file.into();
        let sent = read_json_or_default(&file)?;
        Ok(Self { file, sent })
    }

    /// Persist the log.
    pub fn save(&self) -> NotifyResult<()> {
        write_json(&self.file, &self.sent)?;
        Ok(())
    }

    /// Check whether a notice for `key` was already delivered.
    pub fn contains(&self, key: &RecordKey) -> bool {
        self.sent.contains(key)
    }

    /// Remember a delivered notice.
    pub fn record(&mut self, key: RecordKey) {
        self.sent.insert(key);
    }

    /// Number of remembered notices.
    pub fn len(&self) -> usize {
        self.sent.len()
    }

    /// Check if nothing was delivered yet.
    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }

    /// Forget notices dated before `cutoff`. Returns how many were dropped.
    pub fn prune_before(&mut self, cutoff: AttendanceDate) -> usize {
        let before = self.sent.len();
        self.sent.retain(|key| key.date >= cutoff);
        before - self.sent.len()
    }
}
