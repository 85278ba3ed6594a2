//! The attendance store.
//!
//! Merges submitted batches into the persisted table with last-write-wins
//! semantics on the `(date, session, student)` key.

use super::table::{TableBackend, XlsxTable};
use crate::error::{AttendanceError, AttendanceResult};
use crate::types::{AttendanceDate, AttendanceRecord, RecordKey, Session, Status, StudentMark};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, warn};

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmitResult {
    /// Whether the table was written.
    pub written: bool,
    /// Submission date.
    pub date: AttendanceDate,
    /// Submission session.
    pub session: Session,
    /// Number of marks in the batch.
    pub submitted: usize,
    /// Rows in the table after the merge.
    pub total_rows: usize,
    /// Students marked absent in the morning session, in batch order.
    pub absentees: Vec<String>,
}

/// Attendance counts for one student.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StudentSummary {
    pub student: String,
    pub present: usize,
    pub absent: usize,
    pub late: usize,
    pub excused: usize,
}

impl StudentSummary {
    fn new(student: &str) -> Self {
        Self {
            student: student.to_string(),
            ..Self::default()
        }
    }

    fn count(&mut self, status: Status) {
        match status {
            Status::Present => self.present += 1,
            Status::Absent => self.absent += 1,
            Status::Late => self.late += 1,
            Status::Excused => self.excused += 1,
        }
    }

    /// Total sessions recorded for this student.
    pub fn total(&self) -> usize {
        self.present + self.absent + self.late + self.excused
    }
}

/// Owns the persisted attendance table.
///
/// `submit` is a read-modify-write of the whole table. Calls on one store are
/// serialised by an internal lock; separate processes writing the same file
/// are not coordinated, so there must be a single writer per file.
pub struct AttendanceStore<B: TableBackend = XlsxTable> {
    backend: B,
    lock: Mutex<()>,
}

impl AttendanceStore<XlsxTable> {
    /// Open the store backed by the spreadsheet at `path`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self::new(XlsxTable::new(path))
    }
}

impl<B: TableBackend> AttendanceStore<B> {
    /// Create a store over any table backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing table.
    pub fn location(&self) -> &Path {
        self.backend.location()
    }

    /// Get the backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Merge a batch of marks for one date and session into the table.
    ///
    /// The date is validated before anything is read, so a malformed date
    /// leaves the table untouched. An unreadable table aborts the submission
    /// with [`AttendanceError::PersistenceRead`]; see
    /// [`recover_unreadable`](Self::recover_unreadable).
    pub fn submit(
        &self,
        batch: &[StudentMark],
        session: &str,
        date: &str,
    ) -> AttendanceResult<SubmitResult> {
        let date: AttendanceDate = date.parse()?;
        let session: Session = session.parse()?;

        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        let existing = self.backend.read()?.unwrap_or_default();
        let incoming: Vec<AttendanceRecord> = batch
            .iter()
            .map(|mark| AttendanceRecord::new(date, session.clone(), &mark.student, mark.status))
            .collect();

        let before = existing.len();
        let merged = merge(existing, incoming);
        debug!(before, after = merged.len(), batch = batch.len(), "merged attendance batch");

        self.backend.write(&merged)?;

        let absentees = absentees(batch, &session);
        info!(
            %date,
            %session,
            submitted = batch.len(),
            absent = absentees.len(),
            "attendance saved to {}",
            self.location().display()
        );

        Ok(SubmitResult {
            written: true,
            date,
            session,
            submitted: batch.len(),
            total_rows: merged.len(),
            absentees,
        })
    }

    /// Read the whole table. A missing table is empty.
    pub fn load(&self) -> AttendanceResult<Vec<AttendanceRecord>> {
        Ok(self.backend.read()?.unwrap_or_default())
    }

    /// Rows for one date, optionally narrowed to one session.
    pub fn records_for(
        &self,
        date: AttendanceDate,
        session: Option<&Session>,
    ) -> AttendanceResult<Vec<AttendanceRecord>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|r| r.date == date)
            .filter(|r| session.map_or(true, |s| &r.session == s))
            .collect())
    }

    /// Per-student status counts, in order of first appearance.
    pub fn summary(&self) -> AttendanceResult<Vec<StudentSummary>> {
        Ok(summarize(&self.load()?))
    }

    /// Move an unreadable table aside so the next submission starts from an
    /// empty table. Returns the new location of the old file, or `None` if
    /// the table was readable (or missing) and nothing was moved.
    pub fn recover_unreadable(&self) -> AttendanceResult<Option<PathBuf>> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        match self.backend.read() {
            Ok(_) => Ok(None),
            Err(AttendanceError::PersistenceRead { reason, .. }) => {
                warn!(%reason, "attendance table is unreadable, setting it aside");
                self.backend.set_aside()
            }
            Err(e) => Err(e),
        }
    }
}

/// Concatenate `existing` and `incoming` and keep only the last occurrence of
/// each key. Survivors keep the position of their last occurrence.
pub fn merge(
    existing: Vec<AttendanceRecord>,
    incoming: Vec<AttendanceRecord>,
) -> Vec<AttendanceRecord> {
    let combined: Vec<AttendanceRecord> = existing.into_iter().chain(incoming).collect();

    let mut last: HashMap<RecordKey, usize> = HashMap::with_capacity(combined.len());
    for (i, record) in combined.iter().enumerate() {
        last.insert(record.key(), i);
    }

    combined
        .into_iter()
        .enumerate()
        .filter(|(i, record)| last.get(&record.key()) == Some(i))
        .map(|(_, record)| record)
        .collect()
}

/// Students to notify: absent in the morning session only.
pub fn absentees(batch: &[StudentMark], session: &Session) -> Vec<String> {
    if !session.is_morning() {
        return Vec::new();
    }

    batch
        .iter()
        .filter(|mark| mark.status.is_absent())
        .map(|mark| mark.student.clone())
        .collect()
}

/// Count statuses per student.
pub fn summarize(records: &[AttendanceRecord]) -> Vec<StudentSummary> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut summaries: Vec<StudentSummary> = Vec::new();

    for record in records {
        let i = *index.entry(record.student.as_str()).or_insert_with(|| {
            summaries.push(StudentSummary::new(&record.student));
            summaries.len() - 1
        });
        summaries[i].count(record.status);
    }

    summaries
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::fs;

    /// In-memory backend that can be told to fail writes.
    #[derive(Default)]
    struct MemoryTable {
        rows: Mutex<Option<Vec<AttendanceRecord>>>,
        fail_writes: bool,
        writes: Mutex<usize>,
    }

    impl TableBackend for MemoryTable {
        fn location(&self) -> &Path {
            Path::new("memory")
        }

        fn read(&self) -> AttendanceResult<Option<Vec<AttendanceRecord>>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        fn write(&self, records: &[AttendanceRecord]) -> AttendanceResult<()> {
            if self.fail_writes {
                return Err(AttendanceError::PersistenceWrite {
                    path: PathBuf::from("memory"),
                    reason: "disk full".to_string(),
                });
            }
            *self.writes.lock().unwrap() += 1;
            *self.rows.lock().unwrap() = Some(records.to_vec());
            Ok(())
        }

        fn set_aside(&self) -> AttendanceResult<Option<PathBuf>> {
            Ok(self.rows.lock().unwrap().take().map(|_| PathBuf::from("memory.old")))
        }
    }

    fn marks(entries: &[(&str, Status)]) -> Vec<StudentMark> {
        entries
            .iter()
            .map(|(name, status)| StudentMark::new(*name, *status))
            .collect()
    }

    fn xlsx_store(dir: &tempfile::TempDir) -> (AttendanceStore, PathBuf) {
        let path = dir.path().join("records.xlsx");
        (AttendanceStore::open(&path), path)
    }

    #[test]
    fn test_fresh_start_writes_single_row() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = xlsx_store(&dir);

        let result = store
            .submit(&marks(&[("Bob", Status::Present)]), "Morning", "2024-01-01")
            .unwrap();

        assert!(result.written);
        assert_eq!(result.total_rows, 1);
        assert_eq!(
            store.load().unwrap(),
            vec![AttendanceRecord::new(
                "2024-01-01".parse().unwrap(),
                Session::morning(),
                "Bob",
                Status::Present
            )]
        );
    }

    #[test]
    fn test_resubmitting_same_batch_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = xlsx_store(&dir);
        let batch = marks(&[("Alice", Status::Present), ("Bob", Status::Absent)]);

        store.submit(&batch, "Morning", "2024-01-01").unwrap();
        let once = store.load().unwrap();

        store.submit(&batch, "Morning", "2024-01-01").unwrap();
        let twice = store.load().unwrap();

        assert_eq!(once, twice);
        assert_eq!(twice.len(), 2);
        assert!(path.exists());
    }

    #[test]
    fn test_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = xlsx_store(&dir);

        store
            .submit(&marks(&[("Alice", Status::Present)]), "Morning", "2024-01-01")
            .unwrap();
        store
            .submit(&marks(&[("Alice", Status::Absent)]), "Morning", "2024-01-01")
            .unwrap();

        let rows = store.load().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].status, Status::Absent);
    }

    #[test]
    fn test_keys_stay_unique_across_submissions() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = xlsx_store(&dir);
        let batch = marks(&[("Alice", Status::Present), ("Bob", Status::Late)]);

        for (session, date) in [
            ("Morning", "2024-01-01"),
            ("Afternoon", "2024-01-01"),
            ("Morning", "2024-01-01"),
            ("Morning", "2024-01-02"),
            ("afternoon", "2024-01-01"),
        ] {
            store.submit(&batch, session, date).unwrap();
        }

        let rows = store.load().unwrap();
        let keys: HashSet<RecordKey> = rows.iter().map(AttendanceRecord::key).collect();
        assert_eq!(keys.len(), rows.len());
        assert_eq!(rows.len(), 6);
    }

    #[test]
    fn test_concurrent_submits_on_one_store_are_serialised() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = xlsx_store(&dir);
        let batch = marks(&[
            ("Alice", Status::Present),
            ("Bob", Status::Absent),
            ("Carol", Status::Late),
        ]);
        let slots: Vec<(String, &str)> = (1..=6)
            .flat_map(|day| {
                let date = format!("2024-03-{:02}", day);
                [(date.clone(), "Morning"), (date, "Afternoon")]
            })
            .collect();

        std::thread::scope(|scope| {
            for (date, session) in &slots {
                let (store, batch) = (&store, &batch);
                scope.spawn(move || store.submit(batch, session, date).unwrap());
            }
        });

        let rows = store.load().unwrap();
        let keys: HashSet<RecordKey> = rows.iter().map(AttendanceRecord::key).collect();
        assert_eq!(keys.len(), rows.len());
        assert_eq!(rows.len(), slots.len() * batch.len());
        for (date, session) in &slots {
            for mark in &batch {
                let key = RecordKey {
                    date: date.parse().unwrap(),
                    session: session.parse().unwrap(),
                    student: mark.student.clone(),
                };
                assert!(keys.contains(&key), "missing {:?}", key);
            }
        }
    }

    #[test]
    fn test_replaced_rows_move_to_position_of_last_occurrence() {
        let date: AttendanceDate = "2024-01-01".parse().unwrap();
        let existing = vec![
            AttendanceRecord::new(date, Session::morning(), "Alice", Status::Present),
            AttendanceRecord::new(date, Session::morning(), "Bob", Status::Present),
        ];
        let incoming = vec![AttendanceRecord::new(date, Session::morning(), "Alice", Status::Absent)];

        let merged = merge(existing, incoming);
        let order: Vec<(&str, Status)> = merged
            .iter()
            .map(|r| (r.student.as_str(), r.status))
            .collect();
        assert_eq!(order, vec![("Bob", Status::Present), ("Alice", Status::Absent)]);
    }

    #[test]
    fn test_afternoon_absences_are_not_reported() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = xlsx_store(&dir);

        let result = store
            .submit(
                &marks(&[("Alice", Status::Absent), ("Bob", Status::Absent)]),
                "Afternoon",
                "2024-01-01",
            )
            .unwrap();

        assert!(result.absentees.is_empty());
    }

    #[test]
    fn test_morning_absentees_in_batch_order() {
        let dir = tempfile::tempdir().unwrap();
        let (store, _) = xlsx_store(&dir);

        let result = store
            .submit(
                &marks(&[
                    ("Zoe", Status::Absent),
                    ("Alice", Status::Present),
                    ("Bob", Status::Absent),
                    ("Carol", Status::Late),
                ]),
                "Morning",
                "2024-01-01",
            )
            .unwrap();

        assert_eq!(result.absentees, vec!["Zoe".to_string(), "Bob".to_string()]);
    }

    #[test]
    fn test_invalid_date_leaves_table_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = xlsx_store(&dir);
        store
            .submit(&marks(&[("Alice", Status::Present)]), "Morning", "2024-01-01")
            .unwrap();
        let before = fs::read(&path).unwrap();

        let err = store
            .submit(&marks(&[("Alice", Status::Absent)]), "Morning", "2024-13-40")
            .unwrap_err();

        assert!(matches!(err, AttendanceError::InvalidInput(_)));
        assert_eq!(fs::read(&path).unwrap(), before);
    }

    #[test]
    fn test_invalid_date_does_not_touch_backend() {
        let store = AttendanceStore::new(MemoryTable::default());
        let err = store
            .submit(&marks(&[("Alice", Status::Absent)]), "Morning", "not a date")
            .unwrap_err();

        assert!(matches!(err, AttendanceError::InvalidInput(_)));
        assert_eq!(*store.backend().writes.lock().unwrap(), 0);
    }

    #[test]
    fn test_empty_session_is_invalid_input() {
        let store = AttendanceStore::new(MemoryTable::default());
        let err = store
            .submit(&marks(&[("Alice", Status::Present)]), "  ", "2024-01-01")
            .unwrap_err();
        assert!(matches!(err, AttendanceError::InvalidInput(_)));
    }

    #[test]
    fn test_unreadable_table_is_reported_not_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = xlsx_store(&dir);
        fs::write(&path, "not,a\nreal,table\n").unwrap();

        let err = store
            .submit(&marks(&[("Alice", Status::Present)]), "Morning", "2024-01-01")
            .unwrap_err();

        assert!(matches!(err, AttendanceError::PersistenceRead { .. }));
        assert_eq!(fs::read_to_string(&path).unwrap(), "not,a\nreal,table\n");
    }

    #[test]
    fn test_recover_unreadable_then_submit() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = xlsx_store(&dir);
        fs::write(&path, "not,a\nreal,table\n").unwrap();

        let moved = store.recover_unreadable().unwrap().unwrap();
        assert_eq!(fs::read_to_string(&moved).unwrap(), "not,a\nreal,table\n");

        let result = store
            .submit(&marks(&[("Alice", Status::Present)]), "Morning", "2024-01-01")
            .unwrap();
        assert_eq!(result.total_rows, 1);
    }

    #[test]
    fn test_recover_readable_table_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let (store, path) = xlsx_store(&dir);
        store
            .submit(&marks(&[("Alice", Status::Present)]), "Morning", "2024-01-01")
            .unwrap();

        assert!(store.recover_unreadable().unwrap().is_none());
        assert!(path.exists());
    }

    #[test]
    fn test_write_failure_is_reported() {
        let backend = MemoryTable {
            fail_writes: true,
            ..MemoryTable::default()
        };
        let store = AttendanceStore::new(backend);

        let err = store
            .submit(&marks(&[("Alice", Status::Absent)]), "Morning", "2024-01-01")
            .unwrap_err();

        assert!(matches!(err, AttendanceError::PersistenceWrite { .. }));
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_records_for_filters_by_slot() {
        let store = AttendanceStore::new(MemoryTable::default());
        let batch = marks(&[("Alice", Status::Present)]);
        store.submit(&batch, "Morning", "2024-01-01").unwrap();
        store.submit(&batch, "Afternoon", "2024-01-01").unwrap();
        store.submit(&batch, "Morning", "2024-01-02").unwrap();

        let date = "2024-01-01".parse().unwrap();
        assert_eq!(store.records_for(date, None).unwrap().len(), 2);
        assert_eq!(
            store
                .records_for(date, Some(&Session::afternoon()))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_summary_counts_per_student() {
        let store = AttendanceStore::new(MemoryTable::default());
        store
            .submit(
                &marks(&[("Alice", Status::Present), ("Bob", Status::Absent)]),
                "Morning",
                "2024-01-01",
            )
            .unwrap();
        store
            .submit(
                &marks(&[("Alice", Status::Late), ("Bob", Status::Absent)]),
                "Afternoon",
                "2024-01-01",
            )
            .unwrap();

        let summary = store.summary().unwrap();
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].student, "Alice");
        assert_eq!((summary[0].present, summary[0].late), (1, 1));
        assert_eq!(summary[1].absent, 2);
        assert_eq!(summary[1].total(), 2);
    }
}
