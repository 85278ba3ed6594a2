//! Attendance persistence.
//!
//! `AttendanceStore` owns the merge rules; `TableBackend` is the whole-table
//! storage it reads and rewrites, implemented for spreadsheet files by
//! `XlsxTable`.

mod store;
mod table;

pub use store::{absentees, merge, summarize, AttendanceStore, StudentSummary, SubmitResult};
pub use table::{TableBackend, XlsxTable, COLUMNS};
