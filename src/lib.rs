//! # Rollbook - An Attendance Book Backed by a Spreadsheet
//!
//! Rollbook records which students were present or absent for each day and
//! session, keeping the results in a single Excel workbook that opens in any
//! spreadsheet application.
//!
//! ## Features
//!
//! - **Upsert Semantics**: Resubmitting a session replaces its rows instead of
//!   duplicating them
//! - **Sessions**: Morning and afternoon by default, with a configurable schedule
//! - **Legacy Tables**: Tables written before sessions existed are read as morning rows
//! - **Absence Notices**: Morning absentees are reported by email, once each
//! - **Admin Accounts**: argon2-hashed passwords guard every command
//! - **Multiple Output Formats**: Plain text, JSON, and CSV
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use rollbook::storage::AttendanceStore;
//! use rollbook::types::{Status, StudentMark};
//!
//! let store = AttendanceStore::open("attendance.xlsx");
//! let batch = vec![
//!     StudentMark::new("Alice", Status::Present),
//!     StudentMark::new("Bob", Status::Absent),
//! ];
//!
//! let result = store.submit(&batch, "Morning", "2024-01-01").unwrap();
//! println!("absent: {:?}", result.absentees);
//! ```
//!
//! ## Architecture
//!
//! - [`types`] - Dates, sessions, statuses and attendance rows
//! - [`storage`] - The attendance table and its merge logic
//! - [`registry`] - Registered students and admin accounts
//! - [`notify`] - Absence notices over SMTP
//! - [`config`] - Paths, settings and email configuration
//! - [`error`] - Error types
//! - [`output`] - Output formatting utilities

pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod output;
pub mod registry;
pub mod storage;
pub mod types;

// Re-export commonly used types
pub use error::{AttendanceError, CliError};
pub use storage::{AttendanceStore, SubmitResult};
pub use types::{AttendanceDate, AttendanceRecord, Session, Status, StudentMark};
