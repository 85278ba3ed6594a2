//! Core type definitions using newtype patterns for type safety.
//!
//! Dates and sessions are validated at parse time, so the store never has to
//! re-check them.

mod date;
mod record;
mod session;

pub use date::{AttendanceDate, DateError, DATE_FORMAT};
pub use record::{AttendanceRecord, RecordKey, Status, StudentMark};
pub use session::{Session, SessionError};
