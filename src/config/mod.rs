//! Configuration management for Rollbook.
//!
//! Provides XDG-compliant configuration storage: application settings, the
//! session schedule, SMTP settings and notification recipients.

mod email;
mod settings;

pub use email::{EmailSettings, Recipients};
pub use settings::{AppSettings, Paths, SessionSlot, RECORDS_FILE_NAME};

pub(crate) use settings::{read_json_or_default, write_json};
