//! Error types for Rollbook.
//!
//! Uses `thiserror` for ergonomic error definitions. Each layer has its own
//! enum; `CliError` folds them together for the command handlers.

use crate::types::{DateError, SessionError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the attendance store.
#[derive(Error, Debug)]
pub enum AttendanceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("could not read attendance table {}: {reason}", path.display())]
    PersistenceRead { path: PathBuf, reason: String },

    #[error("could not write attendance table {}: {reason}", path.display())]
    PersistenceWrite { path: PathBuf, reason: String },
}

impl From<DateError> for AttendanceError {
    fn from(e: DateError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

impl From<SessionError> for AttendanceError {
    fn from(e: SessionError) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

/// Result type alias for attendance operations.
pub type AttendanceResult<T> = Result<T, AttendanceError>;

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("could not determine a home directory for configuration")]
    DirectoryNotFound,

    #[error("failed to read {}: {reason}", path.display())]
    ReadFailed { path: PathBuf, reason: String },

    #[error("failed to write {}: {reason}", path.display())]
    WriteFailed { path: PathBuf, reason: String },

    #[error("invalid configuration format: {0}")]
    InvalidFormat(String),

    #[error("invalid setting: {0}")]
    InvalidValue(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ConfigError {
    fn from(e: serde_json::Error) -> Self {
        Self::InvalidFormat(e.to_string())
    }
}

/// Result type alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Student registry errors.
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("student '{0}' is already registered")]
    AlreadyRegistered(String),

    #[error("student '{0}' is not registered")]
    NotRegistered(String),

    #[error("student name cannot be empty")]
    EmptyName,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Admin account errors.
#[derive(Error, Debug)]
pub enum AdminError {
    #[error("admin '{0}' already exists")]
    AlreadyExists(String),

    #[error("admin '{0}' not found")]
    NotFound(String),

    #[error("you cannot remove your own account")]
    CannotRemoveSelf,

    #[error("username and password cannot be empty")]
    EmptyCredentials,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hash(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for admin operations.
pub type AdminResult<T> = Result<T, AdminError>;

/// Notification errors.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("invalid email address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build message: {0}")]
    Message(String),

    #[error("SMTP transport error: {0}")]
    Transport(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type alias for notification operations.
pub type NotifyResult<T> = Result<T, NotifyError>;

/// CLI-level errors.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Attendance(#[from] AttendanceError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persistence_error_mentions_path() {
        let err = AttendanceError::PersistenceWrite {
            path: PathBuf::from("/tmp/records.xlsx"),
            reason: "disk full".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("/tmp/records.xlsx"));
        assert!(msg.contains("disk full"));
    }

    #[test]
    fn test_bad_date_is_invalid_input() {
        let err: AttendanceError = "2024-13-40"
            .parse::<crate::types::AttendanceDate>()
            .unwrap_err()
            .into();
        assert!(matches!(err, AttendanceError::InvalidInput(_)));
    }

    #[test]
    fn test_cli_error_is_transparent() {
        let err: CliError = AdminError::CannotRemoveSelf.into();
        assert_eq!(err.to_string(), "you cannot remove your own account");
    }
}
