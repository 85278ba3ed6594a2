//! Application settings and paths.
//!
//! Manages XDG-compliant paths for configuration and data, and the settings
//! file that holds the session schedule and the attendance table location.

use crate::error::{ConfigError, ConfigResult};
use crate::types::Session;
use chrono::NaiveTime;
use directories::{ProjectDirs, UserDirs};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the attendance spreadsheet.
pub const RECORDS_FILE_NAME: &str = "student_attendance_records.xlsx";

/// Application directory paths following XDG Base Directory Specification.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Configuration directory (~/.config/rollbook)
    pub config_dir: PathBuf,
    /// Data directory (~/.local/share/rollbook)
    pub data_dir: PathBuf,
    /// User documents directory, where the spreadsheet lives by default.
    pub documents_dir: Option<PathBuf>,
}

impl Paths {
    /// Discover paths using XDG directories.
    pub fn discover() -> ConfigResult<Self> {
        let project = ProjectDirs::from("com", "rollbook", "rollbook")
            .ok_or(ConfigError::DirectoryNotFound)?;

        let documents_dir = UserDirs::new()
            .and_then(|dirs| dirs.document_dir().map(Path::to_path_buf));

        let paths = Self {
            config_dir: project.config_dir().to_path_buf(),
            data_dir: project.data_dir().to_path_buf(),
            documents_dir,
        };
        paths.ensure_dirs()?;

        Ok(paths)
    }

    /// Keep every file under a single root directory.
    pub fn rooted(root: impl Into<PathBuf>) -> ConfigResult<Self> {
        let root = root.into();
        let paths = Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
            documents_dir: None,
        };
        paths.ensure_dirs()?;

        Ok(paths)
    }

    fn ensure_dirs(&self) -> ConfigResult<()> {
        fs::create_dir_all(&self.config_dir)?;
        fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }

    /// Get the path to the settings file.
    pub fn settings_file(&self) -> PathBuf {
        self.config_dir.join("settings.json")
    }

    /// Get the path to the SMTP settings file.
    pub fn email_file(&self) -> PathBuf {
        self.config_dir.join("email.json")
    }

    /// Get the path to the notification recipients file.
    pub fn recipients_file(&self) -> PathBuf {
        self.config_dir.join("recipients.json")
    }

    /// Get the path to the admin credentials file.
    pub fn admins_file(&self) -> PathBuf {
        self.config_dir.join("admins.json")
    }

    /// Get the path to the student registry.
    pub fn students_file(&self) -> PathBuf {
        self.config_dir.join("students.json")
    }

    /// Get the path to the notification sent log.
    pub fn sent_log_file(&self) -> PathBuf {
        self.data_dir.join("sent_log.json")
    }

    /// Default location of the attendance spreadsheet.
    pub fn default_records_file(&self) -> PathBuf {
        self.documents_dir
            .as_deref()
            .unwrap_or(&self.data_dir)
            .join(RECORDS_FILE_NAME)
    }
}

/// Read a JSON file, falling back to the default value if it does not exist.
pub(crate) fn read_json_or_default<T>(path: &Path) -> ConfigResult<T>
where
    T: DeserializeOwned + Default,
{
    if !path.exists() {
        return Ok(T::default());
    }

    let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    serde_json::from_str(&content).map_err(|e| ConfigError::InvalidFormat(format!(
        "{}: {}",
        path.display(),
        e
    )))
}

/// Write a value as pretty JSON, creating the parent directory if needed.
pub(crate) fn write_json<T: Serialize>(path: &Path, value: &T) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content).map_err(|e| ConfigError::WriteFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// A scheduled session and the time it starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSlot {
    /// Session label.
    pub name: Session,
    /// Start time, `HH:MM`.
    pub starts_at: String,
}

impl SessionSlot {
    /// Create a new slot.
    pub fn new(name: Session, starts_at: impl Into<String>) -> Self {
        Self {
            name,
            starts_at: starts_at.into(),
        }
    }

    /// Parse the start time.
    pub fn start_time(&self) -> ConfigResult<NaiveTime> {
        NaiveTime::parse_from_str(self.starts_at.trim(), "%H:%M").map_err(|_| {
            ConfigError::InvalidValue(format!(
                "session '{}' has invalid start time '{}', expected HH:MM",
                self.name, self.starts_at
            ))
        })
    }
}

/// Application-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Attendance spreadsheet location; the documents folder if unset.
    pub attendance_file: Option<PathBuf>,
    /// Daily session schedule, used to pick the default session.
    pub sessions: Vec<SessionSlot>,
    /// Only send absence notices for submissions dated today.
    pub notify_only_today: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            attendance_file: None,
            sessions: vec![
                SessionSlot::new(Session::morning(), "09:00"),
                SessionSlot::new(Session::afternoon(), "13:00"),
            ],
            notify_only_today: true,
        }
    }
}

impl AppSettings {
    /// Load settings from the configuration directory.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let settings: Self = read_json_or_default(&paths.settings_file())?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a specific file.
    pub fn load_from(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let settings: Self = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to the configuration directory.
    pub fn save(&self, paths: &Paths) -> ConfigResult<()> {
        write_json(&paths.settings_file(), self)
    }

    /// Validate the session schedule.
    pub fn validate(&self) -> ConfigResult<()> {
        for slot in &self.sessions {
            slot.start_time()?;
        }
        Ok(())
    }

    /// Resolve the attendance spreadsheet location.
    pub fn attendance_file(&self, paths: &Paths) -> PathBuf {
        self.attendance_file
            .clone()
            .unwrap_or_else(|| paths.default_records_file())
    }

    /// The session in progress at `time`: the latest slot that has started,
    /// or the first slot of the day before any has.
    pub fn session_at(&self, time: NaiveTime) -> Option<Session> {
        let mut slots: Vec<(NaiveTime, &Session)> = self
            .sessions
            .iter()
            .filter_map(|slot| slot.start_time().ok().map(|t| (t, &slot.name)))
            .collect();
        slots.sort_by_key(|(t, _)| *t);

        slots
            .iter()
            .rev()
            .find(|(start, _)| *start <= time)
            .or_else(|| slots.first())
            .map(|(_, name)| (*name).clone())
    }
}
