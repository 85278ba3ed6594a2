//! SMTP settings and notification recipients.

use super::settings::{read_json_or_default, write_json, Paths};
use crate::error::ConfigResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// SMTP settings used for absence notifications.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    pub smtp_server: String,
    pub smtp_port: u16,
    pub sender_email: String,
    pub sender_password: String,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            smtp_server: String::new(),
            smtp_port: 587,
            sender_email: String::new(),
            sender_password: String::new(),
        }
    }
}

// Keeps the password out of logs.
impl fmt::Debug for EmailSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmailSettings")
            .field("smtp_server", &self.smtp_server)
            .field("smtp_port", &self.smtp_port)
            .field("sender_email", &self.sender_email)
            .field("sender_password", &"<redacted>")
            .finish()
    }
}

impl EmailSettings {
    /// Load settings from the configuration directory.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        read_json_or_default(&paths.email_file())
    }

    /// Save settings to the configuration directory.
    pub fn save(&self, paths: &Paths) -> ConfigResult<()> {
        write_json(&paths.email_file(), self)
    }

    /// Check that every field needed to send mail is filled in.
    pub fn is_complete(&self) -> bool {
        !self.smtp_server.trim().is_empty()
            && self.smtp_port != 0
            && !self.sender_email.trim().is_empty()
            && !self.sender_password.is_empty()
    }
}

/// Email addresses that receive absence notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Recipients(Vec<String>);

impl Recipients {
    /// Build a recipient list from newline-separated text, skipping blanks.
    pub fn from_lines(text: &str) -> Self {
        Self(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// Load recipients from the configuration directory.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        read_json_or_default(&paths.recipients_file())
    }

    /// Save recipients to the configuration directory.
    pub fn save(&self, paths: &Paths) -> ConfigResult<()> {
        write_json(&paths.recipients_file(), self)
    }

    /// Get the addresses.
    pub fn addresses(&self) -> &[String] {
        &self.0
    }

    /// Check if there is nobody to notify.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_email_settings_incomplete() {
        let settings = EmailSettings::default();
        assert_eq!(settings.smtp_port, 587);
        assert!(!settings.is_complete());
    }

    #[test]
    fn test_complete_email_settings() {
        let settings = EmailSettings {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            sender_email: "office@example.com".to_string(),
            sender_password: "app-password".to_string(),
        };
        assert!(settings.is_complete());
    }

    #[test]
    fn test_debug_redacts_password() {
        let settings = EmailSettings {
            sender_password: "hunter2".to_string(),
            ..EmailSettings::default()
        };
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_recipients_from_lines() {
        let recipients = Recipients::from_lines("head@example.com\n\n  parent@example.com  \n");
        assert_eq!(
            recipients.addresses(),
            ["head@example.com", "parent@example.com"]
        );
    }

    #[test]
    fn test_email_files_roundtrip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let paths = Paths::rooted(dir.path()).unwrap();

        assert!(Recipients::load(&paths).unwrap().is_empty());

        Recipients::from_lines("a@example.com").save(&paths).unwrap();
        assert_eq!(Recipients::load(&paths).unwrap().addresses(), ["a@example.com"]);

        let settings = EmailSettings {
            smtp_server: "smtp.example.com".to_string(),
            ..EmailSettings::default()
        };
        settings.save(&paths).unwrap();
        assert_eq!(EmailSettings::load(&paths).unwrap(), settings);
    }
}
