//! SMTP delivery via `lettre`.

use super::{AbsenceNotice, Notifier};
use crate::config::{EmailSettings, Recipients};
use crate::error::{NotifyError, NotifyResult};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;
use tracing::debug;

/// Port on which servers expect TLS from the first byte.
const IMPLICIT_TLS_PORT: u16 = 465;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Sends each notice as one email to every recipient.
pub struct SmtpNotifier {
    transport: SmtpTransport,
    from: Mailbox,
    to: Vec<Mailbox>,
}

impl SmtpNotifier {
    /// Build a notifier from saved settings.
    ///
    /// Returns `Ok(None)` when the settings are incomplete or there are no
    /// recipients: notifications are then skipped rather than failing.
    pub fn from_settings(
        settings: &EmailSettings,
        recipients: &Recipients,
    ) -> NotifyResult<Option<Self>> {
        if !settings.is_complete() || recipients.is_empty() {
            debug!("email settings or recipients not configured, skipping notifications");
            return Ok(None);
        }

        let from = parse_mailbox(&settings.sender_email)?;
        let to = recipients
            .addresses()
            .iter()
            .map(|address| parse_mailbox(address))
            .collect::<NotifyResult<Vec<_>>>()?;

        let server = settings.smtp_server.trim();
        let builder = if settings.smtp_port == IMPLICIT_TLS_PORT {
            SmtpTransport::relay(server)
        } else {
            SmtpTransport::starttls_relay(server)
        }
        .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let transport = builder
            .port(settings.smtp_port)
            .credentials(Credentials::new(
                settings.sender_email.trim().to_string(),
                settings.sender_password.clone(),
            ))
            .timeout(Some(SMTP_TIMEOUT))
            .build();

        Ok(Some(Self { transport, from, to }))
    }

    /// Build the message for a notice.
    pub fn message(&self, notice: &AbsenceNotice) -> NotifyResult<Message> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .subject(notice.subject())
            .header(ContentType::TEXT_PLAIN);
        for to in &self.to {
            builder = builder.to(to.clone());
        }

        builder
            .body(notice.body())
            .map_err(|e| NotifyError::Message(e.to_string()))
    }
}

impl Notifier for SmtpNotifier {
    fn notify(&self, notice: &AbsenceNotice) -> NotifyResult<()> {
        let message = self.message(notice)?;
        self.transport
            .send(&message)
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        debug!(student = %notice.student, "absence notification sent");
        Ok(())
    }
}

fn parse_mailbox(address: &str) -> NotifyResult<Mailbox> {
    address
        .trim()
        .parse()
        .map_err(|e: lettre::address::AddressError| NotifyError::InvalidAddress {
            address: address.to_string(),
            reason: e.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Session;

    fn settings() -> EmailSettings {
        EmailSettings {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            sender_email: "office@example.com".to_string(),
            sender_password: "app-password".to_string(),
        }
    }

    #[test]
    fn test_incomplete_settings_skip() {
        let recipients = Recipients::from_lines("head@example.com");
        let notifier = SmtpNotifier::from_settings(&EmailSettings::default(), &recipients).unwrap();
        assert!(notifier.is_none());
    }

    #[test]
    fn test_no_recipients_skip() {
        let notifier = SmtpNotifier::from_settings(&settings(), &Recipients::default()).unwrap();
        assert!(notifier.is_none());
    }

    #[test]
    fn test_bad_recipient_address() {
        let recipients = Recipients::from_lines("not an address");
        let err = SmtpNotifier::from_settings(&settings(), &recipients)
            .err()
            .unwrap();
        assert!(matches!(err, NotifyError::InvalidAddress { .. }));
    }

    #[test]
    fn test_message_addresses_every_recipient() {
        let recipients = Recipients::from_lines("head@example.com\nparent@example.com");
        let notifier = SmtpNotifier::from_settings(&settings(), &recipients)
            .unwrap()
            .unwrap();

        let notice = AbsenceNotice::new("Alice", Session::morning(), "2024-01-01".parse().unwrap());
        let message = notifier.message(&notice).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();

        assert!(raw.contains("head@example.com"));
        assert!(raw.contains("parent@example.com"));
        assert!(raw.contains("Subject: Urgent: Student Absent - Alice (Morning Session)"));
    }
}
