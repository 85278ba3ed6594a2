//! Email subcommand implementation.
//!
//! Handles `rollbook email` for configuring absence notifications.

use super::{prompt_secret, Context};
use crate::config::{EmailSettings, Recipients};
use crate::error::{CliError, CliResult};
use crate::notify::{AbsenceNotice, Notifier, SentLog, SmtpNotifier};
use crate::output;
use crate::types::{AttendanceDate, Session};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

/// Configure absence notifications.
#[derive(Parser, Debug)]
pub struct EmailCommand {
    #[command(subcommand)]
    pub action: EmailAction,
}

/// Email configuration actions.
#[derive(Subcommand, Debug)]
pub enum EmailAction {
    /// Show SMTP settings and recipients
    Show,

    /// Update SMTP settings
    Set {
        /// SMTP server host
        #[arg(long)]
        server: Option<String>,

        /// SMTP port (465 for implicit TLS, otherwise STARTTLS)
        #[arg(long)]
        port: Option<u16>,

        /// Sender address, also used as the SMTP login
        #[arg(long)]
        sender: Option<String>,

        /// Prompt for the sender password
        #[arg(long)]
        prompt_password: bool,
    },

    /// Replace the recipient list with addresses read one per line
    Recipients {
        /// File to read addresses from (stdin if omitted)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Send a sample notice to every recipient
    Test,

    /// Forget sent notices dated before a day
    Prune {
        /// Cutoff date (YYYY-MM-DD); earlier entries are dropped
        #[arg(long, value_name = "DATE")]
        before: AttendanceDate,
    },
}

impl EmailCommand {
    /// Execute the email command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        ctx.login()?;

        match &self.action {
            EmailAction::Show => self.show(ctx),
            EmailAction::Set {
                server,
                port,
                sender,
                prompt_password,
            } => {
                let mut settings = EmailSettings::load(&ctx.paths)?;
                apply_changes(&mut settings, server.as_deref(), *port, sender.as_deref());
                if *prompt_password {
                    settings.sender_password = prompt_secret("Sender password: ")?;
                }
                settings.save(&ctx.paths)?;

                if !ctx.quiet {
                    output::print_success("Email settings saved");
                    if !settings.is_complete() {
                        output::print_warning(
                            "Settings are incomplete; notifications will be skipped.",
                        );
                    }
                }
                Ok(())
            }
            EmailAction::Recipients { file } => {
                let text = match file {
                    Some(path) => fs::read_to_string(path)?,
                    None => {
                        let mut text = String::new();
                        io::stdin().read_to_string(&mut text)?;
                        text
                    }
                };
                let recipients = Recipients::from_lines(&text);
                recipients.save(&ctx.paths)?;
                if !ctx.quiet {
                    output::print_success(&format!(
                        "{} recipients saved",
                        recipients.addresses().len()
                    ));
                }
                Ok(())
            }
            EmailAction::Test => {
                let settings = EmailSettings::load(&ctx.paths)?;
                let recipients = Recipients::load(&ctx.paths)?;
                let notifier =
                    SmtpNotifier::from_settings(&settings, &recipients)?.ok_or_else(|| {
                        CliError::Other(
                            "email settings or recipients are not configured".to_string(),
                        )
                    })?;

                let notice =
                    AbsenceNotice::new("Test Student", Session::morning(), AttendanceDate::today());
                notifier.notify(&notice)?;
                if !ctx.quiet {
                    output::print_success(&format!(
                        "Test notice sent to {} recipients",
                        recipients.addresses().len()
                    ));
                }
                Ok(())
            }
            EmailAction::Prune { before } => {
                let mut log = SentLog::load(&ctx.paths)?;
                let removed = log.prune_before(*before);
                log.save()?;
                if !ctx.quiet {
                    output::print_success(&format!("{} sent-notice entries removed", removed));
                }
                Ok(())
            }
        }
    }

    fn show(&self, ctx: &Context) -> CliResult<()> {
        let settings = EmailSettings::load(&ctx.paths)?;
        let recipients = Recipients::load(&ctx.paths)?;

        let password = if settings.sender_password.is_empty() {
            "(not set)"
        } else {
            "********"
        };
        println!("SMTP server:  {}", settings.smtp_server);
        println!("SMTP port:    {}", settings.smtp_port);
        println!("Sender:       {}", settings.sender_email);
        println!("Password:     {}", password);
        println!();

        if recipients.is_empty() {
            println!("No recipients configured.");
        } else {
            println!("Recipients:");
            for address in recipients.addresses() {
                println!("  {}", address);
            }
        }

        Ok(())
    }
}

fn apply_changes(
    settings: &mut EmailSettings,
    server: Option<&str>,
    port: Option<u16>,
    sender: Option<&str>,
) {
    if let Some(server) = server {
        settings.smtp_server = server.trim().to_string();
    }
    if let Some(port) = port {
        settings.smtp_port = port;
    }
    if let Some(sender) = sender {
        settings.sender_email = sender.trim().to_string();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_changes_keeps_unset_fields() {
        let mut settings = EmailSettings {
            smtp_server: "smtp.example.com".to_string(),
            smtp_port: 587,
            sender_email: "office@example.com".to_string(),
            sender_password: "secret".to_string(),
        };

        apply_changes(&mut settings, None, Some(465), Some(" head@example.com "));

        assert_eq!(settings.smtp_server, "smtp.example.com");
        assert_eq!(settings.smtp_port, 465);
        assert_eq!(settings.sender_email, "head@example.com");
        assert_eq!(settings.sender_password, "secret");
    }

    #[test]
    fn test_parse_prune() {
        let cmd = EmailCommand::try_parse_from(["email", "prune", "--before", "2024-02-01"]).unwrap();
        match cmd.action {
            EmailAction::Prune { before } => assert_eq!(before.to_string(), "2024-02-01"),
            other => panic!("unexpected action: {:?}", other),
        }
    }
}
