//! Submit subcommand implementation.
//!
//! Handles `rollbook submit`: builds one mark per registered student, merges
//! them into the attendance table and notifies about morning absentees.

use super::{Context, OutputFormat};
use crate::config::{EmailSettings, Recipients};
use crate::error::{AttendanceError, CliError, CliResult};
use crate::notify::{dispatch, AbsenceNotice, SentLog, SmtpNotifier};
use crate::output;
use crate::registry::StudentRegistry;
use crate::storage::SubmitResult;
use crate::types::{AttendanceDate, Status, StudentMark};
use chrono::Local;
use clap::Parser;
use std::collections::HashMap;
use tracing::debug;

/// Mark attendance for a session and save it.
#[derive(Parser, Debug)]
pub struct SubmitCommand {
    /// Date of the session, YYYY-MM-DD (defaults to today)
    #[arg(short, long, value_name = "DATE")]
    pub date: Option<String>,

    /// Session name (defaults to the session in progress per the schedule)
    #[arg(short, long, value_name = "SESSION")]
    pub session: Option<String>,

    /// Mark a student absent (repeatable)
    #[arg(short, long, value_name = "STUDENT")]
    pub absent: Vec<String>,

    /// Set a student's status explicitly, e.g. "Alice=late" (repeatable)
    #[arg(short, long, value_name = "STUDENT=STATUS", value_parser = parse_mark)]
    pub mark: Vec<(String, Status)>,

    /// Status for every student not otherwise marked
    #[arg(long, value_name = "STATUS", default_value = "present", value_parser = parse_status)]
    pub default_status: Status,

    /// Move an unreadable attendance table aside and start a new one
    #[arg(long)]
    pub recover: bool,

    /// Do not send absence notifications
    #[arg(long)]
    pub no_notify: bool,

    /// Send absence notifications even when the date is not today
    #[arg(long)]
    pub notify_any_date: bool,

    /// Output format for the result
    #[arg(short = 'f', long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

fn parse_status(s: &str) -> Result<Status, String> {
    s.parse()
}

fn parse_mark(s: &str) -> Result<(String, Status), String> {
    let (student, status) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected STUDENT=STATUS, got '{}'", s))?;
    let student = student.trim();
    if student.is_empty() {
        return Err(format!("missing student name in '{}'", s));
    }
    Ok((student.to_string(), status.parse()?))
}

impl SubmitCommand {
    /// Execute the submit command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        ctx.login()?;

        let registry = StudentRegistry::load(&ctx.paths)?;
        let batch = self.build_batch(registry.list())?;

        let date = self
            .date
            .clone()
            .unwrap_or_else(|| AttendanceDate::today().to_string());
        let session = match &self.session {
            Some(session) => session.clone(),
            None => ctx
                .settings
                .session_at(Local::now().time())
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    CliError::Other("no session given and the schedule is empty".to_string())
                })?,
        };

        let store = ctx.store();
        if self.recover {
            if let Some(moved) = store.recover_unreadable()? {
                output::print_warning(&format!(
                    "Unreadable attendance table moved to {}",
                    moved.display()
                ));
            }
        }

        let result = match store.submit(&batch, &session, &date) {
            Ok(result) => result,
            Err(e @ AttendanceError::PersistenceRead { .. }) => {
                output::print_warning(
                    "The existing table was left untouched. Fix it by hand, or rerun with --recover to set it aside.",
                );
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        let location = store.location().display().to_string();
        match self.format {
            OutputFormat::Json => output::print_json(&result)?,
            _ if ctx.quiet => {}
            _ => output::print_submit_result(&result, &location),
        }

        self.notify(ctx, &result);

        Ok(())
    }

    /// One mark per registered student, in registration order.
    fn build_batch(&self, students: &[String]) -> CliResult<Vec<StudentMark>> {
        if students.is_empty() {
            return Err(CliError::Other(
                "no students registered; add some with `rollbook students register`".to_string(),
            ));
        }

        let mut overrides: HashMap<&str, Status> = HashMap::new();
        for name in &self.absent {
            overrides.insert(name.trim(), Status::Absent);
        }
        for (name, status) in &self.mark {
            overrides.insert(name.as_str(), *status);
        }

        if let Some(unknown) = overrides
            .keys()
            .find(|name| !students.iter().any(|s| s == *name))
        {
            return Err(CliError::Other(format!("'{}' is not a registered student", unknown)));
        }

        Ok(students
            .iter()
            .map(|student| {
                let status = overrides
                    .get(student.as_str())
                    .copied()
                    .unwrap_or(self.default_status);
                StudentMark::new(student.as_str(), status)
            })
            .collect())
    }

    /// Send absence notices. Problems are reported, never returned.
    fn notify(&self, ctx: &Context, result: &SubmitResult) {
        if self.no_notify || result.absentees.is_empty() {
            return;
        }

        if ctx.settings.notify_only_today && !self.notify_any_date && !result.date.is_today() {
            debug!(date = %result.date, "not today, skipping absence notifications");
            if !ctx.quiet {
                output::print_info("Date is not today; absence notifications were not sent.");
            }
            return;
        }

        let notifier = EmailSettings::load(&ctx.paths)
            .and_then(|settings| Ok((settings, Recipients::load(&ctx.paths)?)))
            .map_err(CliError::from)
            .and_then(|(settings, recipients)| {
                Ok(SmtpNotifier::from_settings(&settings, &recipients)?)
            });

        let notifier = match notifier {
            Ok(Some(notifier)) => notifier,
            Ok(None) => {
                if !ctx.quiet {
                    output::print_info(
                        "Email settings or recipients not configured; skipping notifications.",
                    );
                }
                return;
            }
            Err(e) => {
                output::print_warning(&format!("Absence notifications not sent: {}", e));
                return;
            }
        };

        let notices = AbsenceNotice::from_submission(result);
        let report = SentLog::load(&ctx.paths)
            .and_then(|mut log| dispatch(&notifier, &mut log, &notices));

        match report {
            Ok(report) => output::print_dispatch_report(&report),
            Err(e) => output::print_warning(&format!("Absence notifications: {}", e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(args: &[&str]) -> SubmitCommand {
        let mut argv = vec!["submit"];
        argv.extend_from_slice(args);
        SubmitCommand::try_parse_from(argv).unwrap()
    }

    fn roster() -> Vec<String> {
        vec!["Alice".to_string(), "Bob".to_string(), "Carol".to_string()]
    }

    #[test]
    fn test_parse_mark() {
        assert_eq!(
            parse_mark("Mary Ann = late").unwrap(),
            ("Mary Ann".to_string(), Status::Late)
        );
        assert!(parse_mark("Alice").is_err());
        assert!(parse_mark("=absent").is_err());
        assert!(parse_mark("Alice=sleepy").is_err());
    }

    #[test]
    fn test_batch_follows_registry_order() {
        let cmd = command(&["--absent", "Carol", "--mark", "Alice=late"]);
        let batch = cmd.build_batch(&roster()).unwrap();

        assert_eq!(
            batch,
            vec![
                StudentMark::new("Alice", Status::Late),
                StudentMark::new("Bob", Status::Present),
                StudentMark::new("Carol", Status::Absent),
            ]
        );
    }

    #[test]
    fn test_default_status_applies_to_unmarked() {
        let cmd = command(&["--default-status", "absent", "--mark", "Bob=present"]);
        let batch = cmd.build_batch(&roster()).unwrap();
        let absent: Vec<&str> = batch
            .iter()
            .filter(|m| m.status.is_absent())
            .map(|m| m.student.as_str())
            .collect();
        assert_eq!(absent, vec!["Alice", "Carol"]);
    }

    #[test]
    fn test_unknown_student_rejected() {
        let cmd = command(&["--absent", "Mallory"]);
        assert!(cmd.build_batch(&roster()).is_err());
    }

    #[test]
    fn test_empty_registry_rejected() {
        let cmd = command(&[]);
        assert!(cmd.build_batch(&[]).is_err());
    }
}
