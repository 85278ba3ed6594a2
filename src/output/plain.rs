//! Plain text output formatting.
//!
//! Produces human-readable output with colors and formatting.

use crate::notify::DispatchReport;
use crate::storage::{StudentSummary, SubmitResult};
use crate::types::{AttendanceRecord, Status};
use console::{style, Style};
use std::io::{self, Write};

const RULE: &str = "───────────────────────────────────────────────────────────────";

fn status_style(status: Status) -> Style {
    match status {
        Status::Present => Style::new().green(),
        Status::Absent => Style::new().red().bold(),
        Status::Late => Style::new().yellow(),
        Status::Excused => Style::new().cyan(),
    }
}

/// Print rows as a table.
pub fn print_plain(records: &[AttendanceRecord]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    if records.is_empty() {
        writeln!(out, "  {}", style("No attendance recorded.").dim())?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "  {}", style(RULE).dim())?;
    writeln!(
        out,
        "  {:<10}  {:<12}  {:<25}  {}",
        style("DATE").bold(),
        style("SESSION").bold(),
        style("STUDENT").bold(),
        style("STATUS").bold()
    )?;
    writeln!(out, "  {}", style(RULE).dim())?;

    for record in records {
        writeln!(
            out,
            "  {:<10}  {:<12}  {:<25}  {}",
            record.date.to_string(),
            truncate_string(record.session.as_str(), 12),
            truncate_string(&record.student, 25),
            status_style(record.status).apply_to(record.status.to_string())
        )?;
    }

    writeln!(out, "  {}", style(RULE).dim())?;
    writeln!(out, "  {} rows", style(records.len()).bold())?;
    writeln!(out)?;

    Ok(())
}

/// Print per-student summaries as a table.
pub fn print_plain_summary(summaries: &[StudentSummary]) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    writeln!(out)?;
    if summaries.is_empty() {
        writeln!(out, "  {}", style("No attendance recorded.").dim())?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(out, "  {}", style(RULE).dim())?;
    writeln!(
        out,
        "  {:<25}  {:>7}  {:>6}  {:>4}  {:>7}  {:>5}",
        style("STUDENT").bold(),
        style("PRESENT").bold(),
        style("ABSENT").bold(),
        style("LATE").bold(),
        style("EXCUSED").bold(),
        style("TOTAL").bold()
    )?;
    writeln!(out, "  {}", style(RULE).dim())?;

    for s in summaries {
        writeln!(
            out,
            "  {:<25}  {:>7}  {:>6}  {:>4}  {:>7}  {:>5}",
            truncate_string(&s.student, 25),
            style(s.present).green(),
            style(s.absent).red(),
            style(s.late).yellow(),
            s.excused,
            s.total()
        )?;
    }

    writeln!(out, "  {}", style(RULE).dim())?;
    writeln!(out)?;

    Ok(())
}

/// Print the outcome of a submission.
pub fn print_submit_result(result: &SubmitResult, location: &str) {
    print_success(&format!(
        "Attendance for {} ({} session) saved to {}",
        result.date, result.session, location
    ));
    println!(
        "{} {} students submitted, {} rows in the table",
        style("•").dim(),
        style(result.submitted).white().bold(),
        result.total_rows
    );

    if !result.absentees.is_empty() {
        println!(
            "{} Absent this morning: {}",
            style("•").dim(),
            style(result.absentees.join(", ")).red()
        );
    }
}

/// Print what happened to absence notifications.
pub fn print_dispatch_report(report: &DispatchReport) {
    if !report.sent.is_empty() {
        print_success(&format!(
            "Absence notification sent for {}",
            report.sent.join(", ")
        ));
    }
    if !report.already_sent.is_empty() {
        print_info(&format!(
            "Already notified earlier: {}",
            report.already_sent.join(", ")
        ));
    }
    for (student, reason) in &report.failed {
        print_error(&format!(
            "Failed to send email for {}. Check email settings. Error: {}",
            student, reason
        ));
    }
}

/// Print an error message.
pub fn print_error(msg: &str) {
    eprintln!("{} {}", style("Error:").red().bold(), msg);
}

/// Print a warning message.
pub fn print_warning(msg: &str) {
    eprintln!("{} {}", style("Warning:").yellow().bold(), msg);
}

/// Print a success message.
pub fn print_success(msg: &str) {
    println!("{} {}", style("✓").green().bold(), msg);
}

/// Print an info message.
pub fn print_info(msg: &str) {
    println!("{} {}", style("ℹ").blue().bold(), msg);
}

/// Truncate a string to a maximum number of characters, adding ellipsis if
/// truncated.
fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
