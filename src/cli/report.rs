//! Report subcommand implementation.
//!
//! Handles `rollbook report` for viewing and exporting recorded attendance.

use super::{Context, OutputFormat};
use crate::error::{CliError, CliResult};
use crate::output;
use crate::storage::summarize;
use crate::types::{AttendanceDate, AttendanceRecord, Session, Status};
use clap::Parser;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// View or export recorded attendance.
#[derive(Parser, Debug)]
pub struct ReportCommand {
    /// Only rows for this date (YYYY-MM-DD)
    #[arg(short, long, value_name = "DATE")]
    pub date: Option<AttendanceDate>,

    /// Only rows from this date onwards (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", conflicts_with = "date")]
    pub from: Option<AttendanceDate>,

    /// Only rows up to and including this date (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", conflicts_with = "date")]
    pub to: Option<AttendanceDate>,

    /// Only rows for this session
    #[arg(short, long, value_name = "SESSION")]
    pub session: Option<Session>,

    /// Only rows for this student
    #[arg(long, value_name = "STUDENT")]
    pub student: Option<String>,

    /// Only absent students
    #[arg(long)]
    pub absent_only: bool,

    /// Show per-student totals instead of individual rows
    #[arg(long)]
    pub summary: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "plain")]
    pub format: OutputFormat,

    /// Write to this file instead of stdout (csv or json only)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_file: Option<PathBuf>,
}

impl ReportCommand {
    /// Execute the report command.
    pub fn execute(&self, ctx: &Context) -> CliResult<()> {
        ctx.login()?;

        let store = ctx.store();
        let records: Vec<AttendanceRecord> = store
            .load()?
            .into_iter()
            .filter(|r| self.matches(r))
            .collect();

        if let Some(path) = &self.output_file {
            self.export(&records, path)?;
            if !ctx.quiet {
                output::print_success(&format!(
                    "Exported {} rows to {}",
                    records.len(),
                    path.display()
                ));
            }
            return Ok(());
        }

        if self.summary {
            output::print_summary(&summarize(&records), self.format)?;
        } else {
            output::print_records(&records, self.format)?;
        }

        Ok(())
    }

    /// Check a row against every filter given.
    fn matches(&self, record: &AttendanceRecord) -> bool {
        self.date.map_or(true, |d| record.date == d)
            && self.from.map_or(true, |d| record.date >= d)
            && self.to.map_or(true, |d| record.date <= d)
            && self.session.as_ref().map_or(true, |s| &record.session == s)
            && self
                .student
                .as_deref()
                .map_or(true, |name| record.student == name.trim())
            && (!self.absent_only || record.status == Status::Absent)
    }

    fn export(&self, records: &[AttendanceRecord], path: &Path) -> CliResult<()> {
        if self.format == OutputFormat::Plain {
            return Err(CliError::Other(
                "file export needs --format csv or --format json".to_string(),
            ));
        }

        let mut file = BufWriter::new(File::create(path)?);
        match (self.format, self.summary) {
            (OutputFormat::Csv, false) => output::write_csv(records, &mut file)?,
            (OutputFormat::Csv, true) => output::write_summary_csv(&summarize(records), &mut file)?,
            (_, false) => serde_json::to_writer_pretty(&mut file, records)
                .map_err(|e| CliError::Other(e.to_string()))?,
            (_, true) => serde_json::to_writer_pretty(&mut file, &summarize(records))
                .map_err(|e| CliError::Other(e.to_string()))?,
        }
        file.flush()?;

        Ok(())
    }
}
