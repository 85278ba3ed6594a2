//! Output formatting module.
//!
//! Provides formatters for plain text, JSON, and CSV output of attendance
//! tables and summaries.

mod csv_format;
mod json_format;
mod plain;

pub use csv_format::{print_csv, write_csv, write_summary_csv};
pub use json_format::print_json;
pub use plain::{
    print_dispatch_report, print_error, print_info, print_submit_result, print_success,
    print_warning,
};

use crate::cli::OutputFormat;
use crate::storage::StudentSummary;
use crate::types::AttendanceRecord;
use std::io;

/// Format and print attendance rows according to the specified format.
pub fn print_records(records: &[AttendanceRecord], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_plain(records),
        OutputFormat::Json => json_format::print_json(&records),
        OutputFormat::Csv => csv_format::print_csv(records),
    }
}

/// Format and print per-student summaries.
pub fn print_summary(summaries: &[StudentSummary], format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Plain => plain::print_plain_summary(summaries),
        OutputFormat::Json => json_format::print_json(&summaries),
        OutputFormat::Csv => csv_format::write_summary_csv(summaries, io::stdout().lock()),
    }
}
