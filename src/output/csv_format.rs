//! CSV output formatting.

use crate::storage::{StudentSummary, COLUMNS};
use crate::types::AttendanceRecord;
use std::io::{self, Write};

/// Print rows in CSV format.
pub fn print_csv(records: &[AttendanceRecord]) -> io::Result<()> {
    write_csv(records, io::stdout().lock())
}

/// Write rows as CSV with the spreadsheet header.
pub fn write_csv<W: Write>(records: &[AttendanceRecord], writer: W) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    wtr.write_record(COLUMNS)?;
    for record in records {
        wtr.serialize(record)?;
    }

    wtr.flush()?;
    Ok(())
}

/// Write per-student summaries as CSV.
pub fn write_summary_csv<W: Write>(summaries: &[StudentSummary], writer: W) -> io::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    wtr.write_record(["student", "present", "absent", "late", "excused", "total"])?;
    for s in summaries {
        wtr.write_record([
            s.student.clone(),
            s.present.to_string(),
            s.absent.to_string(),
            s.late.to_string(),
            s.excused.to_string(),
            s.total().to_string(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
