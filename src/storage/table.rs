//! Spreadsheet persistence for the attendance table.
//!
//! The table is an Excel workbook whose first sheet has a
//! `Date,Session,Student,Status` header row. Dates are written as
//! `YYYY-MM-DD` text; on reading, cells that a spreadsheet application turned
//! into real dates are accepted too. Every write replaces the whole file
//! through a temporary file in the same directory that is renamed over the
//! old one, so an interrupted write never truncates the table.

use crate::error::{AttendanceError, AttendanceResult};
use crate::types::{AttendanceDate, AttendanceRecord, Session, Status};
use calamine::{Data, Range, Reader, Xlsx};
use chrono::{Days, Local, NaiveDate};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::fs::{self, File};
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Canonical column order.
pub const COLUMNS: [&str; 4] = ["Date", "Session", "Student", "Status"];

const SHEET_NAME: &str = "Attendance";

/// Day zero of Excel's 1900 date system.
const EXCEL_EPOCH: (i32, u32, u32) = (1899, 12, 30);

/// Whole-table storage used by the attendance store.
pub trait TableBackend {
    /// Where the table lives, for messages.
    fn location(&self) -> &Path;

    /// Read every row. `Ok(None)` means the table does not exist yet.
    fn read(&self) -> AttendanceResult<Option<Vec<AttendanceRecord>>>;

    /// Replace the table with `records`.
    fn write(&self, records: &[AttendanceRecord]) -> AttendanceResult<()>;

    /// Move the current table out of the way, returning where it went.
    fn set_aside(&self) -> AttendanceResult<Option<PathBuf>>;
}

/// Column positions found in a header row. `session` is optional because
/// older tables were written without it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Layout {
    date: usize,
    session: Option<usize>,
    student: usize,
    status: usize,
}

impl Layout {
    fn from_header(header: &[Data]) -> Result<Self, String> {
        let find = |name: &str| {
            header
                .iter()
                .position(|cell| text(Some(cell)).as_deref() == Some(name))
        };

        match (find("Date"), find("Student"), find("Status")) {
            (Some(date), Some(student), Some(status)) => Ok(Self {
                date,
                session: find("Session"),
                student,
                status,
            }),
            (date, student, status) => {
                let missing: Vec<&str> = [("Date", date), ("Student", student), ("Status", status)]
                    .iter()
                    .filter(|(_, found)| found.is_none())
                    .map(|(name, _)| *name)
                    .collect();
                Err(format!("missing column(s): {}", missing.join(", ")))
            }
        }
    }

    /// Parse one data row. Blank rows yield `None`.
    fn record(&self, cells: &[Data]) -> Result<Option<AttendanceRecord>, String> {
        if cells.iter().all(|cell| text(Some(cell)).is_none()) {
            return Ok(None);
        }

        let date = date_cell(cells.get(self.date))?;
        let session = match self.session.and_then(|i| text(cells.get(i))) {
            Some(label) => label.parse::<Session>().map_err(|e| e.to_string())?,
            None => Session::morning(),
        };
        let student = text(cells.get(self.student)).ok_or("missing student name")?;
        let status = text(cells.get(self.status))
            .ok_or_else(|| "missing status".to_string())
            .and_then(Status::try_from)?;

        Ok(Some(AttendanceRecord::new(date, session, student, status)))
    }
}

/// Trimmed text of a cell, `None` if blank.
fn text(cell: Option<&Data>) -> Option<String> {
    let value = match cell? {
        Data::Empty => return None,
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    };
    Some(value).filter(|v| !v.is_empty())
}

fn date_cell(cell: Option<&Data>) -> Result<AttendanceDate, String> {
    match cell {
        Some(Data::String(s)) | Some(Data::DateTimeIso(s)) => date_from_text(s),
        Some(Data::DateTime(dt)) => date_from_serial(dt.as_f64()),
        Some(Data::Float(serial)) => date_from_serial(*serial),
        Some(Data::Int(serial)) => date_from_serial(*serial as f64),
        _ => Err("missing date".to_string()),
    }
}

/// `YYYY-MM-DD`, optionally followed by a time of day.
fn date_from_text(s: &str) -> Result<AttendanceDate, String> {
    let s = s.trim();
    s.parse::<AttendanceDate>().or_else(|e| {
        s.get(..10)
            .filter(|_| s.len() > 10)
            .and_then(|day| day.parse::<AttendanceDate>().ok())
            .ok_or_else(|| e.to_string())
    })
}

fn date_from_serial(serial: f64) -> Result<AttendanceDate, String> {
    let (y, m, d) = EXCEL_EPOCH;
    Some(serial)
        .filter(|s| (1.0..2_958_466.0).contains(s))
        .and_then(|s| NaiveDate::from_ymd_opt(y, m, d)?.checked_add_days(Days::new(s as u64)))
        .map(AttendanceDate::from_naive)
        .ok_or_else(|| format!("invalid date serial {}", serial))
}

/// Excel workbook backend.
#[derive(Debug, Clone)]
pub struct XlsxTable {
    path: PathBuf,
}

impl XlsxTable {
    /// Create a backend for the file at `path`. The file need not exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Check whether the table was written before the `Session` column
    /// existed. A missing or empty table is not legacy.
    pub fn is_legacy(&self) -> AttendanceResult<bool> {
        let range = match self.sheet()? {
            Some(range) => range,
            None => return Ok(false),
        };

        match range.rows().next() {
            Some(header) => {
                let layout = Layout::from_header(header).map_err(|e| self.read_error(e))?;
                Ok(layout.session.is_none())
            }
            None => Ok(false),
        }
    }

    /// Rewrite a legacy table with the canonical header, assigning every row
    /// to the morning session. Returns whether the file was rewritten.
    pub fn migrate(&self) -> AttendanceResult<bool> {
        if !self.is_legacy()? {
            return Ok(false);
        }

        let records = self.read()?.unwrap_or_default();
        self.write(&records)?;
        info!(path = %self.path.display(), rows = records.len(), "added Session column to attendance table");

        Ok(true)
    }

    /// First sheet of the workbook. `None` if the file does not exist; a
    /// zero-length file is a table that was created but never written.
    fn sheet(&self) -> AttendanceResult<Option<Range<Data>>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(self.read_error(e)),
        };

        if file.metadata().map_err(|e| self.read_error(e))?.len() == 0 {
            return Ok(Some(Range::empty()));
        }

        let mut workbook = Xlsx::new(BufReader::new(file)).map_err(|e| self.read_error(e))?;
        match workbook.worksheet_range_at(0) {
            Some(range) => range.map(Some).map_err(|e| self.read_error(e)),
            None => Err(self.read_error("workbook has no sheets")),
        }
    }

    fn read_error(&self, e: impl ToString) -> AttendanceError {
        AttendanceError::PersistenceRead {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }

    fn write_error(&self, e: impl ToString) -> AttendanceError {
        AttendanceError::PersistenceWrite {
            path: self.path.clone(),
            reason: e.to_string(),
        }
    }

    fn parent_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

/// Build the workbook bytes for `records`.
fn render(records: &[AttendanceRecord]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;
    for (col, name) in COLUMNS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *name, &header)?;
        sheet.set_column_width(col as u16, 14)?;
    }

    for (i, record) in records.iter().enumerate() {
        let row = i as u32 + 1;
        let date = record.date.to_string();
        let status = record.status.to_string();
        sheet.write_string(row, 0, date.as_str())?;
        sheet.write_string(row, 1, record.session.as_str())?;
        sheet.write_string(row, 2, record.student.as_str())?;
        sheet.write_string(row, 3, status.as_str())?;
    }

    workbook.save_to_buffer()
}

impl TableBackend for XlsxTable {
    fn location(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> AttendanceResult<Option<Vec<AttendanceRecord>>> {
        let range = match self.sheet()? {
            Some(range) => range,
            None => {
                debug!(path = %self.path.display(), "attendance table does not exist yet");
                return Ok(None);
            }
        };

        // Spreadsheet row numbers are 1-based and count the header line.
        let first_row = range.start().map_or(0, |(row, _)| row as usize) + 1;
        let mut rows = range.rows();
        let layout = match rows.next() {
            Some(header) => Layout::from_header(header).map_err(|e| self.read_error(e))?,
            None => return Ok(Some(Vec::new())),
        };

        let mut records = Vec::new();
        for (i, cells) in rows.enumerate() {
            let row = first_row + i + 1;
            if let Some(record) = layout
                .record(cells)
                .map_err(|e| self.read_error(format!("row {}: {}", row, e)))?
            {
                records.push(record);
            }
        }

        debug!(path = %self.path.display(), rows = records.len(), "read attendance table");
        Ok(Some(records))
    }

    fn write(&self, records: &[AttendanceRecord]) -> AttendanceResult<()> {
        let buffer = render(records).map_err(|e| self.write_error(e))?;

        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(|e| self.write_error(e))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| self.write_error(e))?;
        tmp.write_all(&buffer)
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| self.write_error(e))?;

        tmp.persist(&self.path).map_err(|e| self.write_error(e.error))?;

        debug!(path = %self.path.display(), rows = records.len(), "wrote attendance table");
        Ok(())
    }

    fn set_aside(&self) -> AttendanceResult<Option<PathBuf>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "attendance".to_string());
        let ext = self
            .path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "xlsx".to_string());
        let stamp = Local::now().format("%Y%m%d%H%M%S");
        let target = self
            .parent_dir()
            .join(format!("{}.corrupt-{}.{}", stem, stamp, ext));

        fs::rename(&self.path, &target).map_err(|e| self.write_error(e))?;
        info!(from = %self.path.display(), to = %target.display(), "moved unreadable attendance table aside");

        Ok(Some(target))
    }
}
