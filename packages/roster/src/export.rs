//! CSV export of the roster.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::ExportError;
use crate::models::Registration;

pub const CSV_HEADER: [&str; 8] = [
    "Name",
    "Email",
    "Mobile",
    "College",
    "Course",
    "Year",
    "Tech Knowledge",
    "Registration Date",
];

/// A materialized export, ready to hand to the browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CsvExport {
    pub filename: String,
    pub body: String,
    /// Records written, header excluded. A quoted value may span several lines.
    pub rows: usize,
}

impl CsvExport {
    pub const MIME_TYPE: &'static str = "text/csv;charset=utf-8";
}

/// `student-registrations-YYYY-MM-DD.csv`
pub fn export_filename(date: NaiveDate) -> String {
    format!("student-registrations-{}.csv", date.format("%Y-%m-%d"))
}

/// Write `records` as CSV: a bare header line, then one fully quoted row per record.
pub fn export_csv<'a, I>(records: I, date: NaiveDate) -> Result<CsvExport, ExportError>
where
    I: IntoIterator<Item = &'a Registration>,
{
    let mut records = records.into_iter().peekable();
    if records.peek().is_none() {
        return Err(ExportError::Empty);
    }

    let mut header = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    header.write_record(CSV_HEADER)?;
    let buf = header.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;

    let mut rows = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(buf);
    let mut written = 0;
    for r in records {
        let registered = r.created_at.date_naive().format("%Y-%m-%d").to_string();
        rows.write_record([
            r.name.as_str(),
            r.email.as_str(),
            r.mobile.as_str(),
            r.college.as_str(),
            r.course.as_str(),
            r.year.label(),
            r.tech_knowledge.as_str(),
            registered.as_str(),
        ])?;
        written += 1;
    }
    let buf = rows.into_inner().map_err(|e| csv::Error::from(e.into_error()))?;

    let body = String::from_utf8(buf).map_err(|_| ExportError::Encoding)?;
    Ok(CsvExport {
        filename: export_filename(date),
        body,
        rows: written,
    })
}
