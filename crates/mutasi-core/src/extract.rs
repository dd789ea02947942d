//! Text extraction for uploaded statements
//!
//! Turns a PDF, CSV or spreadsheet buffer into a single plain-text blob that can
//! be handed to the model. Format is chosen from the declared MIME type, with the
//! file extension as fallback.

use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Reader};
use csv::ReaderBuilder;
use tracing::debug;

use crate::error::{Error, Result};

/// Width of the separator line under the CSV header row
const CSV_SEPARATOR_WIDTH: usize = 50;

/// Column separator used for CSV and spreadsheet rows
const CELL_SEPARATOR: &str = " | ";

/// Statement file formats we can turn into text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Pdf,
    Csv,
    /// Legacy `.xls` or modern `.xlsx` workbook
    Spreadsheet,
}

impl FileFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Csv => "CSV",
            Self::Spreadsheet => "Excel",
        }
    }
}

impl std::fmt::Display for FileFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lowercased extension including the leading dot (".pdf"), or empty
fn file_extension(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_lowercase()))
        .unwrap_or_default()
}

/// Pick the format from MIME type or extension
///
/// Checked in order PDF, CSV, spreadsheet; the first match wins, so a PDF MIME
/// type beats a `.csv` extension.
pub fn detect_format(file_name: &str, mime: Option<&str>) -> Result<FileFormat> {
    let ext = file_extension(file_name);
    let mime = mime.map(str::trim).unwrap_or("");

    if mime == "application/pdf" || ext == ".pdf" {
        return Ok(FileFormat::Pdf);
    }

    if mime == "text/csv" || ext == ".csv" {
        return Ok(FileFormat::Csv);
    }

    if mime == "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        || mime == "application/vnd.ms-excel"
        || ext == ".xlsx"
        || ext == ".xls"
    {
        return Ok(FileFormat::Spreadsheet);
    }

    let mime_label = if mime.is_empty() { "unknown" } else { mime };
    let ext_label = if ext.is_empty() {
        "no extension"
    } else {
        ext.as_str()
    };
    Err(Error::UnsupportedFormat(format!(
        "{} ({})",
        mime_label, ext_label
    )))
}

/// Extract plain text from a statement buffer
///
/// The result is not checked for emptiness; callers decide what a blank
/// extraction means.
pub fn extract_text(buffer: &[u8], file_name: &str, mime: Option<&str>) -> Result<String> {
    let format = detect_format(file_name, mime)?;
    debug!(file_name, %format, bytes = buffer.len(), "Extracting text");

    match format {
        FileFormat::Pdf => extract_pdf(buffer),
        FileFormat::Csv => extract_csv(buffer),
        FileFormat::Spreadsheet => extract_spreadsheet(buffer),
    }
}

/// Text of all pages in document order
fn extract_pdf(buffer: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed documents instead of returning an error
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(buffer)
    }));

    match outcome {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(Error::parse(FileFormat::Pdf, e)),
        Err(_) => Err(Error::parse(
            FileFormat::Pdf,
            "PDF extractor panicked on malformed input",
        )),
    }
}

/// Render a CSV as a pipe-delimited table, or return it verbatim if it has no data rows
fn extract_csv(buffer: &[u8]) -> Result<String> {
    let raw = String::from_utf8_lossy(buffer).into_owned();
    let content = raw.trim_start_matches('\u{feff}');

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|e| Error::parse(FileFormat::Csv, e))?
        .clone();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| Error::parse(FileFormat::Csv, e))?;
        let values: Vec<&str> = (0..headers.len())
            .map(|i| record.get(i).unwrap_or(""))
            .collect();
        rows.push(values.join(CELL_SEPARATOR));
    }

    if rows.is_empty() {
        debug!("CSV has no data rows, passing raw text through");
        return Ok(raw);
    }

    let mut output = headers.iter().collect::<Vec<_>>().join(CELL_SEPARATOR);
    output.push('\n');
    output.push_str(&"-".repeat(CSV_SEPARATOR_WIDTH));
    output.push('\n');
    for row in rows {
        output.push_str(&row);
        output.push('\n');
    }

    Ok(output)
}

fn extract_spreadsheet(buffer: &[u8]) -> Result<String> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(buffer.to_vec()))
        .map_err(|e| Error::parse(FileFormat::Spreadsheet, e))?;

    let mut sheets = Vec::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| Error::parse(FileFormat::Spreadsheet, e))?;
        let rows: Vec<Vec<String>> = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect())
            .collect();
        sheets.push((name, rows));
    }

    Ok(render_sheets(sheets))
}

/// Render workbook contents sheet by sheet
///
/// Each sheet gets a `=== Sheet: <name> ===` marker, then every row with at least
/// one non-empty cell, then a blank line.
pub fn render_sheets<I>(sheets: I) -> String
where
    I: IntoIterator<Item = (String, Vec<Vec<String>>)>,
{
    let mut output = String::new();

    for (name, rows) in sheets {
        output.push_str(&format!("=== Sheet: {} ===\n", name));
        for row in rows {
            if row.iter().any(|cell| !cell.is_empty()) {
                output.push_str(&row.join(CELL_SEPARATOR));
                output.push('\n');
            }
        }
        output.push('\n');
    }

    output
}
