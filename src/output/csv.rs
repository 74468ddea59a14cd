//! CSV export of records
//!
//! Column order is fixed: `identifier`, `name`, `categories`, `image_url`,
//! then every extra attribute key found in any record, sorted. Quoting
//! follows RFC 4180 (fields containing a comma, quote or line break are
//! quoted, quotes doubled).

use super::{ExportError, ExportResult};
use crate::record::{single_line, Record, RecordBuilder, ValidationError};
use std::collections::BTreeSet;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::mem::take;
use std::path::Path;

/// Leading columns of every export
pub const FIXED_COLUMNS: [&str; 4] = ["identifier", "name", "categories", "image_url"];

/// Joins categories inside the `categories` column
pub use crate::record::CATEGORY_SEPARATOR;

const SEPARATOR: char = ',';

/// Writes records to `path` and returns the number of rows written
///
/// Never fails: export problems are logged and reported as zero rows, so
/// a finished crawl is not lost to an unwritable output path. Use
/// [`try_write_records`] to get the error instead.
pub fn write_records(records: &[Record], path: &Path) -> usize {
    if records.is_empty() {
        tracing::warn!("No records to export, nothing written");
        return 0;
    }

    match try_write_records(records, path) {
        Ok(written) => {
            tracing::info!(rows = written, path = %path.display(), "Records exported");
            written
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "CSV export failed");
            0
        }
    }
}

/// Writes records to `path`, creating parent directories as needed
pub fn try_write_records(records: &[Record], path: &Path) -> ExportResult<usize> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let (header, rows) = records_to_rows(records);

    let mut writer = BufWriter::new(fs::File::create(path)?);
    write_row(&mut writer, &header)?;
    for row in &rows {
        write_row(&mut writer, row)?;
    }
    writer.flush()?;

    Ok(rows.len())
}

/// Flattens records into a header and one row per record
pub fn records_to_rows(records: &[Record]) -> (Vec<String>, Vec<Vec<String>>) {
    let extra_keys: BTreeSet<&str> = records
        .iter()
        .flat_map(|record| record.extra_attributes().keys().map(String::as_str))
        .collect();

    let header: Vec<String> = FIXED_COLUMNS
        .iter()
        .map(|column| column.to_string())
        .chain(extra_keys.iter().map(|key| key.to_string()))
        .collect();

    let rows = records
        .iter()
        .map(|record| {
            let mut row = vec![
                single_line(record.identifier()),
                single_line(record.name()),
                single_line(&record.categories().join(CATEGORY_SEPARATOR)),
                single_line(record.image_url().unwrap_or("")),
            ];
            row.extend(
                extra_keys
                    .iter()
                    .map(|key| single_line(record.attribute(key).unwrap_or(""))),
            );
            row
        })
        .collect();

    (header, rows)
}

/// Reads an export back into records
///
/// Empty extra-attribute cells are treated as absent attributes.
pub fn read_records(path: &Path) -> ExportResult<Vec<Record>> {
    let text = fs::read_to_string(path)?;
    let mut rows = parse_rows(&text).into_iter();

    let header = rows.next().ok_or_else(|| ExportError::MissingHeader {
        path: path.display().to_string(),
    })?;

    rows.enumerate()
        .map(|(index, row)| {
            row_to_record(&header, &row).map_err(|source| ExportError::InvalidRow {
                row: index + 1,
                source,
            })
        })
        .collect()
}

fn row_to_record(header: &[String], row: &[String]) -> Result<Record, ValidationError> {
    let cell = |i: usize| row.get(i).map(String::as_str).unwrap_or("");

    let mut builder = RecordBuilder::new().identifier(cell(0)).name(cell(1));

    for category in cell(2).split(CATEGORY_SEPARATOR) {
        builder = builder.category(category);
    }

    if !cell(3).is_empty() {
        builder = builder.image_url(cell(3));
    }

    for (i, key) in header.iter().enumerate().skip(FIXED_COLUMNS.len()) {
        let value = cell(i);
        if !value.is_empty() {
            builder = builder.attribute(key.clone(), value);
        }
    }

    builder.build()
}

fn needs_quotes(field: &str) -> bool {
    field.contains(SEPARATOR) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Writes a single CSV row to any writer
pub fn write_row<W: Write>(mut w: W, row: &[String]) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, "{}", SEPARATOR)?;
        } else {
            first = false;
        }
        if needs_quotes(cell) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Minimal CSV parser, tolerant of quotes and CRLF line endings
///
/// Blank lines are skipped. An unterminated quote runs to the end of input.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if field.is_empty() => in_quotes = true,
            c if c == SEPARATOR && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}
