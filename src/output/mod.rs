//! Output module for exporting crawl results
//!
//! This module handles:
//! - Writing records to CSV with a stable column order
//! - Reading an export back into records
//! - Checking an export for missing values and duplicate identifiers
//! - Printing the run summary

mod csv;
mod report;
pub mod stats;

pub use self::csv::{
    parse_rows, read_records, records_to_rows, try_write_records, write_records, write_row,
    CATEGORY_SEPARATOR, FIXED_COLUMNS,
};
pub use report::{analyze_csv, log_report, ConsistencyReport};
pub use stats::print_summary;

use crate::record::ValidationError;
use thiserror::Error;

/// Errors that can occur while writing or reading an export
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV file {path} has no header row")]
    MissingHeader { path: String },

    #[error("row {row} cannot be turned into a record: {source}")]
    InvalidRow {
        row: usize,
        source: ValidationError,
    },
}

/// Result type for output operations
pub type ExportResult<T> = Result<T, ExportError>;
