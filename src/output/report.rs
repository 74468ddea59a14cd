//! Post-export consistency report
//!
//! Purely advisory: the report reads the written CSV back and points out
//! empty cells and repeated identifiers. Nothing in the crawl depends on it.

use super::csv::{parse_rows, FIXED_COLUMNS};
use super::{ExportError, ExportResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Findings of a consistency check over one CSV export
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsistencyReport {
    /// Data rows, header excluded
    pub rows: usize,
    pub columns: Vec<String>,
    /// Columns with at least one empty cell, most missing first
    pub missing: Vec<(String, usize)>,
    /// Identifiers appearing more than once, with their counts
    pub duplicate_identifiers: Vec<(String, usize)>,
}

impl ConsistencyReport {
    pub fn total_missing(&self) -> usize {
        self.missing.iter().map(|(_, count)| count).sum()
    }

    /// True when no cell is empty and every identifier is unique
    pub fn is_consistent(&self) -> bool {
        self.missing.is_empty() && self.duplicate_identifiers.is_empty()
    }
}

/// Analyzes a CSV export
///
/// # Arguments
///
/// * `path` - The CSV file produced by the writer
///
/// # Returns
///
/// * `Ok(ConsistencyReport)` - The file was readable
/// * `Err(ExportError)` - The file could not be read or has no header
pub fn analyze_csv(path: &Path) -> ExportResult<ConsistencyReport> {
    let text = fs::read_to_string(path)?;
    let mut rows = parse_rows(&text).into_iter();

    let columns = rows.next().ok_or_else(|| ExportError::MissingHeader {
        path: path.display().to_string(),
    })?;
    let rows: Vec<Vec<String>> = rows.collect();

    let mut missing_counts = vec![0usize; columns.len()];
    for row in &rows {
        for (i, count) in missing_counts.iter_mut().enumerate() {
            let empty = row.get(i).map_or(true, |cell| cell.trim().is_empty());
            if empty {
                *count += 1;
            }
        }
    }

    let mut missing: Vec<(String, usize)> = columns
        .iter()
        .cloned()
        .zip(missing_counts)
        .filter(|(_, count)| *count > 0)
        .collect();
    missing.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let id_column = columns
        .iter()
        .position(|c| c == FIXED_COLUMNS[0])
        .unwrap_or(0);

    let mut identifier_counts: BTreeMap<&str, usize> = BTreeMap::new();
    for row in &rows {
        if let Some(id) = row.get(id_column).map(|cell| cell.trim()) {
            if !id.is_empty() {
                *identifier_counts.entry(id).or_insert(0) += 1;
            }
        }
    }

    let duplicate_identifiers = identifier_counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(id, count)| (id.to_string(), count))
        .collect();

    Ok(ConsistencyReport {
        rows: rows.len(),
        columns,
        missing,
        duplicate_identifiers,
    })
}

/// Emits the report through tracing
pub fn log_report(path: &Path, report: &ConsistencyReport) {
    tracing::info!(
        path = %path.display(),
        rows = report.rows,
        columns = report.columns.len(),
        "Consistency report"
    );

    if report.missing.is_empty() {
        tracing::info!("All columns are fully populated");
    } else {
        tracing::warn!(
            total = report.total_missing(),
            "Found missing values across the export"
        );
        for (column, count) in &report.missing {
            tracing::warn!(column = %column, missing = count, "Column has empty cells");
        }
    }

    for (identifier, count) in &report.duplicate_identifiers {
        tracing::warn!(identifier = %identifier, occurrences = count, "Duplicate identifier");
    }
}
