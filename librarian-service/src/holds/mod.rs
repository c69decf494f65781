//! Holds CSV parsing, filtering and chunking.
//!
//! The upstream export format drifted constantly, so parsing is driven by an
//! explicit column mapping ([`HoldsSchema`]) instead of positional guesswork,
//! and quoting is handled by a real RFC-4180 parser rather than regexes.
//! Malformed rows are skipped and counted, never fatal.

use crate::config::HoldsConfig;
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HoldsError {
    #[error("CSV input is empty")]
    Empty,

    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),
}

/// Column mapping for one holds export layout.
#[derive(Debug, Clone)]
pub struct HoldsSchema {
    pub record_id_column: usize,
    pub title_column: usize,
    pub holds_column: usize,
    pub date_column: usize,
    /// Separator between the individual holds inside the holds column.
    pub holds_delimiter: char,
    /// chrono format string for the date column.
    pub date_format: String,
}

impl From<&HoldsConfig> for HoldsSchema {
    fn from(cfg: &HoldsConfig) -> Self {
        Self {
            record_id_column: cfg.record_id_column,
            title_column: cfg.title_column,
            holds_column: cfg.holds_column,
            date_column: cfg.date_column,
            holds_delimiter: cfg.holds_delimiter,
            date_format: cfg.date_format.clone(),
        }
    }
}

/// One parsed holds row.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HoldsRecord {
    pub record_id: String,
    pub title: String,
    pub holds_count: u32,
    pub date: NaiveDate,
}

/// Result of parsing a holds export.
#[derive(Debug, Serialize)]
pub struct HoldsReport {
    pub records: Vec<HoldsRecord>,
    /// Rows dropped because a mapped column was missing or unparseable.
    pub skipped_rows: usize,
}

/// Filter parameters for a holds report.
#[derive(Debug, Clone, Default)]
pub struct HoldsFilter {
    pub min_holds: Option<u32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// Parse the data rows of a holds export according to `schema`.
///
/// The first line is treated as the header and skipped. The holds count is
/// the number of non-empty delimiter-separated sub-fields in the holds
/// column.
pub fn parse_holds(content: &str, schema: &HoldsSchema) -> Result<HoldsReport, HoldsError> {
    if content.trim().is_empty() {
        return Err(HoldsError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let max_column = schema
        .record_id_column
        .max(schema.title_column)
        .max(schema.holds_column)
        .max(schema.date_column);

    let mut records = Vec::new();
    let mut skipped_rows = 0usize;

    for row in reader.records() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping unparseable CSV row");
                skipped_rows += 1;
                continue;
            }
        };

        if row.len() <= max_column {
            skipped_rows += 1;
            continue;
        }

        let date = match NaiveDate::parse_from_str(
            row[schema.date_column].trim(),
            &schema.date_format,
        ) {
            Ok(date) => date,
            Err(_) => {
                skipped_rows += 1;
                continue;
            }
        };

        let holds_count = count_holds(&row[schema.holds_column], schema.holds_delimiter);

        records.push(HoldsRecord {
            record_id: row[schema.record_id_column].trim().to_string(),
            title: row[schema.title_column].trim().to_string(),
            holds_count,
            date,
        });
    }

    Ok(HoldsReport {
        records,
        skipped_rows,
    })
}

/// Number of non-empty delimiter-separated sub-fields.
pub fn count_holds(field: &str, delimiter: char) -> u32 {
    field
        .split(delimiter)
        .filter(|part| !part.trim().is_empty())
        .count() as u32
}

/// Apply a minimum-holds / date-window filter and sort ascending by date.
pub fn filter_holds(records: Vec<HoldsRecord>, filter: &HoldsFilter) -> Vec<HoldsRecord> {
    let mut filtered: Vec<HoldsRecord> = records
        .into_iter()
        .filter(|r| filter.min_holds.map_or(true, |min| r.holds_count >= min))
        .filter(|r| filter.from.map_or(true, |from| r.date >= from))
        .filter(|r| filter.to.map_or(true, |to| r.date <= to))
        .collect();

    filtered.sort_by_key(|r| r.date);
    filtered
}

/// Split raw CSV content into fixed-size chunks of data rows, each chunk
/// prefixed with the header line. Produces `ceil(rows / chunk_size)` chunks.
pub fn split_into_chunks(content: &str, chunk_size: usize) -> Vec<String> {
    let chunk_size = chunk_size.max(1);
    let mut lines = content.split('\n').map(|l| l.trim_end_matches('\r'));

    let header = match lines.next() {
        Some(h) => h,
        None => return Vec::new(),
    };

    let data: Vec<&str> = lines.filter(|l| !l.is_empty()).collect();
    if data.is_empty() {
        return Vec::new();
    }

    data.chunks(chunk_size)
        .map(|rows| {
            let mut chunk = String::with_capacity(header.len() + rows.iter().map(|r| r.len() + 1).sum::<usize>());
            chunk.push_str(header);
            for row in rows {
                chunk.push('\n');
                chunk.push_str(row);
            }
            chunk
        })
        .collect()
}
