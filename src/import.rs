//! CSV import for stock items.
//!
//! A file is a header row naming the fields followed by one row per item. Rows come
//! back as untyped records so they go through the same validation as API submissions.

use csv::{ReaderBuilder, Trim};
use serde_json::{Map, Number, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Columns kept as text even when the cell looks numeric.
const TEXT_COLUMNS: [&str; 3] = ["sku", "store", "description"];

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("CSV must have a header row and at least one data row")]
    NoDataRows,

    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to open CSV file: {0}")]
    Io(#[from] std::io::Error),
}

pub fn records_from_path(path: &Path) -> Result<Vec<Value>, ImportError> {
    let file = File::open(path)?;
    records_from_csv(file)
}

/// Reads every data row into a JSON object keyed by the trimmed header names.
/// A row shorter than the header leaves the trailing fields out.
pub fn records_from_csv<R: Read>(reader: R) -> Result<Vec<Value>, ImportError> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let mut records = Vec::new();

    for row in csv_reader.records() {
        let row = row?;
        let mut record = Map::new();
        for (header, cell) in headers.iter().zip(row.iter()) {
            record.insert(header.to_string(), cell_value(header, cell));
        }
        records.push(Value::Object(record));
    }

    if records.is_empty() {
        return Err(ImportError::NoDataRows);
    }

    debug!(rows = records.len(), "Parsed CSV rows");
    Ok(records)
}

fn cell_value(header: &str, cell: &str) -> Value {
    if cell.is_empty() || TEXT_COLUMNS.contains(&header) {
        return Value::String(cell.to_string());
    }
    if let Ok(integer) = cell.parse::<i64>() {
        return Value::Number(integer.into());
    }
    cell.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(cell.to_string()))
}
