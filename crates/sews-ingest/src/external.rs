//! External long-format measurement logs.
//!
//! An external source arrives as one row per (patient, timestamp,
//! measurement code, value) with whatever column-name casing its exporter
//! used. This module only loads and validates the log; reshaping it onto
//! the canonical feature vector happens in the normalizer.

use std::collections::BTreeMap;
use std::path::Path;

use polars::prelude::*;

use crate::error::{IngestError, Result};
use crate::values::parse_cell;

/// Patient identifier column (canonical upper case).
pub const EXTERNAL_PATIENT_COLUMN: &str = "SUBJECT_ID";
/// Measurement timestamp column.
pub const EXTERNAL_TIME_COLUMN: &str = "CHARTTIME";
/// Measurement-type code column.
pub const EXTERNAL_ITEM_COLUMN: &str = "ITEMID";
/// Numeric value column.
pub const EXTERNAL_VALUE_COLUMN: &str = "VALUENUM";

const REQUIRED_COLUMNS: [&str; 4] = [
    EXTERNAL_PATIENT_COLUMN,
    EXTERNAL_TIME_COLUMN,
    EXTERNAL_ITEM_COLUMN,
    EXTERNAL_VALUE_COLUMN,
];

const EXTERNAL_HINT: &str = "pass the path of the exported long-format measurement table";

/// One measurement event.
#[derive(Debug, Clone, PartialEq)]
pub struct LongRecord {
    pub patient: String,
    pub timestamp: String,
    /// Measurement code, trimmed and upper-cased.
    pub code: String,
    /// `None` when the source value is blank or non-numeric.
    pub value: Option<f64>,
}

/// A loaded external log.
#[derive(Debug, Clone, Default)]
pub struct ExternalDataset {
    pub records: Vec<LongRecord>,
    /// Rows read from the source.
    pub source_rows: usize,
    /// Rows dropped because the patient, timestamp or code was blank.
    pub skipped_rows: usize,
}

/// Reads a long-format CSV, optionally limited to the first `max_rows` rows.
///
/// Every column is read as text so mixed-type value columns cannot abort
/// the load; numeric parsing happens per cell.
pub fn read_external_dataset(path: &Path, max_rows: Option<usize>) -> Result<ExternalDataset> {
    if !path.is_file() {
        return Err(IngestError::SourceUnavailable {
            path: path.to_path_buf(),
            hint: EXTERNAL_HINT.to_string(),
        });
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_n_rows(max_rows)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded external dataset"
    );

    long_records_from_frame(&df, path)
}

/// Extracts measurement events from an already-loaded frame.
///
/// Column names are matched after upper-casing; a frame lacking any of
/// the four required columns is a schema mismatch.
pub fn long_records_from_frame(df: &DataFrame, path: &Path) -> Result<ExternalDataset> {
    let columns = canonical_columns(df);
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|name| !columns.contains_key(**name))
        .map(|name| (*name).to_string())
        .collect();
    if !missing.is_empty() {
        return Err(IngestError::SchemaMismatch {
            path: path.to_path_buf(),
            missing,
        });
    }

    let patients = text_column(df, &columns, EXTERNAL_PATIENT_COLUMN)?;
    let timestamps = text_column(df, &columns, EXTERNAL_TIME_COLUMN)?;
    let codes = text_column(df, &columns, EXTERNAL_ITEM_COLUMN)?;
    let values = text_column(df, &columns, EXTERNAL_VALUE_COLUMN)?;

    let mut dataset = ExternalDataset {
        source_rows: df.height(),
        ..ExternalDataset::default()
    };

    for idx in 0..df.height() {
        let keys = (
            non_empty(patients[idx].as_deref()),
            non_empty(timestamps[idx].as_deref()),
            non_empty(codes[idx].as_deref()),
        );
        let (Some(patient), Some(timestamp), Some(code)) = keys else {
            dataset.skipped_rows += 1;
            continue;
        };
        dataset.records.push(LongRecord {
            patient: patient.to_string(),
            timestamp: timestamp.to_string(),
            code: code.to_uppercase(),
            value: values[idx]
                .as_deref()
                .and_then(|raw| parse_cell(raw).ok().flatten()),
        });
    }

    if dataset.skipped_rows > 0 {
        tracing::warn!(
            path = %path.display(),
            skipped = dataset.skipped_rows,
            "dropped external rows with blank patient, timestamp or code"
        );
    }

    Ok(dataset)
}

/// Maps upper-cased column names to the frame's own names. First wins.
fn canonical_columns(df: &DataFrame) -> BTreeMap<String, String> {
    let mut columns = BTreeMap::new();
    for name in df.get_column_names() {
        columns
            .entry(name.as_str().trim().to_uppercase())
            .or_insert_with(|| name.as_str().to_string());
    }
    columns
}

/// Reads a column as optional strings, casting non-text columns first.
fn text_column(
    df: &DataFrame,
    columns: &BTreeMap<String, String>,
    canonical: &str,
) -> Result<Vec<Option<String>>> {
    let name = columns
        .get(canonical)
        .ok_or_else(|| IngestError::DataFrame {
            message: format!("column '{canonical}' not found"),
        })?;
    let series = df
        .column(name.as_str())?
        .as_materialized_series()
        .cast(&DataType::String)?;
    let values = series
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect();
    Ok(values)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
