//! Corpus persistence.
//!
//! The corpus is one comma-separated table: the canonical features in
//! order, the horizon-shifted target, then the patient identifier. Hour
//! indices are not stored; on read they are reassigned per patient in
//! file order.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};

use sews_model::{
    Corpus, FEATURE_COUNT, FEATURES, LabeledRow, PATIENT_ID_COLUMN, PatientId, SENTINEL,
    target_column,
};

use crate::error::{IngestError, Result, read_error};
use crate::values::{format_numeric, parse_cell};

/// Default corpus file written by `sews etl`.
pub const DEFAULT_CORPUS_FILE: &str = "final_processed_sepsis_data.csv";

const CORPUS_HINT: &str = "run `sews etl` first to build the corpus";

/// Writes the corpus to `path`, replacing any existing file.
pub fn write_corpus(path: &Path, corpus: &Corpus, horizon_hours: usize) -> Result<()> {
    let write_err = |source: std::io::Error| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_err)?;
    let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));

    let mut header: Vec<String> = FEATURES.iter().map(|name| (*name).to_string()).collect();
    header.push(target_column(horizon_hours));
    header.push(PATIENT_ID_COLUMN.to_string());
    writer
        .write_record(&header)
        .map_err(|e| write_err(e.into()))?;

    let mut record: Vec<String> = Vec::with_capacity(FEATURE_COUNT + 2);
    for row in corpus.rows() {
        record.clear();
        record.extend(row.features.iter().map(|value| format_numeric(*value)));
        record.push(row.target.to_string());
        record.push(row.patient_id.to_string());
        writer
            .write_record(&record)
            .map_err(|e| write_err(e.into()))?;
    }
    writer.flush().map_err(write_err)?;

    tracing::debug!(path = %path.display(), rows = corpus.len(), "wrote corpus");
    Ok(())
}

/// Reads a corpus written by [`write_corpus`].
pub fn read_corpus(path: &Path, horizon_hours: usize) -> Result<Corpus> {
    let file = File::open(path).map_err(|e| read_error(path, e, CORPUS_HINT))?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .clone();
    if headers.is_empty() {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let target_name = target_column(horizon_hours);
    let position = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let mut missing = Vec::new();
    let mut feature_positions = [0usize; FEATURE_COUNT];
    for (slot, name) in feature_positions.iter_mut().zip(FEATURES.iter()) {
        match position(name) {
            Some(idx) => *slot = idx,
            None => missing.push((*name).to_string()),
        }
    }
    let target_position = position(&target_name);
    let patient_position = position(PATIENT_ID_COLUMN);
    if target_position.is_none() {
        missing.push(target_name.clone());
    }
    if patient_position.is_none() {
        missing.push(PATIENT_ID_COLUMN.to_string());
    }
    let (Some(target_position), Some(patient_position)) = (target_position, patient_position)
    else {
        return Err(IngestError::SchemaMismatch {
            path: path.to_path_buf(),
            missing,
        });
    };
    if !missing.is_empty() {
        return Err(IngestError::SchemaMismatch {
            path: path.to_path_buf(),
            missing,
        });
    }

    let mut next_hour: BTreeMap<PatientId, usize> = BTreeMap::new();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let line = record.position().map(csv::Position::line).unwrap_or(0);
        let cell = |idx: usize| record.get(idx).unwrap_or("");
        let invalid = |column: &str, value: &str| IngestError::InvalidValue {
            path: path.to_path_buf(),
            line,
            column: column.to_string(),
            value: value.to_string(),
        };

        let mut features = [SENTINEL; FEATURE_COUNT];
        for ((slot, idx), name) in features
            .iter_mut()
            .zip(feature_positions.iter())
            .zip(FEATURES.iter())
        {
            let raw = cell(*idx);
            *slot = match parse_cell(raw) {
                Ok(Some(value)) => value,
                _ => return Err(invalid(name, raw)),
            };
        }

        let raw_target = cell(target_position);
        let target = match parse_cell(raw_target) {
            Ok(Some(value)) if value == 0.0 => 0,
            Ok(Some(value)) if value == 1.0 => 1,
            _ => return Err(invalid(&target_name, raw_target)),
        };

        let patient_id = PatientId::new(cell(patient_position))?;
        let hour = next_hour.entry(patient_id.clone()).or_insert(0);
        rows.push(LabeledRow::new(patient_id, *hour, features, target));
        *hour += 1;
    }

    tracing::debug!(path = %path.display(), rows = rows.len(), "read corpus");
    Ok(Corpus::new(rows))
}
