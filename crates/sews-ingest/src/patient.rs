//! Per-patient `|`-separated hourly tables.

use std::fs::File;
use std::path::Path;

use csv::ReaderBuilder;

use sews_model::{
    FEATURE_COUNT, HourRecord, Observation, PatientId, PatientTimeline, feature_index,
};

use crate::error::{IngestError, Result, read_error};
use crate::values::parse_cell;

const PATIENT_FILE_HINT: &str = "the patient file was listed but could not be opened";

/// Where a header column lands in the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnSlot {
    Feature(usize),
    Label,
    Ignored,
}

/// Patient identifier from a file name: the stem up to the first `.`.
pub fn patient_id_from_path(path: &Path) -> Result<PatientId> {
    let name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");
    let stem = name.split('.').next().unwrap_or("");
    Ok(PatientId::new(stem)?)
}

/// Reads one patient's hourly table.
///
/// Columns are matched to the canonical schema by name, in any order.
/// Canonical features absent from the header stay missing for every hour;
/// unknown columns are ignored. The raw label column is required.
pub fn read_patient_timeline(path: &Path, label_column: &str) -> Result<PatientTimeline> {
    let patient_id = patient_id_from_path(path)?;
    let file = File::open(path).map_err(|e| read_error(path, e, PATIENT_FILE_HINT))?;

    let mut reader = ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| csv_error(path, &e))?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.trim().is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let slots = column_slots(&headers, label_column);
    if !slots.contains(&ColumnSlot::Label) {
        return Err(IngestError::MissingLabelColumn {
            column: label_column.to_string(),
            path: path.to_path_buf(),
        });
    }

    let mut hours = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, &e))?;
        let line = record.position().map(csv::Position::line).unwrap_or(0);
        let mut observation = Observation::empty();
        let mut onset_label = None;

        for ((slot, header), raw) in slots.iter().zip(headers.iter()).zip(record.iter()) {
            if *slot == ColumnSlot::Ignored {
                continue;
            }
            let value = parse_cell(raw).map_err(|_| IngestError::InvalidValue {
                path: path.to_path_buf(),
                line,
                column: header.to_string(),
                value: raw.to_string(),
            })?;
            match slot {
                ColumnSlot::Feature(index) => observation.set(*index, value),
                ColumnSlot::Label => onset_label = value,
                ColumnSlot::Ignored => {}
            }
        }

        hours.push(HourRecord::new(observation, onset_label));
    }

    tracing::trace!(
        patient_id = %patient_id,
        hours = hours.len(),
        "read patient timeline"
    );

    Ok(PatientTimeline::new(patient_id, hours))
}

/// Resolves each header to a slot. The first occurrence of a name wins.
fn column_slots(headers: &csv::StringRecord, label_column: &str) -> Vec<ColumnSlot> {
    let mut seen = [false; FEATURE_COUNT];
    let mut label_seen = false;
    headers
        .iter()
        .map(|header| {
            let header = header.trim().trim_matches('\u{feff}');
            if header.eq_ignore_ascii_case(label_column) && !label_seen {
                label_seen = true;
                return ColumnSlot::Label;
            }
            match feature_index(header) {
                Some(index) if !seen[index] => {
                    seen[index] = true;
                    ColumnSlot::Feature(index)
                }
                _ => ColumnSlot::Ignored,
            }
        })
        .collect()
}

fn csv_error(path: &Path, err: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_patient(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        write!(file, "{content}").unwrap();
        path
    }

    #[test]
    fn test_patient_id_from_path() {
        let id = patient_id_from_path(Path::new("/data/setA/p000009.psv")).unwrap();
        assert_eq!(id.as_str(), "p000009");
        let id = patient_id_from_path(Path::new("p1.backup.psv")).unwrap();
        assert_eq!(id.as_str(), "p1");
    }

    #[test]
    fn test_reads_features_and_label() {
        let dir = TempDir::new().unwrap();
        let path = write_patient(
            &dir,
            "p000001.psv",
            "HR|O2Sat|Temp|Unknown|SepsisLabel\n80|NaN|36.6|x|0\nNaN|97||y|1\n",
        );

        let timeline = read_patient_timeline(&path, "SepsisLabel").unwrap();

        assert_eq!(timeline.patient_id.as_str(), "p000001");
        assert_eq!(timeline.len(), 2);
        let first = &timeline.hours[0];
        assert_eq!(first.observation.get(0), Some(80.0));
        assert_eq!(first.observation.get(1), None);
        assert_eq!(first.observation.get(2), Some(36.6));
        assert_eq!(first.onset_label, Some(0.0));
        let second = &timeline.hours[1];
        assert_eq!(second.observation.get(0), None);
        assert_eq!(second.observation.get(1), Some(97.0));
        assert_eq!(second.onset_label, Some(1.0));
        // Columns absent from the file stay missing.
        assert_eq!(second.observation.get(feature_index("Lactate").unwrap()), None);
    }

    #[test]
    fn test_missing_label_column_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_patient(&dir, "p000002.psv", "HR|Temp\n80|36.6\n");
        let result = read_patient_timeline(&path, "SepsisLabel");
        assert!(matches!(result, Err(IngestError::MissingLabelColumn { .. })));
    }

    #[test]
    fn test_malformed_value_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_patient(&dir, "p000003.psv", "HR|SepsisLabel\nfast|0\n");
        let result = read_patient_timeline(&path, "SepsisLabel");
        match result {
            Err(IngestError::InvalidValue { column, value, .. }) => {
                assert_eq!(column, "HR");
                assert_eq!(value, "fast");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn test_ragged_row_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_patient(&dir, "p000004.psv", "HR|SepsisLabel\n80|0|9\n");
        let result = read_patient_timeline(&path, "SepsisLabel");
        assert!(matches!(result, Err(IngestError::CsvParse { .. })));
    }

    #[test]
    fn test_empty_file_fails() {
        let dir = TempDir::new().unwrap();
        let path = write_patient(&dir, "p000005.psv", "");
        let result = read_patient_timeline(&path, "SepsisLabel");
        assert!(matches!(result, Err(IngestError::EmptyCsv { .. })));
    }

    #[test]
    fn test_header_only_is_empty_timeline() {
        let dir = TempDir::new().unwrap();
        let path = write_patient(&dir, "p000006.psv", "HR|SepsisLabel\n");
        let timeline = read_patient_timeline(&path, "SepsisLabel").unwrap();
        assert!(timeline.is_empty());
    }
}
