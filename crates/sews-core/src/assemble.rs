//! Dataset assembly.
//!
//! Each patient file is loaded, imputed and labeled on its own rayon task.
//! A failing file is recorded and skipped; the rest of the batch carries
//! on. Results are merged sequentially into one corpus afterwards, so the
//! only shared state during the parallel phase is the progress bar.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use rayon::prelude::*;

use sews_ingest::{IngestError, read_patient_timeline};
use sews_model::{Corpus, LabeledRow, PipelineOptions};

use crate::impute::impute_timeline;
use crate::label::label_timeline;

/// A patient file that could not be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Counts gathered while assembling a corpus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyReport {
    /// Patient files attempted.
    pub files: usize,
    /// Patients that contributed at least one row.
    pub patients_with_rows: usize,
    /// Patients loaded fine but too short for the horizon.
    pub patients_without_rows: usize,
    pub failures: Vec<PatientFailure>,
}

impl AssemblyReport {
    pub fn skipped(&self) -> usize {
        self.failures.len()
    }
}

/// Loads, imputes and labels one patient file.
pub fn process_patient_file(
    path: &Path,
    options: &PipelineOptions,
) -> Result<Vec<LabeledRow>, IngestError> {
    let timeline = read_patient_timeline(path, &options.label_column)?;
    let imputed = impute_timeline(&timeline, options.sentinel);
    Ok(label_timeline(&imputed, options.horizon_hours))
}

/// Builds a corpus from patient files, isolating per-file failures.
///
/// `progress` is advanced once per file; pass [`ProgressBar::hidden`] when
/// no display is wanted.
pub fn assemble_corpus(
    files: &[PathBuf],
    options: &PipelineOptions,
    progress: &ProgressBar,
) -> (Corpus, AssemblyReport) {
    let outcomes: Vec<(&PathBuf, Result<Vec<LabeledRow>, IngestError>)> = files
        .par_iter()
        .map(|path| {
            let outcome = process_patient_file(path, options);
            progress.inc(1);
            (path, outcome)
        })
        .collect();

    let mut corpus = Corpus::default();
    let mut report = AssemblyReport {
        files: files.len(),
        ..AssemblyReport::default()
    };

    for (path, outcome) in outcomes {
        match outcome {
            Ok(rows) if rows.is_empty() => report.patients_without_rows += 1,
            Ok(rows) => {
                report.patients_with_rows += 1;
                corpus.extend(rows);
            }
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "skipping patient file");
                report.failures.push(PatientFailure {
                    path: path.clone(),
                    reason: error.to_string(),
                });
            }
        }
    }

    corpus.sort_by_patient();
    (corpus, report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn psv(hours: usize, onset_at: Option<usize>) -> String {
        let mut out = String::from("HR|Temp|SepsisLabel\n");
        for t in 0..hours {
            let label = u8::from(onset_at.is_some_and(|onset| t >= onset));
            out.push_str(&format!("{}|NaN|{label}\n", 80 + t));
        }
        out
    }

    #[test]
    fn failures_are_isolated() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write(&dir, "p000001.psv", &psv(10, Some(8))),
            write(&dir, "p000002.psv", "HR|Temp\n80|36\n"),
            write(&dir, "p000003.psv", &psv(3, None)),
            write(&dir, "p000004.psv", &psv(8, None)),
        ];

        let (corpus, report) =
            assemble_corpus(&files, &PipelineOptions::default(), &ProgressBar::hidden());

        assert_eq!(report.files, 4);
        assert_eq!(report.patients_with_rows, 2);
        assert_eq!(report.patients_without_rows, 1);
        assert_eq!(report.skipped(), 1);
        assert!(report.failures[0].path.ends_with("p000002.psv"));
        assert_eq!(corpus.len(), 4 + 2);
        assert_eq!(corpus.patients().len(), 2);
    }

    #[test]
    fn rows_are_sorted_by_patient_and_hour() {
        let dir = TempDir::new().unwrap();
        let files = vec![
            write(&dir, "p000002.psv", &psv(8, None)),
            write(&dir, "p000001.psv", &psv(8, Some(7))),
        ];

        let (corpus, _) =
            assemble_corpus(&files, &PipelineOptions::default(), &ProgressBar::hidden());

        let keys: Vec<(String, usize)> = corpus
            .rows()
            .iter()
            .map(|row| (row.patient_id.to_string(), row.hour))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("p000001".to_string(), 0),
                ("p000001".to_string(), 1),
                ("p000002".to_string(), 0),
                ("p000002".to_string(), 1),
            ]
        );
        assert_eq!(corpus.rows()[1].target, 1);
        // Temp was never measured.
        assert_eq!(corpus.rows()[0].features[2], -1.0);
    }
}
