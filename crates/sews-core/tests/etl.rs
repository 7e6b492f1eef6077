//! End-to-end ETL over a temporary patient directory.

use std::fs;
use std::path::Path;

use indicatif::ProgressBar;
use tempfile::TempDir;

use sews_core::{PipelineError, build_corpus, prepare_training_data};
use sews_ingest::{read_corpus, write_corpus};
use sews_model::{PipelineOptions, SENTINEL, ShortfallPolicy, feature_index};

const HEADER: &str = "HR|O2Sat|Temp|SBP|Lactate|Age|Gender|SepsisLabel";

fn write_patient(dir: &Path, name: &str, rows: &[&str]) {
    let mut contents = String::from(HEADER);
    for row in rows {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    fs::write(dir.join(name), contents).unwrap();
}

/// Ten hours, onset flagged from hour 8 on.
fn septic_patient() -> Vec<&'static str> {
    vec![
        "NaN|97|NaN|120|NaN|65|1|0",
        "80|NaN|37.0|NaN|NaN|65|1|0",
        "NaN|NaN|NaN|NaN|2.1|65|1|0",
        "90|95|NaN|NaN|NaN|65|1|0",
        "NaN|NaN|38.1|NaN|NaN|65|1|0",
        "100|NaN|NaN|110|NaN|65|1|0",
        "NaN|NaN|NaN|NaN|NaN|65|1|0",
        "110|93|38.5|NaN|3.9|65|1|0",
        "NaN|NaN|NaN|NaN|NaN|65|1|1",
        "120|NaN|NaN|NaN|NaN|65|1|1",
    ]
}

fn stable_patient(hours: usize) -> Vec<&'static str> {
    vec!["75|98|36.8|125|NaN|40|0|0"; hours]
}

#[test]
fn ten_hour_patient_produces_four_rows() {
    let dir = TempDir::new().unwrap();
    write_patient(dir.path(), "p000001.psv", &septic_patient());

    let outcome = build_corpus(
        dir.path(),
        &PipelineOptions::default(),
        &ProgressBar::hidden(),
    )
    .unwrap();

    let rows = outcome.corpus.rows();
    assert_eq!(rows.len(), 4);
    let targets: Vec<u8> = rows.iter().map(|row| row.target).collect();
    assert_eq!(targets, vec![0, 0, 1, 1]);

    let hr = feature_index("HR").unwrap();
    let lactate = feature_index("Lactate").unwrap();
    let wbc = feature_index("WBC").unwrap();
    // Hour 0 HR back-filled from hour 1.
    assert_eq!(rows[0].features[hr], 80.0);
    assert_eq!(rows[0].features[lactate], 2.1);
    assert_eq!(rows[3].features[lactate], 2.1);
    assert!(rows.iter().all(|row| row.features[wbc] == SENTINEL));
}

#[test]
fn corrupt_patient_is_skipped_and_counted() {
    let dir = TempDir::new().unwrap();
    write_patient(dir.path(), "p000001.psv", &septic_patient());
    write_patient(dir.path(), "p000002.psv", &stable_patient(9));
    write_patient(dir.path(), "p000003.psv", &["75|98|hot|125|NaN|40|0|0"]);
    write_patient(dir.path(), "p000004.psv", &stable_patient(4));

    let outcome = build_corpus(
        dir.path(),
        &PipelineOptions::default(),
        &ProgressBar::hidden(),
    )
    .unwrap();

    assert_eq!(outcome.report.files, 4);
    assert_eq!(outcome.report.skipped(), 1);
    assert!(outcome.report.failures[0].path.ends_with("p000003.psv"));
    assert_eq!(outcome.report.patients_with_rows, 2);
    assert_eq!(outcome.report.patients_without_rows, 1);
    assert_eq!(outcome.corpus.len(), 4 + 3);
}

#[test]
fn batch_without_rows_is_an_error() {
    let dir = TempDir::new().unwrap();
    write_patient(dir.path(), "p000001.psv", &stable_patient(3));

    let err = build_corpus(
        dir.path(),
        &PipelineOptions::default(),
        &ProgressBar::hidden(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::EmptyCorpus {
            files: 1,
            failed: 0
        }
    ));
}

#[test]
fn missing_data_directory_is_source_unavailable() {
    let dir = TempDir::new().unwrap();
    let err = build_corpus(
        &dir.path().join("sepsis_data"),
        &PipelineOptions::default(),
        &ProgressBar::hidden(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Ingest(sews_ingest::IngestError::SourceUnavailable { .. })
    ));
}

#[test]
fn persisted_corpus_feeds_training_preparation() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    fs::create_dir(&data).unwrap();
    for p in 0..10 {
        let name = format!("p{p:06}.psv");
        if p % 2 == 0 {
            write_patient(&data, &name, &septic_patient());
        } else {
            write_patient(&data, &name, &stable_patient(12));
        }
    }

    let options = PipelineOptions::default();
    let outcome = build_corpus(&data, &options, &ProgressBar::hidden()).unwrap();
    let path = dir.path().join("final_processed_sepsis_data.csv");
    write_corpus(&path, &outcome.corpus, options.horizon_hours).unwrap();
    let corpus = read_corpus(&path, options.horizon_hours).unwrap();
    assert_eq!(corpus, outcome.corpus);

    let prepared = prepare_training_data(&corpus, &options).unwrap();
    assert_eq!(prepared.split.test.len(), 2);
    assert_eq!(prepared.split.train.len(), 8);
    assert!(prepared.split.train.is_disjoint(&prepared.split.test));
    assert_eq!(prepared.holdout, corpus.select_patients(&prepared.split.test));

    let balanced = prepared.balanced.class_counts();
    let training = prepared.training.class_counts();
    assert_eq!(balanced.positive, training.positive);
    assert_eq!(
        balanced.negative,
        (3 * training.positive).min(training.negative)
    );
}

#[test]
fn fail_policy_surfaces_shortfall() {
    let dir = TempDir::new().unwrap();
    for p in 0..5 {
        write_patient(dir.path(), &format!("p{p:06}.psv"), &septic_patient());
    }
    let options = PipelineOptions::default().with_shortfall(ShortfallPolicy::Fail);
    let outcome = build_corpus(dir.path(), &options, &ProgressBar::hidden()).unwrap();

    // Two positives and two negatives per patient: 3x cannot be met.
    let err = prepare_training_data(&outcome.corpus, &options).unwrap_err();
    assert!(matches!(err, PipelineError::InsufficientSamples { .. }));
}
