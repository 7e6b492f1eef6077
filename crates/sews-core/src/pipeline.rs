//! Stage orchestration: raw patient files to corpus, corpus to training
//! data.

use std::path::Path;
use std::time::Instant;

use indicatif::ProgressBar;
use tracing::{info, info_span};

use sews_ingest::list_patient_files;
use sews_model::{Corpus, PipelineOptions};

use crate::assemble::{AssemblyReport, assemble_corpus};
use crate::balance::{BalanceReport, balance_training};
use crate::error::{PipelineError, Result};
use crate::split::{PatientSplit, split_corpus};

/// Result of the ETL stages.
#[derive(Debug, Clone)]
pub struct EtlOutcome {
    pub corpus: Corpus,
    pub report: AssemblyReport,
}

/// Discovers, loads, imputes and labels every patient under `data_dir`.
///
/// `progress` receives the file count as its length once discovery is
/// done. A batch where no patient contributes a row is an error.
pub fn build_corpus(
    data_dir: &Path,
    options: &PipelineOptions,
    progress: &ProgressBar,
) -> Result<EtlOutcome> {
    options.validate()?;
    let etl_span = info_span!("etl", data_dir = %data_dir.display());
    let _etl_guard = etl_span.enter();

    // =========================================================================
    // Stage 1: Discover patient files
    // =========================================================================
    let files = list_patient_files(data_dir)?;
    info!(file_count = files.len(), "discovered patient files");
    progress.set_length(files.len() as u64);

    // =========================================================================
    // Stage 2: Impute, label and assemble
    // =========================================================================
    let assemble_start = Instant::now();
    let (corpus, report) = info_span!("assemble", file_count = files.len())
        .in_scope(|| assemble_corpus(&files, options, progress));
    progress.finish_and_clear();

    let counts = corpus.class_counts();
    info!(
        patient_count = report.patients_with_rows,
        short_patients = report.patients_without_rows,
        skipped = report.skipped(),
        row_count = corpus.len(),
        positive = counts.positive,
        duration_ms = assemble_start.elapsed().as_millis(),
        "assembly complete"
    );

    if corpus.is_empty() {
        return Err(PipelineError::EmptyCorpus {
            files: report.files,
            failed: report.skipped(),
        });
    }
    Ok(EtlOutcome { corpus, report })
}

/// Everything the training stage needs, derived from one corpus.
#[derive(Debug, Clone)]
pub struct TrainingData {
    pub split: PatientSplit,
    /// Training partition before balancing.
    pub training: Corpus,
    /// Balanced training rows, shuffled.
    pub balanced: Corpus,
    /// Holdout partition at natural prevalence.
    pub holdout: Corpus,
    pub balance: BalanceReport,
}

/// Splits by patient, then balances the training side only.
pub fn prepare_training_data(corpus: &Corpus, options: &PipelineOptions) -> Result<TrainingData> {
    options.validate()?;

    let split_start = Instant::now();
    let split = info_span!("split", patient_count = corpus.patients().len())
        .in_scope(|| split_corpus(corpus, options))?;
    info!(
        train_patients = split.split.train.len(),
        test_patients = split.split.test.len(),
        duration_ms = split_start.elapsed().as_millis(),
        "patient split complete"
    );

    let balance_start = Instant::now();
    let balanced = info_span!("balance", row_count = split.training.len()).in_scope(|| {
        balance_training(
            &split.training,
            options.negative_ratio,
            options.shortfall,
            options.seed,
        )
    })?;
    info!(
        positive = balanced.report.positives,
        negative = balanced.report.negatives_kept,
        clamped = balanced.report.clamped,
        duration_ms = balance_start.elapsed().as_millis(),
        "balancing complete"
    );

    Ok(TrainingData {
        split: split.split,
        training: split.training,
        balanced: balanced.rows,
        holdout: split.holdout,
        balance: balanced.report,
    })
}
