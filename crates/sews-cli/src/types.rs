use std::path::PathBuf;

use sews_core::{AssemblyReport, BalanceReport, SchemaDiff};
use sews_model::ClassCounts;
use sews_predict::{Evaluation, ExternalSummary, RiskAssessment};

#[derive(Debug)]
pub struct EtlResult {
    pub output: PathBuf,
    pub report: AssemblyReport,
    pub rows: usize,
    pub counts: ClassCounts,
    pub prevalence: f64,
}

#[derive(Debug)]
pub struct TrainResult {
    pub model_path: PathBuf,
    pub corpus_rows: usize,
    pub corpus_prevalence: f64,
    pub train_patients: usize,
    pub test_patients: usize,
    pub balance: BalanceReport,
    pub holdout_rows: usize,
    pub holdout_prevalence: f64,
    pub evaluation: Evaluation,
    pub top_weights: Vec<(String, f64)>,
}

#[derive(Debug)]
pub struct ExternalResult {
    pub dataset: PathBuf,
    pub source_rows: usize,
    pub skipped_rows: usize,
    pub diff: SchemaDiff,
    pub summary: ExternalSummary,
}

#[derive(Debug)]
pub struct PredictResult {
    pub assessment: RiskAssessment,
    pub provided: usize,
}
