//! CLI argument definitions for the sepsis early-warning pipeline.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

use sews_ingest::DEFAULT_CORPUS_FILE;
use sews_predict::DEFAULT_MODEL_FILE;

#[derive(Parser)]
#[command(
    name = "sews",
    version,
    about = "SEWS - Sepsis Early Warning System",
    long_about = "Build a 6-hour-ahead sepsis onset dataset from hourly ICU records,\n\
                  train a classifier on a patient-level split, validate it on an\n\
                  external long-format dataset and score single patients."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow patient-level values in trace logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Pipeline options; flags override values from `--config`.
#[derive(Args)]
pub struct PipelineArgs {
    /// JSON file with pipeline options.
    #[arg(long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Seed for the patient split, sampling and shuffling.
    #[arg(long = "seed", global = true)]
    pub seed: Option<u64>,

    /// Prediction horizon in hours.
    #[arg(long = "horizon-hours", value_name = "HOURS", global = true)]
    pub horizon_hours: Option<usize>,

    /// Share of patients held out for evaluation.
    #[arg(long = "test-fraction", value_name = "FRACTION", global = true)]
    pub test_fraction: Option<f64>,

    /// Negative rows kept per positive row when balancing.
    #[arg(long = "negative-ratio", value_name = "N", global = true)]
    pub negative_ratio: Option<usize>,

    /// What to do when fewer negatives exist than requested.
    #[arg(long = "shortfall", value_enum, global = true)]
    pub shortfall: Option<ShortfallArg>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the labeled corpus from per-patient `.psv` files.
    Etl(EtlArgs),

    /// Split, balance, train and evaluate; save the model.
    Train(TrainArgs),

    /// Score an external long-format dataset with a trained model.
    ValidateExternal(ValidateExternalArgs),

    /// Score a single patient-hour.
    Predict(PredictArgs),

    /// List the canonical feature vector.
    Features,
}

#[derive(Parser)]
pub struct EtlArgs {
    /// Directory containing per-patient `.psv` files (searched recursively).
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Corpus file to write.
    #[arg(long = "output", value_name = "FILE", default_value = DEFAULT_CORPUS_FILE)]
    pub output: PathBuf,
}

#[derive(Parser)]
pub struct TrainArgs {
    /// Corpus produced by `sews etl`.
    #[arg(long = "corpus", value_name = "FILE", default_value = DEFAULT_CORPUS_FILE)]
    pub corpus: PathBuf,

    /// Model file to write.
    #[arg(long = "model", value_name = "FILE", default_value = DEFAULT_MODEL_FILE)]
    pub model: PathBuf,

    /// Gradient descent epochs.
    #[arg(long = "epochs", default_value_t = 300)]
    pub epochs: usize,
}

#[derive(Parser)]
pub struct ValidateExternalArgs {
    /// Long-format CSV with SUBJECT_ID, CHARTTIME, ITEMID and VALUENUM columns.
    #[arg(value_name = "DATASET")]
    pub dataset: PathBuf,

    /// Model produced by `sews train`.
    #[arg(long = "model", value_name = "FILE", default_value = DEFAULT_MODEL_FILE)]
    pub model: PathBuf,

    /// Read at most this many rows (0 reads everything).
    #[arg(long = "max-rows", value_name = "N", default_value_t = 100_000)]
    pub max_rows: usize,
}

#[derive(Parser)]
pub struct PredictArgs {
    /// Model produced by `sews train`.
    #[arg(long = "model", value_name = "FILE", default_value = DEFAULT_MODEL_FILE)]
    pub model: PathBuf,

    /// Set any canonical feature, e.g. `--set Lactate=4.2` (repeatable).
    #[arg(long = "set", value_name = "NAME=VALUE")]
    pub assignments: Vec<String>,

    /// Heart rate (beats/min).
    #[arg(long = "hr")]
    pub hr: Option<f64>,

    /// Temperature (°C).
    #[arg(long = "temp")]
    pub temp: Option<f64>,

    /// Systolic blood pressure (mm Hg).
    #[arg(long = "sbp")]
    pub sbp: Option<f64>,

    /// Diastolic blood pressure (mm Hg).
    #[arg(long = "dbp")]
    pub dbp: Option<f64>,

    /// Mean arterial pressure (mm Hg).
    #[arg(long = "map")]
    pub map: Option<f64>,

    /// Respiration rate (breaths/min).
    #[arg(long = "resp")]
    pub resp: Option<f64>,

    /// Oxygen saturation (%).
    #[arg(long = "o2sat")]
    pub o2sat: Option<f64>,

    /// Lactate (mmol/L); 0 means not ordered.
    #[arg(long = "lactate")]
    pub lactate: Option<f64>,

    /// White blood cell count (K/uL); 0 means not ordered.
    #[arg(long = "wbc")]
    pub wbc: Option<f64>,

    /// Creatinine (mg/dL); 0 means not ordered.
    #[arg(long = "creatinine")]
    pub creatinine: Option<f64>,

    #[arg(long = "age")]
    pub age: Option<f64>,

    #[arg(long = "gender", value_enum)]
    pub gender: Option<GenderArg>,

    /// Hours since hospital admission.
    #[arg(long = "hours-since-admission", value_name = "HOURS")]
    pub hours_since_admission: Option<f64>,

    /// ICU length of stay in hours.
    #[arg(long = "icu-hours", value_name = "HOURS")]
    pub icu_hours: Option<f64>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum GenderArg {
    Male,
    Female,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ShortfallArg {
    /// Keep every available negative.
    Clamp,
    /// Abort training.
    Fail,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
