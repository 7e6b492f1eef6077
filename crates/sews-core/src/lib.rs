//! Dataset construction for the sepsis early-warning model.
//!
//! Raw per-patient timelines go through imputation and horizon labeling
//! independently, are assembled into one corpus, partitioned by patient
//! and, on the training side only, rebalanced. The schema normalizer
//! reshapes external long-format logs onto the same feature vector.

pub mod assemble;
pub mod balance;
pub mod error;
pub mod impute;
pub mod label;
pub mod normalize;
pub mod pipeline;
pub mod split;

pub use assemble::{AssemblyReport, PatientFailure, assemble_corpus, process_patient_file};
pub use balance::{BalanceReport, BalancedSet, balance_training};
pub use error::{PipelineError, Result};
pub use impute::impute_timeline;
pub use label::{coerce_target, label_timeline};
pub use normalize::{
    ItemLookup, NormalizedTable, RowKey, SchemaDiff, WideTable, normalize_long, normalize_wide,
    pivot_long,
};
pub use pipeline::{EtlOutcome, TrainingData, build_corpus, prepare_training_data};
pub use split::{PatientSplit, SplitCorpus, split_corpus, split_patients};
