//! Error types for dataset construction.

use thiserror::Error;

use sews_ingest::IngestError;
use sews_model::ModelError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The balancer was asked for more negatives than exist and the
    /// shortfall policy forbids clamping.
    #[error(
        "insufficient negative samples: requested {requested}, only {available} available"
    )]
    InsufficientSamples { requested: usize, available: usize },

    /// No patient file produced any labeled row.
    #[error("no labeled rows produced from {files} patient files ({failed} failed to load)")]
    EmptyCorpus { files: usize, failed: usize },

    /// There is nobody to split.
    #[error("corpus contains no patients")]
    NoPatients,

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Ingest(#[from] IngestError),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
