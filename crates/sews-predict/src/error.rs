//! Error types for training and inference.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PredictError {
    // === Model Artifact ===
    /// The model file does not exist yet.
    #[error("{path} not found; {hint}")]
    ModelUnavailable { path: PathBuf, hint: String },

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid model file {path}: {source}")]
    Serialization {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The artifact was trained against a different feature order.
    #[error("model feature {position} is '{found}', expected '{expected}'")]
    FeatureOrder {
        position: usize,
        expected: String,
        found: String,
    },

    #[error("expected {expected} values, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    /// A stored coefficient that would make every prediction NaN.
    #[error("model parameter {name} is {value}, expected {expected}")]
    InvalidParameter {
        name: String,
        value: f64,
        expected: &'static str,
    },

    // === Training ===
    #[error("cannot train on an empty training set")]
    EmptyTrainingSet,

    /// Every training row has the same target.
    #[error("training set contains only class {label}")]
    SingleClass { label: u8 },

    // === Queries ===
    #[error("unknown feature '{0}'")]
    UnknownFeature(String),

    #[error("value for {feature} must be a finite number, got {value}")]
    NonFiniteValue { feature: String, value: String },

    /// A `NAME=VALUE` assignment without the `=`.
    #[error("expected NAME=VALUE, got '{0}'")]
    InvalidAssignment(String),
}

pub type Result<T> = std::result::Result<T, PredictError>;
