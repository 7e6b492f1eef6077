//! Sepsis early-warning inference.
//!
//! # Features
//!
//! - **Classifier Contract**: [`Trainer`] and [`Classifier`] traits
//! - **Logistic Model**: Built-in L2-regularised logistic regression
//! - **Artifacts**: JSON model files and a shared [`ModelHandle`]
//! - **Risk Queries**: Partial observations scored into risk tiers
//! - **Evaluation**: Holdout confusion matrix and external summaries

mod artifact;
mod classifier;
mod error;
mod evaluate;
mod logistic;
mod risk;

// === Error Types ===
pub use error::{PredictError, Result};

// === Classifier ===
pub use classifier::{Classifier, Trainer};
pub use logistic::{LogisticModel, LogisticTrainer};

// === Artifacts ===
pub use artifact::{DEFAULT_MODEL_FILE, ModelHandle, load_model, save_model};

// === Risk ===
pub use risk::{Gender, RiskAssessment, RiskQuery, RiskTier, assess};

// === Evaluation ===
pub use evaluate::{
    ConfusionMatrix, DEFAULT_DECISION_THRESHOLD, Evaluation, ExternalSummary, evaluate,
    summarize_external,
};
