use thiserror::Error;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("invalid patient identifier: {0:?}")]
    InvalidPatientId(String),
    #[error("unknown feature: {0}")]
    UnknownFeature(String),
    #[error("invalid option {field}: {reason}")]
    InvalidOption { field: &'static str, reason: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
