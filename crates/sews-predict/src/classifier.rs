//! The classifier contract.
//!
//! The pipeline only needs to fit a model on balanced rows and to score
//! feature vectors. Anything implementing these two traits can stand in
//! for the built-in logistic model.

use sews_model::{Corpus, FeatureVector};

use crate::error::Result;

/// A fitted binary classifier.
pub trait Classifier {
    /// Probability that the positive class (onset within the horizon)
    /// applies to `features`. Always within `[0, 1]`.
    fn predict_proba(&self, features: &FeatureVector) -> f64;

    /// Scores many rows.
    fn predict_many(&self, rows: &[FeatureVector]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_proba(row)).collect()
    }
}

/// Fits a [`Classifier`] on labeled rows.
pub trait Trainer {
    type Model: Classifier;

    fn fit(&self, rows: &Corpus) -> Result<Self::Model>;
}
