//! Holdout evaluation and external-validation summaries.

use std::collections::BTreeSet;

use sews_model::{Corpus, FeatureVector};

use crate::classifier::Classifier;

/// Decision threshold for holdout metrics.
pub const DEFAULT_DECISION_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
    pub true_positive: usize,
}

impl ConfusionMatrix {
    pub fn record(&mut self, predicted: bool, actual: bool) {
        match (predicted, actual) {
            (true, true) => self.true_positive += 1,
            (true, false) => self.false_positive += 1,
            (false, true) => self.false_negative += 1,
            (false, false) => self.true_negative += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_negative + self.false_positive + self.false_negative + self.true_positive
    }

    pub fn accuracy(&self) -> Option<f64> {
        ratio(self.true_positive + self.true_negative, self.total())
    }

    pub fn precision(&self) -> Option<f64> {
        ratio(self.true_positive, self.true_positive + self.false_positive)
    }

    pub fn recall(&self) -> Option<f64> {
        ratio(self.true_positive, self.true_positive + self.false_negative)
    }
}

fn ratio(numerator: usize, denominator: usize) -> Option<f64> {
    (denominator > 0).then(|| numerator as f64 / denominator as f64)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub threshold: f64,
    pub patients: usize,
    pub matrix: ConfusionMatrix,
}

/// Scores every row of `holdout`; a probability strictly above
/// `threshold` predicts onset.
pub fn evaluate<C: Classifier + ?Sized>(
    classifier: &C,
    holdout: &Corpus,
    threshold: f64,
) -> Evaluation {
    let mut matrix = ConfusionMatrix::default();
    for row in holdout.rows() {
        let predicted = classifier.predict_proba(&row.features) > threshold;
        matrix.record(predicted, row.is_positive());
    }
    Evaluation {
        threshold,
        patients: holdout.patients().len(),
        matrix,
    }
}

/// Unlabeled scoring of an external dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalSummary {
    pub rows: usize,
    pub patients: usize,
    pub mean_risk: f64,
    pub alert_threshold: f64,
    /// Rows scoring strictly above `alert_threshold`.
    pub alerts: usize,
}

impl ExternalSummary {
    /// A mean of exactly zero means no row produced a usable signal,
    /// usually a feature mapping problem.
    pub fn looks_unmapped(&self) -> bool {
        self.mean_risk == 0.0
    }
}

/// Scores normalized external rows. `patients` counts distinct row owners.
pub fn summarize_external<C: Classifier + ?Sized>(
    classifier: &C,
    rows: &[FeatureVector],
    patients: &BTreeSet<&str>,
    alert_threshold: f64,
) -> ExternalSummary {
    let scores = classifier.predict_many(rows);
    let mean_risk = if scores.is_empty() {
        0.0
    } else {
        scores.iter().sum::<f64>() / scores.len() as f64
    };
    let alerts = scores.iter().filter(|p| **p > alert_threshold).count();
    ExternalSummary {
        rows: rows.len(),
        patients: patients.len(),
        mean_risk,
        alert_threshold,
        alerts,
    }
}
