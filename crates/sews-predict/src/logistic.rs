//! Built-in L2-regularised logistic regression.
//!
//! Features are z-scored with statistics from the training rows, then the
//! weights are fitted by full-batch gradient descent for a fixed number
//! of epochs. The fitted model carries its feature order and
//! standardisation so it can be serialised and scored on its own.

use serde::{Deserialize, Serialize};

use sews_model::{Corpus, FEATURE_COUNT, FEATURES, FeatureVector};

use crate::classifier::{Classifier, Trainer};
use crate::error::{PredictError, Result};

/// Columns with a spread below this are treated as constant.
const MIN_SCALE: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogisticTrainer {
    pub epochs: usize,
    pub learning_rate: f64,
    pub l2: f64,
}

impl Default for LogisticTrainer {
    fn default() -> Self {
        Self {
            epochs: 300,
            learning_rate: 0.5,
            l2: 1e-3,
        }
    }
}

impl LogisticTrainer {
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }
}

impl Trainer for LogisticTrainer {
    type Model = LogisticModel;

    fn fit(&self, rows: &Corpus) -> Result<LogisticModel> {
        let rows = rows.rows();
        if rows.is_empty() {
            return Err(PredictError::EmptyTrainingSet);
        }
        let positives = rows.iter().filter(|row| row.is_positive()).count();
        if positives == 0 || positives == rows.len() {
            return Err(PredictError::SingleClass {
                label: rows[0].target,
            });
        }

        let n = rows.len() as f64;
        let mut means = [0.0; FEATURE_COUNT];
        for row in rows {
            for (mean, value) in means.iter_mut().zip(row.features) {
                *mean += value / n;
            }
        }
        let mut scales = [0.0; FEATURE_COUNT];
        for row in rows {
            for ((scale, mean), value) in scales.iter_mut().zip(means).zip(row.features) {
                *scale += (value - mean).powi(2) / n;
            }
        }
        for scale in &mut scales {
            *scale = if scale.sqrt() < MIN_SCALE {
                1.0
            } else {
                scale.sqrt()
            };
        }

        let standardized: Vec<(FeatureVector, f64)> = rows
            .iter()
            .map(|row| {
                (
                    standardize(&row.features, &means, &scales),
                    f64::from(row.target),
                )
            })
            .collect();

        let mut weights = [0.0; FEATURE_COUNT];
        let mut bias = 0.0;
        for _ in 0..self.epochs {
            let mut grad = [0.0; FEATURE_COUNT];
            let mut grad_bias = 0.0;
            for (x, y) in &standardized {
                let err = sigmoid(dot(&weights, x) + bias) - y;
                for (g, xi) in grad.iter_mut().zip(x) {
                    *g += err * xi;
                }
                grad_bias += err;
            }
            for (w, g) in weights.iter_mut().zip(grad) {
                *w -= self.learning_rate * (g / n + self.l2 * *w);
            }
            bias -= self.learning_rate * grad_bias / n;
        }

        tracing::debug!(
            rows = rows.len(),
            positives,
            epochs = self.epochs,
            "fitted logistic model"
        );

        Ok(LogisticModel {
            features: FEATURES.iter().map(|name| (*name).to_string()).collect(),
            means: means.to_vec(),
            scales: scales.to_vec(),
            weights: weights.to_vec(),
            bias,
            trained_rows: rows.len(),
        })
    }
}

/// A fitted logistic model, serialisable as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticModel {
    /// Feature names in the order the weights apply to.
    pub features: Vec<String>,
    pub means: Vec<f64>,
    pub scales: Vec<f64>,
    pub weights: Vec<f64>,
    pub bias: f64,
    pub trained_rows: usize,
}

impl LogisticModel {
    /// Checks that the model matches the canonical schema.
    pub fn validate(&self) -> Result<()> {
        if self.features.len() != FEATURE_COUNT {
            return Err(PredictError::DimensionMismatch {
                expected: FEATURE_COUNT,
                found: self.features.len(),
            });
        }
        for (position, (found, expected)) in self.features.iter().zip(FEATURES).enumerate() {
            if found != expected {
                return Err(PredictError::FeatureOrder {
                    position,
                    expected: expected.to_string(),
                    found: found.clone(),
                });
            }
        }
        for values in [&self.means, &self.scales, &self.weights] {
            if values.len() != FEATURE_COUNT {
                return Err(PredictError::DimensionMismatch {
                    expected: FEATURE_COUNT,
                    found: values.len(),
                });
            }
        }
        check_parameters(
            "means",
            &self.features,
            &self.means,
            f64::is_finite,
            "a finite number",
        )?;
        check_parameters(
            "scales",
            &self.features,
            &self.scales,
            |scale| scale.is_finite() && scale > 0.0,
            "a finite number above zero",
        )?;
        check_parameters(
            "weights",
            &self.features,
            &self.weights,
            f64::is_finite,
            "a finite number",
        )?;
        if !self.bias.is_finite() {
            return Err(PredictError::InvalidParameter {
                name: "bias".to_string(),
                value: self.bias,
                expected: "a finite number",
            });
        }
        Ok(())
    }

    /// Weight per feature, largest magnitude first.
    pub fn top_weights(&self, count: usize) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .features
            .iter()
            .map(String::as_str)
            .zip(self.weights.iter().copied())
            .collect();
        ranked.sort_by(|a, b| b.1.abs().total_cmp(&a.1.abs()));
        ranked.truncate(count);
        ranked
    }
}

impl Classifier for LogisticModel {
    fn predict_proba(&self, features: &FeatureVector) -> f64 {
        let logit = features
            .iter()
            .zip(&self.means)
            .zip(&self.scales)
            .zip(&self.weights)
            .map(|(((value, mean), scale), weight)| (value - mean) / scale * weight)
            .sum::<f64>()
            + self.bias;
        sigmoid(logit)
    }
}

fn check_parameters(
    kind: &str,
    features: &[String],
    values: &[f64],
    valid: impl Fn(f64) -> bool,
    expected: &'static str,
) -> Result<()> {
    match features
        .iter()
        .zip(values)
        .find(|(_, value)| !valid(**value))
    {
        Some((feature, value)) => Err(PredictError::InvalidParameter {
            name: format!("{kind}[{feature}]"),
            value: *value,
            expected,
        }),
        None => Ok(()),
    }
}

fn standardize(
    features: &FeatureVector,
    means: &FeatureVector,
    scales: &FeatureVector,
) -> FeatureVector {
    let mut out = [0.0; FEATURE_COUNT];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = (features[i] - means[i]) / scales[i];
    }
    out
}

fn dot(a: &FeatureVector, b: &FeatureVector) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}
