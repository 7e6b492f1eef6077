//! Configuration options for corpus construction, training and tiering.
//!
//! Defaults reproduce the clinical decisions the model was built with
//! (6-hour horizon, 3:1 negative downsampling, 15% / 40% risk tiers).
//! They are exposed as configuration, but changing them changes the
//! clinical meaning of the output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::schema::{DEFAULT_LABEL_COLUMN, SENTINEL, feature_index};

/// What the balancer does when fewer negatives exist than requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShortfallPolicy {
    /// Keep every available negative and log the shortfall.
    #[default]
    Clamp,
    /// Refuse to build the training set.
    Fail,
}

/// Probability cut-offs for the displayed risk tier.
///
/// A probability strictly above `high` is high risk, strictly above
/// `moderate` is moderate risk, anything else is low risk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub moderate: f64,
    pub high: f64,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            moderate: 0.15,
            high: 0.40,
        }
    }
}

/// Options shared by every pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineOptions {
    /// Look-ahead between the feature hour and the target label.
    pub horizon_hours: usize,
    /// Fill value for features never measured for a patient.
    pub sentinel: f64,
    /// Raw onset label column in patient files.
    pub label_column: String,
    /// Share of patients held out for evaluation.
    pub test_fraction: f64,
    /// Seed for the split, the negative sample and the shuffle.
    pub seed: u64,
    /// Negatives kept per positive in the balanced training set.
    pub negative_ratio: usize,
    pub shortfall: ShortfallPolicy,
    pub risk: RiskThresholds,
    /// Probability above which an external patient-hour raises an alert.
    pub external_alert_threshold: f64,
    /// Extra external measurement codes mapped to canonical feature names.
    pub item_map: BTreeMap<String, String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            horizon_hours: 6,
            sentinel: SENTINEL,
            label_column: DEFAULT_LABEL_COLUMN.to_string(),
            test_fraction: 0.2,
            seed: 42,
            negative_ratio: 3,
            shortfall: ShortfallPolicy::default(),
            risk: RiskThresholds::default(),
            external_alert_threshold: 0.45,
            item_map: BTreeMap::new(),
        }
    }
}

impl PipelineOptions {
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_shortfall(mut self, policy: ShortfallPolicy) -> Self {
        self.shortfall = policy;
        self
    }

    /// Checks that every option is usable.
    pub fn validate(&self) -> Result<()> {
        if self.horizon_hours == 0 {
            return Err(invalid("horizon_hours", "must be at least 1"));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(invalid(
                "test_fraction",
                format!("{} is outside (0, 1)", self.test_fraction),
            ));
        }
        if self.negative_ratio == 0 {
            return Err(invalid("negative_ratio", "must be at least 1"));
        }
        if !self.sentinel.is_finite() {
            return Err(invalid("sentinel", "must be finite"));
        }
        for (field, value) in [
            ("risk.moderate", self.risk.moderate),
            ("risk.high", self.risk.high),
            ("external_alert_threshold", self.external_alert_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("{value} is outside [0, 1]")));
            }
        }
        if self.risk.moderate >= self.risk.high {
            return Err(invalid(
                "risk",
                format!(
                    "moderate ({}) must be below high ({})",
                    self.risk.moderate, self.risk.high
                ),
            ));
        }
        for (code, feature) in &self.item_map {
            if feature_index(feature).is_none() {
                return Err(invalid(
                    "item_map",
                    format!("code {code} maps to unknown feature {feature}"),
                ));
            }
        }
        if self.label_column.trim().is_empty() {
            return Err(invalid("label_column", "must not be empty"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ModelError {
    ModelError::InvalidOption {
        field,
        reason: reason.into(),
    }
}
