//! Single-patient risk queries and tiering.

use std::fmt;

use sews_model::{FeatureVector, Observation, RiskThresholds, feature_index};

use crate::classifier::Classifier;
use crate::error::{PredictError, Result};

/// Risk band for a predicted probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum RiskTier {
    Low,
    Moderate,
    High,
}

impl RiskTier {
    /// `> high` is High, `> moderate` is Moderate, anything else Low.
    pub fn classify(probability: f64, thresholds: &RiskThresholds) -> Self {
        if probability > thresholds.high {
            Self::High
        } else if probability > thresholds.moderate {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn headline(self) -> &'static str {
        match self {
            Self::Low => "LOW RISK",
            Self::Moderate => "MODERATE RISK",
            Self::High => "HIGH RISK DETECTED",
        }
    }

    pub fn status(self) -> &'static str {
        match self {
            Self::Low => "Stable",
            Self::Moderate => "Elevated",
            Self::High => "CRITICAL",
        }
    }

    /// Clinical follow-up for this tier.
    pub fn recommendation(self) -> &'static [&'static str] {
        match self {
            Self::Low => &["Patient is stable. Continue standard ICU monitoring."],
            Self::Moderate => &[
                "Increase monitoring frequency",
                "Check WBC and inflammatory markers",
                "Re-evaluate SOFA score in 2 hours",
            ],
            Self::High => &[
                "Immediate sepsis bundle activation required",
                "Order lactate and blood cultures",
                "Start broad-spectrum antibiotics within 1 hour",
                "Initiate IV fluid resuscitation (30 mL/kg)",
            ],
        }
    }
}

impl fmt::Display for RiskTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Encoding used by the training data.
    pub fn code(self) -> f64 {
        match self {
            Self::Male => 0.0,
            Self::Female => 1.0,
        }
    }
}

/// A partially filled observation for one patient-hour.
///
/// Anything not set is scored as the sentinel, the same way an
/// unmeasured feature looks in training data.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RiskQuery {
    observation: Observation,
}

impl RiskQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a canonical feature by name (case-insensitive).
    pub fn set(&mut self, name: &str, value: f64) -> Result<&mut Self> {
        let index =
            feature_index(name).ok_or_else(|| PredictError::UnknownFeature(name.to_string()))?;
        if !value.is_finite() {
            return Err(PredictError::NonFiniteValue {
                feature: name.to_string(),
                value: value.to_string(),
            });
        }
        self.observation.set(index, Some(value));
        Ok(self)
    }

    /// Applies a `NAME=VALUE` assignment.
    pub fn assign(&mut self, assignment: &str) -> Result<&mut Self> {
        let (name, raw) = assignment
            .split_once('=')
            .ok_or_else(|| PredictError::InvalidAssignment(assignment.to_string()))?;
        let name = name.trim();
        let value: f64 = raw
            .trim()
            .parse()
            .map_err(|_| PredictError::NonFiniteValue {
                feature: name.to_string(),
                value: raw.trim().to_string(),
            })?;
        self.set(name, value)
    }

    /// Sets a lab value; zero or below means "not ordered" and is ignored.
    pub fn set_lab(&mut self, name: &str, value: f64) -> Result<&mut Self> {
        if value > 0.0 {
            self.set(name, value)
        } else {
            Ok(self)
        }
    }

    pub fn set_gender(&mut self, gender: Gender) -> Result<&mut Self> {
        self.set("Gender", gender.code())
    }

    /// Hours since hospital admission, stored as a negative offset.
    pub fn set_hours_since_admission(&mut self, hours: f64) -> Result<&mut Self> {
        self.set("HospAdmTime", -hours)
    }

    pub fn observation(&self) -> &Observation {
        &self.observation
    }

    pub fn to_vector(&self, sentinel: f64) -> FeatureVector {
        self.observation.to_vector(sentinel)
    }
}

/// A scored query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskAssessment {
    pub probability: f64,
    pub tier: RiskTier,
}

impl RiskAssessment {
    pub fn percent(&self) -> f64 {
        self.probability * 100.0
    }

    /// Plain-text report for terminals.
    pub fn render(&self) -> String {
        let mut out = format!(
            "{}\nSepsis probability: {:.1}% ({})\nClinical recommendation:\n",
            self.tier.headline(),
            self.percent(),
            self.tier.status()
        );
        for line in self.tier.recommendation() {
            out.push_str("  - ");
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}

/// Scores `query` with `classifier` and assigns a tier.
pub fn assess<C: Classifier + ?Sized>(
    classifier: &C,
    query: &RiskQuery,
    sentinel: f64,
    thresholds: &RiskThresholds,
) -> RiskAssessment {
    let probability = classifier
        .predict_proba(&query.to_vector(sentinel))
        .clamp(0.0, 1.0);
    RiskAssessment {
        probability,
        tier: RiskTier::classify(probability, thresholds),
    }
}
