//! Per-patient hourly timelines, before and after imputation.

use crate::corpus::FeatureVector;
use crate::error::{ModelError, Result};
use crate::ids::PatientId;
use crate::schema::{FEATURE_COUNT, feature_index};

/// One hour of measurements. `None` means not collected, which is distinct
/// from a measured zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    values: [Option<f64>; FEATURE_COUNT],
}

impl Observation {
    /// An observation with every feature missing.
    pub fn empty() -> Self {
        Self {
            values: [None; FEATURE_COUNT],
        }
    }

    pub fn values(&self) -> &[Option<f64>; FEATURE_COUNT] {
        &self.values
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Sets a feature by position. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: Option<f64>) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = value;
        }
    }

    /// Sets a feature by canonical name (case-insensitive).
    pub fn set_named(&mut self, name: &str, value: f64) -> Result<()> {
        let index =
            feature_index(name).ok_or_else(|| ModelError::UnknownFeature(name.to_string()))?;
        self.values[index] = Some(value);
        Ok(())
    }

    pub fn missing_count(&self) -> usize {
        self.values.iter().filter(|value| value.is_none()).count()
    }

    /// Replaces every missing value with `fill`.
    pub fn to_vector(&self, fill: f64) -> FeatureVector {
        let mut out = [fill; FEATURE_COUNT];
        for (slot, value) in out.iter_mut().zip(self.values.iter()) {
            if let Some(v) = value {
                *slot = *v;
            }
        }
        out
    }
}

impl Default for Observation {
    fn default() -> Self {
        Self::empty()
    }
}

/// One raw row of a patient file: the hour's measurements plus the raw
/// onset label for that hour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourRecord {
    pub observation: Observation,
    pub onset_label: Option<f64>,
}

impl HourRecord {
    pub fn new(observation: Observation, onset_label: Option<f64>) -> Self {
        Self {
            observation,
            onset_label,
        }
    }
}

/// A patient's hourly records in elapsed-hour order, as read from storage.
#[derive(Debug, Clone, PartialEq)]
pub struct PatientTimeline {
    pub patient_id: PatientId,
    pub hours: Vec<HourRecord>,
}

impl PatientTimeline {
    pub fn new(patient_id: PatientId, hours: Vec<HourRecord>) -> Self {
        Self { patient_id, hours }
    }

    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}

/// An hour after imputation: every feature has a value (real or sentinel).
///
/// The onset label may still be absent when the patient file never
/// recorded one; such labels are unobservable and cannot become targets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImputedHour {
    pub features: FeatureVector,
    pub onset_label: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImputedTimeline {
    pub patient_id: PatientId,
    pub hours: Vec<ImputedHour>,
}

impl ImputedTimeline {
    pub fn len(&self) -> usize {
        self.hours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hours.is_empty()
    }
}
