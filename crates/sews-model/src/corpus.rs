//! Labeled rows and the assembled corpus.

use std::collections::BTreeSet;

use crate::ids::PatientId;
use crate::schema::FEATURE_COUNT;

/// A fully populated feature vector in canonical order.
pub type FeatureVector = [f64; FEATURE_COUNT];

/// One training example: the features observed at `hour` and whether the
/// onset label was set `horizon` hours later.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledRow {
    pub patient_id: PatientId,
    pub hour: usize,
    pub features: FeatureVector,
    pub target: u8,
}

impl LabeledRow {
    pub fn new(patient_id: PatientId, hour: usize, features: FeatureVector, target: u8) -> Self {
        Self {
            patient_id,
            hour,
            features,
            target,
        }
    }

    pub fn is_positive(&self) -> bool {
        self.target == 1
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub positive: usize,
    pub negative: usize,
}

impl ClassCounts {
    pub fn total(self) -> usize {
        self.positive + self.negative
    }
}

/// Unordered collection of labeled rows.
///
/// The patient identifier is kept on every row; all partitioning goes
/// through it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Corpus {
    rows: Vec<LabeledRow>,
}

impl Corpus {
    pub fn new(rows: Vec<LabeledRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[LabeledRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<LabeledRow> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn extend(&mut self, rows: impl IntoIterator<Item = LabeledRow>) {
        self.rows.extend(rows);
    }

    /// Distinct patients contributing at least one row.
    pub fn patients(&self) -> BTreeSet<PatientId> {
        self.rows.iter().map(|row| row.patient_id.clone()).collect()
    }

    pub fn class_counts(&self) -> ClassCounts {
        let positive = self.rows.iter().filter(|row| row.is_positive()).count();
        ClassCounts {
            positive,
            negative: self.rows.len() - positive,
        }
    }

    /// Share of positive rows; 0.0 for an empty corpus.
    pub fn prevalence(&self) -> f64 {
        if self.rows.is_empty() {
            0.0
        } else {
            self.class_counts().positive as f64 / self.rows.len() as f64
        }
    }

    /// Rows whose patient is in `patients`.
    pub fn select_patients(&self, patients: &BTreeSet<PatientId>) -> Corpus {
        Corpus::new(
            self.rows
                .iter()
                .filter(|row| patients.contains(&row.patient_id))
                .cloned()
                .collect(),
        )
    }

    /// Sorts rows by (patient, hour) so persisted output is deterministic.
    pub fn sort_by_patient(&mut self) {
        self.rows
            .sort_by(|a, b| a.patient_id.cmp(&b.patient_id).then(a.hour.cmp(&b.hour)));
    }
}

impl FromIterator<LabeledRow> for Corpus {
    fn from_iter<I: IntoIterator<Item = LabeledRow>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
