//! Data model for the sepsis early-warning pipeline.
//!
//! Everything downstream of ingestion speaks these types: the fixed
//! 40-feature clinical schema, per-patient timelines, labeled rows and
//! the assembled corpus, plus the pipeline options that parameterise
//! labeling, splitting, balancing and risk tiering.

pub mod corpus;
pub mod error;
pub mod ids;
pub mod options;
pub mod schema;
pub mod timeline;

pub use corpus::{ClassCounts, Corpus, FeatureVector, LabeledRow};
pub use error::{ModelError, Result};
pub use ids::PatientId;
pub use options::{PipelineOptions, RiskThresholds, ShortfallPolicy};
pub use schema::{
    DEFAULT_LABEL_COLUMN, FEATURE_COUNT, FEATURES, FeatureGroup, PATIENT_ID_COLUMN, SENTINEL,
    feature_group, feature_index, target_column,
};
pub use timeline::{HourRecord, ImputedHour, ImputedTimeline, Observation, PatientTimeline};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_counts_classes() {
        let id = PatientId::new("p000001").expect("valid id");
        let rows = vec![
            LabeledRow::new(id.clone(), 0, [SENTINEL; FEATURE_COUNT], 0),
            LabeledRow::new(id.clone(), 1, [SENTINEL; FEATURE_COUNT], 1),
            LabeledRow::new(id, 2, [SENTINEL; FEATURE_COUNT], 0),
        ];
        let corpus = Corpus::new(rows);
        let counts = corpus.class_counts();
        assert_eq!(counts.positive, 1);
        assert_eq!(counts.negative, 2);
        assert!((corpus.prevalence() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn options_serialize() {
        let options = PipelineOptions::default();
        let json = serde_json::to_string(&options).expect("serialize options");
        let round: PipelineOptions = serde_json::from_str(&json).expect("deserialize options");
        assert_eq!(round.horizon_hours, 6);
        assert_eq!(round.negative_ratio, 3);
    }
}
