//! The fixed clinical feature schema.
//!
//! The classifier is trained against exactly these 40 columns in exactly
//! this order. Ingestion, normalization and inference all resolve names
//! against [`FEATURES`] so the ordering is defined in one place.

/// Number of canonical features in an observation.
pub const FEATURE_COUNT: usize = 40;

/// Reserved value meaning "never measured".
pub const SENTINEL: f64 = -1.0;

/// Raw onset label column in per-patient files.
pub const DEFAULT_LABEL_COLUMN: &str = "SepsisLabel";

/// Patient identifier column in the persisted corpus.
pub const PATIENT_ID_COLUMN: &str = "Patient_ID";

/// Canonical ordered feature names.
pub const FEATURES: [&str; FEATURE_COUNT] = [
    "HR",
    "O2Sat",
    "Temp",
    "SBP",
    "MAP",
    "DBP",
    "Resp",
    "EtCO2",
    "BaseExcess",
    "HCO3",
    "FiO2",
    "pH",
    "PaCO2",
    "SaO2",
    "AST",
    "BUN",
    "Alkalinephos",
    "Calcium",
    "Chloride",
    "Creatinine",
    "Bilirubin_direct",
    "Glucose",
    "Lactate",
    "Magnesium",
    "Phosphate",
    "Potassium",
    "Bilirubin_total",
    "TroponinI",
    "Hct",
    "Hgb",
    "PTT",
    "WBC",
    "Fibrinogen",
    "Platelets",
    "Age",
    "Gender",
    "Unit1",
    "Unit2",
    "HospAdmTime",
    "ICULOS",
];

const FIRST_LAB: usize = 7;
const FIRST_DEMOGRAPHIC: usize = 34;

/// Broad grouping of a feature, used for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeatureGroup {
    Vital,
    Lab,
    Demographic,
}

impl FeatureGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            FeatureGroup::Vital => "vital",
            FeatureGroup::Lab => "lab",
            FeatureGroup::Demographic => "demographic",
        }
    }
}

/// Group of the feature at `index`, or `None` when out of range.
pub fn feature_group(index: usize) -> Option<FeatureGroup> {
    match index {
        i if i < FIRST_LAB => Some(FeatureGroup::Vital),
        i if i < FIRST_DEMOGRAPHIC => Some(FeatureGroup::Lab),
        i if i < FEATURE_COUNT => Some(FeatureGroup::Demographic),
        _ => None,
    }
}

/// Resolves a feature name to its position (case-insensitive, trimmed).
pub fn feature_index(name: &str) -> Option<usize> {
    let trimmed = name.trim();
    FEATURES
        .iter()
        .position(|feature| feature.eq_ignore_ascii_case(trimmed))
}

/// Name of the horizon-shifted target column, e.g. `Target_Label_6h`.
pub fn target_column(horizon_hours: usize) -> String {
    format!("Target_Label_{horizon_hours}h")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_names_case_insensitively() {
        assert_eq!(feature_index("HR"), Some(0));
        assert_eq!(feature_index("ph"), Some(11));
        assert_eq!(feature_index(" iculos "), Some(39));
        assert_eq!(feature_index("SepsisLabel"), None);
    }

    #[test]
    fn groups_cover_schema() {
        assert_eq!(feature_group(feature_index("Resp").unwrap()), Some(FeatureGroup::Vital));
        assert_eq!(feature_group(feature_index("EtCO2").unwrap()), Some(FeatureGroup::Lab));
        assert_eq!(feature_group(feature_index("Platelets").unwrap()), Some(FeatureGroup::Lab));
        assert_eq!(
            feature_group(feature_index("Age").unwrap()),
            Some(FeatureGroup::Demographic)
        );
        assert_eq!(feature_group(FEATURE_COUNT), None);
    }

    #[test]
    fn feature_names_are_unique() {
        for (i, a) in FEATURES.iter().enumerate() {
            for b in &FEATURES[i + 1..] {
                assert!(!a.eq_ignore_ascii_case(b), "duplicate feature {a}");
            }
        }
    }

    #[test]
    fn target_column_tracks_horizon() {
        assert_eq!(target_column(6), "Target_Label_6h");
    }
}
