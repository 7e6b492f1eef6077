//! Model persistence and the shared inference handle.

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;

use sews_model::FeatureVector;

use crate::classifier::Classifier;
use crate::error::{PredictError, Result};
use crate::logistic::LogisticModel;

/// Default model artifact written by `sews train`.
pub const DEFAULT_MODEL_FILE: &str = "sews_model.json";

const TRAIN_HINT: &str = "run `sews train` first to produce the model";

/// Writes `model` as pretty-printed JSON.
pub fn save_model(path: &Path, model: &LogisticModel) -> Result<()> {
    let io_error = |source| PredictError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_error)?);
    serde_json::to_writer_pretty(&mut writer, model).map_err(|source| {
        PredictError::Serialization {
            path: path.to_path_buf(),
            source,
        }
    })?;
    writer.flush().map_err(io_error)?;
    tracing::info!(path = %path.display(), "saved model");
    Ok(())
}

/// Reads a model and checks it against the canonical feature schema.
pub fn load_model(path: &Path) -> Result<LogisticModel> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => PredictError::ModelUnavailable {
            path: path.to_path_buf(),
            hint: TRAIN_HINT.to_string(),
        },
        _ => PredictError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;
    let model: LogisticModel =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            PredictError::Serialization {
                path: path.to_path_buf(),
                source,
            }
        })?;
    model.validate()?;
    Ok(model)
}

/// A loaded model shared read-only between callers.
///
/// Load it once and pass it to whatever needs to score; cloning only
/// bumps a reference count.
#[derive(Debug, Clone)]
pub struct ModelHandle {
    model: Arc<LogisticModel>,
}

impl ModelHandle {
    pub fn new(model: LogisticModel) -> Self {
        Self {
            model: Arc::new(model),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_model(path).map(Self::new)
    }

    pub fn model(&self) -> &LogisticModel {
        &self.model
    }
}

impl Classifier for ModelHandle {
    fn predict_proba(&self, features: &FeatureVector) -> f64 {
        self.model.predict_proba(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sews_model::{Corpus, FEATURE_COUNT, LabeledRow, PatientId};
    use tempfile::TempDir;

    use crate::classifier::Trainer;
    use crate::logistic::LogisticTrainer;

    fn model() -> LogisticModel {
        let id = PatientId::new("p1").unwrap();
        let rows: Corpus = (0..10)
            .map(|i| {
                let mut features = [0.0; FEATURE_COUNT];
                features[0] = i as f64;
                LabeledRow::new(id.clone(), i, features, u8::from(i >= 5))
            })
            .collect();
        LogisticTrainer::default().with_epochs(20).fit(&rows).unwrap()
    }

    #[test]
    fn saved_model_loads_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(DEFAULT_MODEL_FILE);
        let model = model();
        save_model(&path, &model).unwrap();

        let handle = ModelHandle::load(&path).unwrap();
        assert_eq!(handle.model().features, model.features);
        assert_eq!(handle.model().trained_rows, 10);
        let probe = [3.0; FEATURE_COUNT];
        let delta = handle.predict_proba(&probe) - model.predict_proba(&probe);
        assert!(delta.abs() < 1e-9);
    }

    #[test]
    fn missing_model_points_at_training() {
        let dir = TempDir::new().unwrap();
        let err = load_model(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, PredictError::ModelUnavailable { .. }));
        assert!(err.to_string().contains("sews train"));
    }

    #[test]
    fn truncated_weights_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        let mut model = model();
        model.weights.pop();
        save_model(&path, &model).unwrap();
        assert!(matches!(
            load_model(&path),
            Err(PredictError::DimensionMismatch {
                expected: 40,
                found: 39
            })
        ));
    }

    #[test]
    fn zero_scales_are_rejected_on_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        let mut model = model();
        model.scales = vec![0.0; FEATURE_COUNT];
        save_model(&path, &model).unwrap();
        assert!(matches!(
            ModelHandle::load(&path),
            Err(PredictError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn garbage_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            load_model(&path),
            Err(PredictError::Serialization { .. })
        ));
    }
}
