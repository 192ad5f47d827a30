//! Startup loading of the classifier and scaler, and the per-request
//! prediction pipeline that uses them.

use tracing::{debug, info, trace};

use crate::compat::xgboost::XgbModel;
use crate::config::ServeConfig;
use crate::error::{ArtifactError, PredictError};
use crate::features::{FittedScaler, RawRecord, engineer, scale_and_assemble};
use crate::model::Classifier;

/// Immutable model artifacts, loaded once and shared by every handler.
#[derive(Debug, Clone)]
pub struct Artifacts {
    classifier: Classifier,
    scaler: FittedScaler,
}

impl Artifacts {
    pub fn new(classifier: Classifier, scaler: FittedScaler) -> Self {
        Self { classifier, scaler }
    }

    /// Load both artifacts named by `config`.
    ///
    /// Any failure is fatal: there is no partially available mode.
    pub fn load(config: &ServeConfig) -> Result<Self, ArtifactError> {
        let model_path = &config.model_path;
        let model = XgbModel::from_file(model_path).map_err(|source| ArtifactError::Model {
            path: model_path.clone(),
            source,
        })?;
        let classifier = model
            .to_classifier()
            .map_err(|source| ArtifactError::Conversion {
                path: model_path.clone(),
                source,
            })?;
        info!(
            path = %model_path.display(),
            xgboost_version = %model.version_string(),
            objective = classifier.objective(),
            n_trees = classifier.forest().n_trees(),
            n_features = classifier.n_features(),
            n_classes = classifier.n_classes(),
            dart = model.is_dart(),
            "loaded classifier"
        );

        let scaler_path = &config.scaler_path;
        let scaler =
            FittedScaler::from_file(scaler_path).map_err(|source| ArtifactError::Scaler {
                path: scaler_path.clone(),
                source,
            })?;
        info!(
            path = %scaler_path.display(),
            n_features_in = scaler.n_features_in(),
            named = scaler.feature_names_in().is_some(),
            "loaded scaler"
        );

        Ok(Self::new(classifier, scaler))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn scaler(&self) -> &FittedScaler {
        &self.scaler
    }

    /// Engineer, scale and classify `records`, one label per record.
    pub fn predict(&self, records: &[RawRecord]) -> Result<Vec<u32>, PredictError> {
        debug!(n_records = records.len(), "scoring batch");

        let engineered = engineer(records);
        let assembled = scale_and_assemble(&engineered, &self.scaler)?;
        trace!(columns = ?assembled.columns(), values = ?assembled.values(), "model input");

        Ok(self.classifier.predict(&assembled)?)
    }
}
