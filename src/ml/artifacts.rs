//! Loading and fitting of the persisted model artifacts.

use std::sync::Arc;
use tracing::{info, warn};

use super::{
    ArtifactError, LinearSequenceModel, ModelMetadata, Predictor, StandardScaler, TargetScaler,
};
use crate::config::ArtifactsConfig;
use crate::domain::Observation;
use crate::forecast::features::{feature_vector, FEATURE_COLUMNS};

/// Model and scalers shared read-only by every forecast
pub struct ModelArtifacts {
    pub model: Arc<dyn Predictor>,
    pub metadata: ModelMetadata,
    pub scaler: StandardScaler,
    pub target_scaler: TargetScaler,
}

impl std::fmt::Debug for ModelArtifacts {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelArtifacts")
            .field("model_id", &self.metadata.model_id)
            .field("scaler_features", &self.scaler.n_features())
            .finish_non_exhaustive()
    }
}

impl ModelArtifacts {
    pub fn load(cfg: &ArtifactsConfig) -> Result<Self, ArtifactError> {
        let model = LinearSequenceModel::load(&cfg.model_path)?;
        info!(
            path = %cfg.model_path.display(),
            model_id = %model.metadata().model_id,
            version = %model.metadata().version,
            "model loaded"
        );

        let scaler = StandardScaler::load(&cfg.scaler_path)?;
        info!(path = %cfg.scaler_path.display(), features = scaler.n_features(), "scaler loaded");

        let target_scaler = TargetScaler::load(&cfg.target_scaler_path)?;
        info!(path = %cfg.target_scaler_path.display(), "target scaler loaded");

        let metadata = model.metadata().clone();
        Self::from_parts(Arc::new(model), metadata, scaler, target_scaler)
    }

    /// Assemble artifacts after checking that model and scaler agree on the
    /// window's column order.
    pub fn from_parts(
        model: Arc<dyn Predictor>,
        metadata: ModelMetadata,
        scaler: StandardScaler,
        target_scaler: TargetScaler,
    ) -> Result<Self, ArtifactError> {
        check_feature_order(&metadata.feature_names)?;
        if scaler.n_features() != FEATURE_COLUMNS.len() {
            return Err(ArtifactError::InvalidScaler(format!(
                "input scaler fitted on {} features, window has {}",
                scaler.n_features(),
                FEATURE_COLUMNS.len()
            )));
        }

        Ok(Self {
            model,
            metadata,
            scaler,
            target_scaler,
        })
    }
}

fn check_feature_order(declared: &[String]) -> Result<(), ArtifactError> {
    if declared.iter().map(String::as_str).eq(FEATURE_COLUMNS.iter().copied()) {
        return Ok(());
    }

    warn!(declared = ?declared, "model feature order differs from window layout");
    Err(ArtifactError::FeatureOrder {
        expected: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        found: declared.to_vec(),
    })
}

/// Fit the input scaler on window features and the target scaler on
/// `dc_power`.
pub fn fit_scalers(
    observations: &[Observation],
) -> Result<(StandardScaler, TargetScaler), ArtifactError> {
    let features: Vec<Vec<f64>> = observations.iter().map(feature_vector).collect();
    let targets: Vec<f64> = observations.iter().map(|o| o.dc_power).collect();

    let scaler = StandardScaler::fit(&features)?;
    let target_scaler = TargetScaler::fit(&targets)?;
    info!(rows = observations.len(), "scalers fitted");
    Ok((scaler, target_scaler))
}

pub fn save_scalers(
    cfg: &ArtifactsConfig,
    scaler: &StandardScaler,
    target_scaler: &TargetScaler,
) -> Result<(), ArtifactError> {
    scaler.save(&cfg.scaler_path)?;
    target_scaler.save(&cfg.target_scaler_path)?;
    info!(
        scaler = %cfg.scaler_path.display(),
        target_scaler = %cfg.target_scaler_path.display(),
        "scalers saved"
    );
    Ok(())
}
