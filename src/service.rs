//! Application state shared by every command.

use once_cell::sync::OnceCell;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{ArtifactsConfig, Config};
use crate::domain::{HistoricalPoint, PredictionPoint};
use crate::error::ForecastFailed;
use crate::forecast::AutoregressiveForecaster;
use crate::ml::{ArtifactError, ModelArtifacts};
use crate::repo::{HistoricalQuery, HistoryRepository, LoadError};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Artifacts(#[from] ArtifactError),

    #[error(transparent)]
    Forecast(#[from] ForecastFailed),

    #[error("forecast exceeded its {0:?} deadline")]
    DeadlineExceeded(Duration),

    #[error("forecast worker panicked: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub history: Arc<HistoryRepository>,
    artifacts: Arc<OnceCell<Arc<ModelArtifacts>>>,
}

impl AppState {
    pub fn new(cfg: Config) -> Result<Self, ServiceError> {
        let history = HistoryRepository::load(&cfg.data)?;
        Ok(Self::with_history(cfg, history))
    }

    /// Artifacts are loaded from `cfg.artifacts` on first forecast
    pub fn with_history(cfg: Config, history: HistoryRepository) -> Self {
        Self {
            cfg,
            history: Arc::new(history),
            artifacts: Arc::new(OnceCell::new()),
        }
    }

    pub fn with_artifacts(
        cfg: Config,
        history: HistoryRepository,
        artifacts: ModelArtifacts,
    ) -> Self {
        let state = Self::with_history(cfg, history);
        // a fresh cell cannot already be set
        let _ = state.artifacts.set(Arc::new(artifacts));
        state
    }

    /// Blocks on file reads the first time; call from the blocking pool
    pub fn artifacts(&self) -> Result<Arc<ModelArtifacts>, ArtifactError> {
        load_artifacts(&self.artifacts, &self.cfg.artifacts)
    }

    /// Roll the model forward over the configured horizon from the end of the
    /// loaded history.
    ///
    /// Artifact loading and the rollout both run on the blocking pool. On
    /// deadline expiry `cancel` is triggered and the rollout stops at its next
    /// step.
    pub async fn predict_next_24_hours(
        &self,
        cancel: CancellationToken,
    ) -> Result<Vec<PredictionPoint>, ServiceError> {
        let params = self.cfg.forecast.params();
        let deadline = self.cfg.forecast.deadline();
        let history = self.history.latest(params.lookback.max(1)).to_vec();
        let cell = Arc::clone(&self.artifacts);
        let artifacts_cfg = self.cfg.artifacts.clone();

        let token = cancel.clone();
        let task = tokio::task::spawn_blocking(move || -> Result<_, ServiceError> {
            let artifacts = load_artifacts(&cell, &artifacts_cfg)?;
            let points = AutoregressiveForecaster::new(
                artifacts.model.as_ref(),
                &artifacts.scaler,
                &artifacts.target_scaler,
                params,
            )
            .with_cancellation(token)
            .forecast(&history)?;
            Ok(points)
        });

        match tokio::time::timeout(deadline, task).await {
            Ok(joined) => {
                let points = joined??;
                info!(points = points.len(), "forecast served");
                Ok(points)
            }
            Err(_) => {
                warn!(?deadline, "forecast deadline exceeded, cancelling");
                cancel.cancel();
                Err(ServiceError::DeadlineExceeded(deadline))
            }
        }
    }

    pub fn historical(&self, query: &HistoricalQuery) -> Vec<HistoricalPoint> {
        let points = self.history.historical(query);
        info!(
            power_type = %query.power_type,
            inverter = query.inverter.as_deref().unwrap_or("all"),
            rows = points.len(),
            "historical query"
        );
        points
    }
}

fn load_artifacts(
    cell: &OnceCell<Arc<ModelArtifacts>>,
    cfg: &ArtifactsConfig,
) -> Result<Arc<ModelArtifacts>, ArtifactError> {
    cell.get_or_try_init(|| ModelArtifacts::load(cfg).map(Arc::new)).cloned()
}
