//! In-memory plant history backed by the generation and weather CSV exports.

use tracing::info;

use crate::config::DataConfig;
use crate::domain::{HistoricalPoint, Observation};

pub mod historical;
pub mod loader;

pub use historical::HistoricalQuery;
pub use loader::LoadError;

/// Merged, feature-complete history ordered by timestamp
#[derive(Debug, Clone, Default)]
pub struct HistoryRepository {
    observations: Vec<Observation>,
}

impl HistoryRepository {
    pub fn new(observations: Vec<Observation>) -> Self {
        Self { observations }
    }

    pub fn load(cfg: &DataConfig) -> Result<Self, LoadError> {
        let observations = loader::load_files(&cfg.generation_csv, &cfg.weather_csv)?;
        if let (Some(first), Some(last)) = (observations.first(), observations.last()) {
            info!(
                rows = observations.len(),
                from = %first.timestamp,
                to = %last.timestamp,
                "history repository loaded"
            );
        }
        Ok(Self::new(observations))
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Trailing `n` rows, or everything when fewer exist
    pub fn latest(&self, n: usize) -> &[Observation] {
        &self.observations[self.observations.len().saturating_sub(n)..]
    }

    pub fn historical(&self, query: &HistoricalQuery) -> Vec<HistoricalPoint> {
        query.run(&self.observations)
    }
}
