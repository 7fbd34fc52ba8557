//! Standard (z-score) scalers for model inputs and the target.
//!
//! The persisted form mirrors a fitted standard scaler: one `mean` and one
//! `scale` per feature. Scalers are immutable once built.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::ArtifactError;
use crate::error::ForecastError;
use crate::forecast::SequenceWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    mean: Vec<f64>,
    scale: Vec<f64>,
}

impl StandardScaler {
    pub fn new(mean: Vec<f64>, scale: Vec<f64>) -> Result<Self, ArtifactError> {
        let scaler = Self { mean, scale };
        scaler.validate()?;
        Ok(scaler)
    }

    /// Fit per-column mean and population standard deviation.
    /// Constant columns get a scale of 1.
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self, ArtifactError> {
        let first = rows.first().ok_or(ArtifactError::EmptyTrainingData)?;
        let width = first.len();
        if let Some(bad) = rows.iter().find(|r| r.len() != width) {
            return Err(ArtifactError::InvalidScaler(format!(
                "ragged training rows: expected width {}, found {}",
                width,
                bad.len()
            )));
        }

        let n = rows.len() as f64;
        let mean: Vec<f64> = (0..width)
            .map(|j| rows.iter().map(|r| r[j]).sum::<f64>() / n)
            .collect();
        let scale = (0..width)
            .map(|j| {
                let var = rows.iter().map(|r| (r[j] - mean[j]).powi(2)).sum::<f64>() / n;
                let std = var.sqrt();
                if std < 1e-12 {
                    1.0
                } else {
                    std
                }
            })
            .collect();

        Self::new(mean, scale)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let scaler: Self = super::read_json(path)?;
        scaler.validate()?;
        Ok(scaler)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        super::write_json(path.as_ref(), self)
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn scale(&self) -> &[f64] {
        &self.scale
    }

    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, ForecastError> {
        self.check_width(features.len())?;
        Ok(features
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    pub fn inverse_transform(&self, scaled: &[f64]) -> Result<Vec<f64>, ForecastError> {
        self.check_width(scaled.len())?;
        Ok(scaled
            .iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(z, (m, s))| z * s + m)
            .collect())
    }

    /// Scale every vector of a window column-wise
    pub fn scale_features(&self, window: &SequenceWindow) -> Result<SequenceWindow, ForecastError> {
        let rows = window
            .rows()
            .iter()
            .map(|row| self.transform(row))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SequenceWindow::new(rows))
    }

    fn check_width(&self, found: usize) -> Result<(), ForecastError> {
        if found != self.n_features() {
            return Err(ForecastError::FeatureShapeMismatch {
                expected: self.n_features(),
                found,
            });
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ArtifactError> {
        if self.mean.len() != self.scale.len() {
            return Err(ArtifactError::InvalidScaler(format!(
                "{} means but {} scales",
                self.mean.len(),
                self.scale.len()
            )));
        }
        if self.mean.is_empty() {
            return Err(ArtifactError::InvalidScaler("no features".to_string()));
        }
        if let Some(s) = self.scale.iter().find(|s| !s.is_finite() || **s == 0.0) {
            return Err(ArtifactError::InvalidScaler(format!(
                "scale must be finite and non-zero, got {}",
                s
            )));
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            return Err(ArtifactError::InvalidScaler("non-finite mean".to_string()));
        }
        Ok(())
    }
}

/// Single-column scaler for the model target (kW)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "StandardScaler", into = "StandardScaler")]
pub struct TargetScaler {
    mean: f64,
    scale: f64,
}

impl TargetScaler {
    pub fn new(mean: f64, scale: f64) -> Result<Self, ArtifactError> {
        StandardScaler::new(vec![mean], vec![scale])?;
        Ok(Self { mean, scale })
    }

    pub fn fit(values: &[f64]) -> Result<Self, ArtifactError> {
        let rows: Vec<Vec<f64>> = values.iter().map(|v| vec![*v]).collect();
        StandardScaler::fit(&rows)?.try_into()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        StandardScaler::load(path)?.try_into()
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        StandardScaler::from(self.clone()).save(path)
    }

    pub fn scale_target(&self, physical: f64) -> f64 {
        (physical - self.mean) / self.scale
    }

    /// Decode a scaled model output back to kW
    pub fn unscale_target(&self, scaled: f64) -> f64 {
        scaled * self.scale + self.mean
    }
}

impl TryFrom<StandardScaler> for TargetScaler {
    type Error = ArtifactError;

    fn try_from(scaler: StandardScaler) -> Result<Self, Self::Error> {
        scaler.validate()?;
        if scaler.n_features() != 1 {
            return Err(ArtifactError::InvalidScaler(format!(
                "target scaler must have exactly one feature, has {}",
                scaler.n_features()
            )));
        }
        Ok(Self {
            mean: scaler.mean[0],
            scale: scaler.scale[0],
        })
    }
}

impl From<TargetScaler> for StandardScaler {
    fn from(t: TargetScaler) -> Self {
        Self {
            mean: vec![t.mean],
            scale: vec![t.scale],
        }
    }
}
