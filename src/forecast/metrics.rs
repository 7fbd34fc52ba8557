//! Forecast accuracy metrics: MAE, RMSE, MAPE and R².

use serde::{Deserialize, Serialize};
use std::fmt;

/// Accuracy of a predicted series against the observed one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastMetrics {
    /// Mean Absolute Error (kW)
    pub mae: f64,
    /// Root Mean Square Error (kW)
    pub rmse: f64,
    /// Mean Absolute Percentage Error (%), over non-zero actuals only
    pub mape: f64,
    /// R² (coefficient of determination)
    pub r2: f64,
    pub sample_count: usize,
    pub max_error: f64,
    pub min_error: f64,
    /// Standard deviation of signed errors
    pub std_dev: f64,
}

impl ForecastMetrics {
    pub fn calculate(actual: &[f64], predicted: &[f64]) -> Result<Self, MetricsError> {
        if actual.len() != predicted.len() {
            return Err(MetricsError::DimensionMismatch {
                actual: actual.len(),
                predicted: predicted.len(),
            });
        }
        if actual.is_empty() {
            return Err(MetricsError::EmptyData);
        }

        let n = actual.len() as f64;
        let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();

        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let sse: f64 = errors.iter().map(|e| e * e).sum();
        let rmse = (sse / n).sqrt();

        // night-time samples produce zero actuals and are left out
        let percentage: Vec<f64> = actual
            .iter()
            .zip(&errors)
            .filter(|(a, _)| a.abs() > 1e-6)
            .map(|(a, e)| e.abs() / a.abs() * 100.0)
            .collect();
        let mape = if percentage.is_empty() {
            0.0
        } else {
            percentage.iter().sum::<f64>() / percentage.len() as f64
        };

        let mean_actual = actual.iter().sum::<f64>() / n;
        let sst: f64 = actual.iter().map(|a| (a - mean_actual).powi(2)).sum();
        let r2 = if sst > 1e-10 { 1.0 - sse / sst } else { 0.0 };

        let abs = errors.iter().map(|e| e.abs());
        let max_error = abs.clone().fold(0.0f64, f64::max);
        let min_error = abs.fold(f64::INFINITY, f64::min);

        let mean_error = errors.iter().sum::<f64>() / n;
        let std_dev = (errors.iter().map(|e| (e - mean_error).powi(2)).sum::<f64>() / n).sqrt();

        Ok(Self {
            mae,
            rmse,
            mape,
            r2,
            sample_count: actual.len(),
            max_error,
            min_error,
            std_dev,
        })
    }

    /// Band by MAPE
    pub fn quality(&self) -> ForecastQuality {
        match self.mape {
            m if m < 5.0 => ForecastQuality::Excellent,
            m if m < 10.0 => ForecastQuality::Good,
            m if m < 20.0 => ForecastQuality::Fair,
            m if m < 50.0 => ForecastQuality::Poor,
            _ => ForecastQuality::VeryPoor,
        }
    }

    /// Copy with every figure rounded to `decimals` places, for display
    pub fn rounded(&self, decimals: i32) -> Self {
        let r = |v: f64| round_to(v, decimals);
        Self {
            mae: r(self.mae),
            rmse: r(self.rmse),
            mape: r(self.mape),
            r2: r(self.r2),
            sample_count: self.sample_count,
            max_error: r(self.max_error),
            min_error: r(self.min_error),
            std_dev: r(self.std_dev),
        }
    }
}

impl fmt::Display for ForecastMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "MAE={:.2} kW, RMSE={:.2} kW, MAPE={:.2}%, R²={:.3} ({:?})",
            self.mae,
            self.rmse,
            self.mape,
            self.r2,
            self.quality()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForecastQuality {
    Excellent, // MAPE < 5%
    Good,      // MAPE 5-10%
    Fair,      // MAPE 10-20%
    Poor,      // MAPE 20-50%
    VeryPoor,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum MetricsError {
    #[error("Dimension mismatch: actual={actual}, predicted={predicted}")]
    DimensionMismatch { actual: usize, predicted: usize },

    #[error("Empty data provided")]
    EmptyData,
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
