//! Autoregressive multi-step forecasting.
//!
//! Each step's scaled prediction is fed back into the window as the next
//! step's lag feature, so errors compound across the horizon.

use chrono::{Duration, NaiveDateTime};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::window::build_window;
use crate::domain::{Observation, PredictionPoint};
use crate::error::{ForecastError, ForecastFailed};
use crate::ml::{Predictor, StandardScaler, TargetScaler};

/// Rollout shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastParams {
    /// Steps to predict
    pub horizon: usize,
    /// Trailing observations used as model context
    pub lookback: usize,
    /// Cadence of synthesized timestamps
    pub step_minutes: i64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            horizon: 24,
            lookback: 48,
            step_minutes: 15,
        }
    }
}

pub struct AutoregressiveForecaster<'a> {
    model: &'a dyn Predictor,
    scaler: &'a StandardScaler,
    target_scaler: &'a TargetScaler,
    params: ForecastParams,
    cancel: Option<CancellationToken>,
}

impl<'a> AutoregressiveForecaster<'a> {
    pub fn new(
        model: &'a dyn Predictor,
        scaler: &'a StandardScaler,
        target_scaler: &'a TargetScaler,
        params: ForecastParams,
    ) -> Self {
        Self {
            model,
            scaler,
            target_scaler,
            params,
            cancel: None,
        }
    }

    /// Checked before every step; a model call already running is not
    /// interrupted.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn params(&self) -> ForecastParams {
        self.params
    }

    /// Predict `horizon` points following the last observation of `history`.
    ///
    /// Any failure discards the steps computed so far.
    pub fn forecast(
        &self,
        history: &[Observation],
    ) -> Result<Vec<PredictionPoint>, ForecastFailed> {
        let ForecastParams {
            horizon,
            lookback,
            step_minutes,
        } = self.params;
        if step_minutes < 1 {
            return Err(ForecastError::InvalidStep { step_minutes }.into());
        }

        let window = build_window(history, lookback)?;
        let last = history.last().ok_or(ForecastError::InsufficientHistory {
            required: lookback.max(1),
            available: 0,
        })?;
        let mut window = self.scaler.scale_features(&window)?;

        info!(
            rows = history.len(),
            lookback,
            horizon,
            last_observed = %last.timestamp,
            "starting autoregressive forecast"
        );

        let mut points = Vec::with_capacity(horizon);
        for step in 0..horizon {
            if self.cancel.as_ref().is_some_and(CancellationToken::is_cancelled) {
                return Err(ForecastError::Cancelled { step }.into());
            }

            let scaled = self
                .model
                .predict(&window)
                .map_err(|e| ForecastError::ModelInferenceFailed {
                    step,
                    source: e.into(),
                })?;
            if !scaled.is_finite() {
                return Err(ForecastError::ModelInferenceFailed {
                    step,
                    source: format!("non-finite model output {}", scaled).into(),
                }
                .into());
            }

            let predicted = self.target_scaler.unscale_target(scaled);
            let timestamp = step_timestamp(last.timestamp, step_minutes, step)?;
            debug!(step = step + 1, horizon, scaled, predicted, %timestamp, "forecast step");

            points.push(PredictionPoint {
                timestamp,
                predicted,
                actual: (step == 0).then_some(last.dc_power),
            });

            if let Some(next) = window.feedback_vector(scaled) {
                window = window.slide(next);
            }
        }

        info!(points = points.len(), "forecast complete");
        Ok(points)
    }
}

/// `last + step_minutes * (step + 1)`, or an error when it leaves chrono's range
fn step_timestamp(
    last: NaiveDateTime,
    step_minutes: i64,
    step: usize,
) -> Result<NaiveDateTime, ForecastError> {
    i64::try_from(step + 1)
        .ok()
        .and_then(|n| step_minutes.checked_mul(n))
        .and_then(Duration::try_minutes)
        .and_then(|offset| last.checked_add_signed(offset))
        .ok_or(ForecastError::TimestampOverflow { step })
}

/// Run one forecast with the given collaborators.
pub fn forecast(
    history: &[Observation],
    model: &dyn Predictor,
    scaler: &StandardScaler,
    target_scaler: &TargetScaler,
    params: ForecastParams,
) -> Result<Vec<PredictionPoint>, ForecastFailed> {
    AutoregressiveForecaster::new(model, scaler, target_scaler, params).forecast(history)
}
