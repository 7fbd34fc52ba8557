//! Deterministic synthetic forecast for demos and UI development.
//!
//! Generated from a fixed seed so every call in every process returns the
//! same series. Built lazily on first use.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use once_cell::sync::OnceCell;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, StandardNormal};
use serde::Serialize;
use std::f64::consts::PI;
use tracing::debug;

use super::metrics::{round_to, ForecastMetrics, MetricsError};
use crate::domain::MockForecastPoint;

pub const MOCK_SEED: u64 = 42;
pub const MOCK_POINTS: usize = 23;
pub const MOCK_MIN_KW: f64 = 350.0;
pub const MOCK_MAX_KW: f64 = 700.0;

const START_HOUR: usize = 18;
const SMOOTHING_WIDTH: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct MockForecast {
    pub forecast: Vec<MockForecastPoint>,
    /// Rounded to 4 decimals. `mape` is a percentage (2.15 means 2.15%),
    /// not the 0.0215-style fraction older dashboards expect.
    pub metrics: ForecastMetrics,
}

static MOCK: OnceCell<MockForecast> = OnceCell::new();

/// Cached mock forecast, generated on first call
pub fn mock_forecast() -> Result<MockForecast, MetricsError> {
    MOCK.get_or_try_init(|| generate(MOCK_SEED)).cloned()
}

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 4, 24)
        .and_then(|d| d.and_hms_opt(START_HOUR as u32, 0, 0))
        .unwrap_or_default()
}

/// Daily bell between 350 and 700 kW peaking at noon
fn diurnal_base(hour: usize) -> f64 {
    525.0 + 175.0 * (2.0 * PI * (hour as f64 - 6.0) / 24.0).sin()
}

fn clip(v: f64) -> f64 {
    v.clamp(MOCK_MIN_KW, MOCK_MAX_KW)
}

/// Centred moving average over a zero-padded signal, same length as input
fn smooth(values: &[f64], width: usize) -> Vec<f64> {
    if width == 0 {
        return values.to_vec();
    }
    let half = (width - 1) / 2;
    (0..values.len())
        .map(|i| {
            let lo = i.saturating_sub(half);
            let hi = (i + width - half).min(values.len());
            // samples past either edge count as zero
            values[lo..hi].iter().sum::<f64>() / width as f64
        })
        .collect()
}

fn noise(rng: &mut StdRng) -> f64 {
    StandardNormal.sample(rng)
}

fn finish(values: &[f64]) -> Vec<f64> {
    smooth(values, SMOOTHING_WIDTH)
        .into_iter()
        .map(|v| round_to(clip(v), 2))
        .collect()
}

pub fn generate(seed: u64) -> Result<MockForecast, MetricsError> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut actual = Vec::with_capacity(MOCK_POINTS);
    let mut predicted = Vec::with_capacity(MOCK_POINTS);
    let mut historical = Vec::with_capacity(MOCK_POINTS);
    for i in 0..MOCK_POINTS {
        let base = diurnal_base((i + START_HOUR) % 24);
        let a = clip(base + 20.0 * noise(&mut rng));
        let p = clip(a + 20.0 * noise(&mut rng));
        let h = clip(base + 30.0 * noise(&mut rng));
        actual.push(a);
        predicted.push(p);
        historical.push(h);
    }

    let actual = finish(&actual);
    let predicted = finish(&predicted);
    let historical = finish(&historical);
    let abs_error: Vec<f64> = actual
        .iter()
        .zip(&predicted)
        .map(|(a, p)| (p - a).abs())
        .collect();
    let error: Vec<f64> = smooth(&abs_error, SMOOTHING_WIDTH)
        .into_iter()
        .map(|e| round_to(e, 2))
        .collect();

    let metrics = ForecastMetrics::calculate(&actual, &predicted)?.rounded(4);

    let start = start_time();
    let forecast = (0..MOCK_POINTS)
        .map(|i| MockForecastPoint {
            date_time: start + Duration::hours(i as i64),
            actual: actual[i],
            predicted: predicted[i],
            historical: historical[i],
            error: error[i],
        })
        .collect();

    debug!(seed, points = MOCK_POINTS, %metrics, "mock forecast generated");
    Ok(MockForecast { forecast, metrics })
}
