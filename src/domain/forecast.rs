use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::serialize_timestamp;

/// One step of an autoregressive forecast.
///
/// `actual` is only known for the first step, which coincides with the last
/// real observation; every later step has no ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionPoint {
    #[serde(rename = "date_time", with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    /// Physical value (kW)
    pub predicted: f64,
    pub actual: Option<f64>,
}

/// One row of the historical query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    #[serde(with = "serialize_timestamp")]
    pub date_time: NaiveDateTime,
    pub actual: f64,
    pub plant_id: String,
}

/// One row of the demo forecast shown by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockForecastPoint {
    #[serde(with = "serialize_timestamp")]
    pub date_time: NaiveDateTime,
    pub actual: f64,
    pub predicted: f64,
    pub historical: f64,
    /// Smoothed absolute prediction error
    pub error: f64,
}
