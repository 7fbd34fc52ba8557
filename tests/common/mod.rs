#![allow(dead_code)]
//! Shared fixtures for integration tests

use chrono::{Duration, NaiveDate, NaiveDateTime};
use solar_sync::domain::{calendar_features, Observation};
use solar_sync::ml::{StandardScaler, TargetScaler};

pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 6, 17)
        .unwrap()
        .and_hms_opt(6, 0, 0)
        .unwrap()
}

/// Quarter-hourly rows whose DC output follows `power(i)`
pub fn history_with(n: usize, power: impl Fn(usize) -> f64) -> Vec<Observation> {
    let dc: Vec<f64> = (0..n + 2).map(&power).collect();
    (0..n)
        .map(|i| {
            let timestamp = start() + Duration::minutes(15 * i as i64);
            let (hour, day, weekday) = calendar_features(&timestamp);
            let k = i + 2;
            Observation {
                timestamp,
                plant_id: "4135001".to_string(),
                source_key: "bvBOhCH3iADSZry".to_string(),
                ac_power: dc[k] * 0.1,
                dc_power: dc[k],
                ambient_temperature: 24.0 + i as f64 * 0.05,
                module_temperature: 28.0 + i as f64 * 0.1,
                irradiation: 0.01 * i as f64,
                hour,
                day,
                weekday,
                dc_power_lag1: dc[k - 1],
                dc_power_roll_mean3: (dc[k - 2] + dc[k - 1] + dc[k]) / 3.0,
            }
        })
        .collect()
}

pub fn constant_history(n: usize, dc_power: f64) -> Vec<Observation> {
    history_with(n, |_| dc_power)
}

pub fn identity_scaler() -> StandardScaler {
    StandardScaler::new(vec![0.0; 8], vec![1.0; 8]).unwrap()
}

pub fn target(mean: f64, scale: f64) -> TargetScaler {
    TargetScaler::new(mean, scale).unwrap()
}
