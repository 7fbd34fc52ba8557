//! Feature engineering for the sequence model
//!
//! Turns observations into the fixed-width vectors the scaler and model were
//! fitted on, and computes the lag / rolling-mean history features.

use crate::domain::Observation;

/// Column order the scaler and model were fitted on
pub const FEATURE_COLUMNS: [&str; FEATURE_COUNT] = [
    "hour",
    "day",
    "weekday",
    "AMBIENT_TEMPERATURE",
    "MODULE_TEMPERATURE",
    "IRRADIATION",
    "DC_POWER_LAG1",
    "DC_POWER_ROLL_MEAN3",
];

pub const FEATURE_COUNT: usize = 8;

/// Position of `DC_POWER_LAG1`, the slot fed back during rollout
pub const LAG1_INDEX: usize = 6;

/// Position of `DC_POWER_ROLL_MEAN3`
pub const ROLL_MEAN3_INDEX: usize = 7;

/// Rows averaged by the rolling-mean feature
pub const ROLL_WINDOW: usize = 3;

/// Feature vector of one observation, in [`FEATURE_COLUMNS`] order
pub fn feature_vector(obs: &Observation) -> Vec<f64> {
    vec![
        obs.hour as f64,
        obs.day as f64,
        obs.weekday as f64,
        obs.ambient_temperature,
        obs.module_temperature,
        obs.irradiation,
        obs.dc_power_lag1,
        obs.dc_power_roll_mean3,
    ]
}

/// Previous value for every position; `None` where no history exists
pub fn lag_feature(values: &[f64], lag: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| i.checked_sub(lag).map(|j| values[j]))
        .collect()
}

/// Trailing mean over `window` values ending at each position
pub fn rolling_mean(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 < window {
                None
            } else {
                let slice = &values[i + 1 - window..=i];
                Some(slice.iter().sum::<f64>() / window as f64)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_lag_feature() {
        let values = vec![1.0, 2.0, 3.0, 4.0];
        assert_eq!(
            lag_feature(&values, 1),
            vec![None, Some(1.0), Some(2.0), Some(3.0)]
        );
        assert_eq!(lag_feature(&values, 4), vec![None; 4]);
    }

    #[test]
    fn test_rolling_mean() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let means = rolling_mean(&values, 3);

        assert_eq!(means.len(), 5);
        assert_eq!(means[0], None);
        assert_eq!(means[1], None);
        assert_eq!(means[2], Some(2.0)); // Mean of [1.0, 2.0, 3.0]
        assert_eq!(means[4], Some(4.0));
    }

    #[test]
    fn test_rolling_mean_zero_window() {
        assert_eq!(rolling_mean(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn test_feature_vector_order() {
        let obs = Observation {
            timestamp: NaiveDate::from_ymd_opt(2020, 5, 15)
                .unwrap()
                .and_hms_opt(6, 15, 0)
                .unwrap(),
            plant_id: "4135001".to_string(),
            source_key: "1BY6WEcLGh8j5v7".to_string(),
            ac_power: 10.0,
            dc_power: 100.0,
            ambient_temperature: 25.1,
            module_temperature: 22.8,
            irradiation: 0.01,
            hour: 6,
            day: 15,
            weekday: 4,
            dc_power_lag1: 90.0,
            dc_power_roll_mean3: 95.0,
        };

        let v = feature_vector(&obs);
        assert_eq!(v.len(), FEATURE_COUNT);
        assert_eq!(v, vec![6.0, 15.0, 4.0, 25.1, 22.8, 0.01, 90.0, 95.0]);
        assert_eq!(v[LAG1_INDEX], obs.dc_power_lag1);
        assert_eq!(v[ROLL_MEAN3_INDEX], obs.dc_power_roll_mean3);
        assert_eq!(FEATURE_COLUMNS[LAG1_INDEX], "DC_POWER_LAG1");
    }
}
