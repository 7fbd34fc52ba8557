use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which inverter output a historical query reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString)]
pub enum PowerType {
    #[serde(rename = "AC_POWER")]
    #[strum(to_string = "AC_POWER", serialize = "ac_power", serialize = "ac")]
    AcPower,
    #[default]
    #[serde(rename = "DC_POWER")]
    #[strum(to_string = "DC_POWER", serialize = "dc_power", serialize = "dc")]
    DcPower,
}

/// One merged generation + weather sample with its derived features.
///
/// Rows are only ever constructed once lag and rolling-mean history exists,
/// so every derived field is defined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: NaiveDateTime,
    pub plant_id: String,
    /// Inverter identifier
    pub source_key: String,
    pub ac_power: f64,
    pub dc_power: f64,
    pub ambient_temperature: f64,
    pub module_temperature: f64,
    pub irradiation: f64,
    /// Hour of day (0-23)
    pub hour: u32,
    /// Day of month (1-31)
    pub day: u32,
    /// Day of week (0=Monday, 6=Sunday)
    pub weekday: u32,
    /// Previous row's `dc_power`
    pub dc_power_lag1: f64,
    /// Mean `dc_power` over this row and the two before it
    pub dc_power_roll_mean3: f64,
}

impl Observation {
    pub fn power(&self, power_type: PowerType) -> f64 {
        match power_type {
            PowerType::AcPower => self.ac_power,
            PowerType::DcPower => self.dc_power,
        }
    }

    /// Matches an inverter selector against plant id or inverter key
    pub fn belongs_to(&self, inverter: &str) -> bool {
        self.plant_id == inverter || self.source_key == inverter
    }
}

/// Calendar features of a timestamp as `(hour, day, weekday)`
pub fn calendar_features(timestamp: &NaiveDateTime) -> (u32, u32, u32) {
    (
        timestamp.hour(),
        timestamp.day(),
        timestamp.weekday().num_days_from_monday(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::str::FromStr;

    #[test]
    fn test_power_type_parse_and_display() {
        assert_eq!(PowerType::from_str("AC_POWER").unwrap(), PowerType::AcPower);
        assert_eq!(PowerType::from_str("dc").unwrap(), PowerType::DcPower);
        assert!(PowerType::from_str("REACTIVE").is_err());
        assert_eq!(PowerType::DcPower.to_string(), "DC_POWER");
        assert_eq!(PowerType::AcPower.to_string(), "AC_POWER");
    }

    #[test]
    fn test_calendar_features() {
        // 2020-05-15 was a Friday
        let ts = NaiveDate::from_ymd_opt(2020, 5, 15)
            .unwrap()
            .and_hms_opt(13, 45, 0)
            .unwrap();
        assert_eq!(calendar_features(&ts), (13, 15, 4));
    }
}
