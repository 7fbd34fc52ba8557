use anyhow::{Context, Result};
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use validator::Validate;

use crate::forecast::ForecastParams;

pub const CONFIG_FILE: &str = "config/default.toml";
pub const ENV_PREFIX: &str = "SOLAR__";

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    #[serde(default)]
    #[validate(nested)]
    pub forecast: ForecastConfig,
    #[serde(default)]
    #[validate(nested)]
    pub historical: HistoricalConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    pub generation_csv: PathBuf,
    pub weather_csv: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            generation_csv: "data/Plant_1_Generation_Data.csv".into(),
            weather_csv: "data/Plant_1_Weather_Sensor_Data.csv".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub target_scaler_path: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            model_path: "assets/solar_forecasting_model.json".into(),
            scaler_path: "assets/scaler.json".into(),
            target_scaler_path: "assets/target_scaler.json".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ForecastConfig {
    #[validate(range(min = 1, max = 10000))]
    pub lookback: usize,
    #[validate(range(max = 10000))]
    pub horizon: usize,
    #[validate(range(min = 1, max = 1440))]
    pub step_minutes: i64,
    /// Wall-clock budget for one forecast request
    #[validate(range(min = 1))]
    pub deadline_secs: u64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            lookback: 48,
            horizon: 24,
            step_minutes: 15,
            deadline_secs: 30,
        }
    }
}

impl ForecastConfig {
    pub fn params(&self) -> ForecastParams {
        ForecastParams {
            horizon: self.horizon,
            lookback: self.lookback,
            step_minutes: self.step_minutes,
        }
    }

    pub fn deadline(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.deadline_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct HistoricalConfig {
    #[validate(range(min = 1))]
    pub limit: usize,
}

impl Default for HistoricalConfig {
    fn default() -> Self {
        Self { limit: 1000 }
    }
}

impl Config {
    /// Defaults, then `config/default.toml`, then `SOLAR__SECTION__KEY`
    /// environment overrides.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_figment(
            Figment::from(Serialized::defaults(Config::default()))
                .merge(Toml::file(CONFIG_FILE))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let cfg: Config = figment.extract().context("invalid configuration")?;
        cfg.validate().context("configuration out of range")?;
        Ok(cfg)
    }
}
