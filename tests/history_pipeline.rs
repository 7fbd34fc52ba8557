//! CSV exports through to served forecasts, using on-disk artifacts

use chrono::Utc;
use solar_sync::config::{ArtifactsConfig, Config, DataConfig};
use solar_sync::domain::PowerType;
use solar_sync::forecast::features::FEATURE_COLUMNS;
use solar_sync::ml::{fit_scalers, save_scalers, LinearSequenceModel, ModelMetadata, ModelType};
use solar_sync::repo::{HistoricalQuery, HistoryRepository};
use solar_sync::service::AppState;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;

struct Workspace(PathBuf);

impl Workspace {
    fn new(name: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("solar-sync-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        Self(dir)
    }

    fn path(&self, file: &str) -> PathBuf {
        self.0.join(file)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.0);
    }
}

/// 72 quarter-hours of two inverters with a morning ramp
fn write_exports(ws: &Workspace) -> DataConfig {
    let mut generation = String::from(
        "DATE_TIME,PLANT_ID,SOURCE_KEY,DC_POWER,AC_POWER,DAILY_YIELD,TOTAL_YIELD\n",
    );
    let mut weather = String::from(
        "DATE_TIME,PLANT_ID,SOURCE_KEY,AMBIENT_TEMPERATURE,MODULE_TEMPERATURE,IRRADIATION\n",
    );
    for q in 0..72 {
        let (h, m) = (q / 4, (q % 4) * 15);
        let dc = if h < 6 { 0.0 } else { (q - 24) as f64 * 40.0 };
        for inv in ["inv-a", "inv-b"] {
            let ac = dc * 0.1;
            writeln!(generation, "16-05-2020 {h:02}:{m:02},4135001,{inv},{dc},{ac},0,0").unwrap();
        }
        writeln!(
            weather,
            "2020-05-16 {h:02}:{m:02}:00,4135001,sensor,{},{},{}",
            22.0 + q as f64 * 0.1,
            20.0 + q as f64 * 0.3,
            if h < 6 { 0.0 } else { 0.02 * (q - 24) as f64 }
        )
        .unwrap();
    }

    let cfg = DataConfig {
        generation_csv: ws.path("gen.csv"),
        weather_csv: ws.path("weather.csv"),
    };
    std::fs::write(&cfg.generation_csv, generation).unwrap();
    std::fs::write(&cfg.weather_csv, weather).unwrap();
    cfg
}

fn write_model(path: &Path) {
    let metadata = ModelMetadata {
        model_id: "solar_linear".to_string(),
        model_type: ModelType::LinearRegression,
        version: "1.0.0".to_string(),
        trained_at: Utc::now(),
        training_samples: 142,
        validation_metrics: None,
        feature_names: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
    };
    let mut coefficients = vec![0.0; FEATURE_COLUMNS.len()];
    coefficients[6] = 0.9;
    let model = LinearSequenceModel::new(coefficients, 0.05, metadata).unwrap();
    std::fs::write(path, serde_json::to_string(&model).unwrap()).unwrap();
}

fn config(ws: &Workspace) -> Config {
    Config {
        data: write_exports(ws),
        artifacts: ArtifactsConfig {
            model_path: ws.path("model.json"),
            scaler_path: ws.path("assets/scaler.json"),
            target_scaler_path: ws.path("assets/target_scaler.json"),
        },
        ..Config::default()
    }
}

#[test]
fn historical_query_over_exports() {
    let ws = Workspace::new("historical");
    let state = AppState::new(config(&ws)).unwrap();

    // 144 joined rows minus the two without rolling history
    assert_eq!(state.history.len(), 142);

    let query = HistoricalQuery {
        power_type: PowerType::AcPower,
        inverter: Some("inv-b".to_string()),
        limit: 5,
    };
    let points = state.historical(&query);
    assert_eq!(points.len(), 5);
    assert_eq!(points[4].date_time.to_string(), "2020-05-16 17:45:00");
    assert!((points[4].actual - 188.0).abs() < 1e-9);
    assert_eq!(points[4].plant_id, "4135001");
}

#[tokio::test]
async fn fitted_scalers_and_linear_model_serve_forecast() {
    let ws = Workspace::new("forecast");
    let cfg = config(&ws);

    let history = HistoryRepository::load(&cfg.data).unwrap();
    let (scaler, target_scaler) = fit_scalers(history.observations()).unwrap();
    save_scalers(&cfg.artifacts, &scaler, &target_scaler).unwrap();
    write_model(&cfg.artifacts.model_path);

    let state = AppState::with_history(cfg, history);
    let first = state.predict_next_24_hours(CancellationToken::new()).await.unwrap();
    let second = state.predict_next_24_hours(CancellationToken::new()).await.unwrap();

    assert_eq!(first.len(), 24);
    assert_eq!(first, second);
    assert_eq!(serde_json::to_value(&first[0]).unwrap()["date_time"], "2020-05-16T18:00:00");
    assert!(first.iter().all(|p| p.predicted.is_finite()));
}

#[tokio::test]
async fn missing_model_file_is_reported() {
    let ws = Workspace::new("missing");
    let state = AppState::new(config(&ws)).unwrap();

    let err = state
        .predict_next_24_hours(CancellationToken::new())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("model.json"));
}
