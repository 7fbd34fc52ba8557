use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use solar_sync::config::Config;
use solar_sync::domain::PowerType;
use solar_sync::ml::{fit_scalers, save_scalers};
use solar_sync::repo::{HistoricalQuery, HistoryRepository};
use solar_sync::service::AppState;
use solar_sync::telemetry::{cancel_on_shutdown, init_tracing};
use tokio_util::sync::CancellationToken;
use tracing::info;
use validator::Validate;

#[derive(Parser)]
#[command(name = "solar-sync")]
#[command(about = "Solar generation history and DC power forecasting", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Forecast DC power over the configured horizon from the latest history
    Forecast {
        /// Override the configured number of steps
        #[arg(long)]
        horizon: Option<usize>,
    },

    /// Print stored generation readings
    Historical {
        /// AC_POWER or DC_POWER
        #[arg(long, default_value = "DC_POWER")]
        power_type: PowerType,

        /// Plant id or inverter key, or "all"
        #[arg(long, default_value = "all")]
        inverter: String,

        /// Most recent rows to return (defaults to `historical.limit`)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Print the deterministic demo forecast with its metrics
    Mock,

    /// Fit input and target scalers on the loaded history and save them
    FitScalers,
}

#[derive(Serialize)]
struct ForecastOutput<T: Serialize> {
    forecast: T,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut cfg = Config::load()?;

    match cli.command {
        Commands::Mock => {
            let mock = solar_sync::forecast::mock_forecast()?;
            print_json(&mock)?;
        }

        Commands::Historical {
            power_type,
            inverter,
            limit,
        } => {
            let state = AppState::new(cfg.clone())?;
            let query = HistoricalQuery {
                power_type,
                inverter: Some(inverter),
                limit: limit.unwrap_or(cfg.historical.limit),
            };
            print_json(&state.historical(&query))?;
        }

        Commands::Forecast { horizon } => {
            if let Some(h) = horizon {
                cfg.forecast.horizon = h;
                cfg.validate().context("invalid --horizon")?;
            }
            let state = AppState::new(cfg)?;
            let cancel = CancellationToken::new();
            cancel_on_shutdown(cancel.clone());

            let points = state
                .predict_next_24_hours(cancel)
                .await
                .context("forecast unavailable")?;
            print_json(&ForecastOutput { forecast: points })?;
        }

        Commands::FitScalers => {
            let history = HistoryRepository::load(&cfg.data)?;
            let (scaler, target_scaler) = fit_scalers(history.observations())?;
            save_scalers(&cfg.artifacts, &scaler, &target_scaler)?;
            print_json(&serde_json::json!({
                "rows": history.len(),
                "scaler": cfg.artifacts.scaler_path,
                "target_scaler": cfg.artifacts.target_scaler_path,
            }))?;
        }
    }

    info!("done");
    Ok(())
}
