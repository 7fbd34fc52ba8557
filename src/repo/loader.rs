//! CSV ingestion of plant generation and weather sensor exports.

use chrono::NaiveDateTime;
use itertools::Itertools;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::{calendar_features, Observation};
use crate::forecast::features::{lag_feature, rolling_mean, ROLL_WINDOW};

pub const GENERATION_TIME_FORMAT: &str = "%d-%m-%Y %H:%M";
pub const WEATHER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {table} CSV: {source}")]
    Csv {
        table: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("{table} row {row}: cannot parse DATE_TIME {value:?}")]
    Timestamp {
        table: &'static str,
        row: usize,
        value: String,
    },

    #[error("generation and weather data share no (DATE_TIME, PLANT_ID) pairs")]
    EmptyMerge,
}

#[derive(Debug, Deserialize)]
struct GenerationRecord {
    #[serde(rename = "DATE_TIME")]
    date_time: String,
    #[serde(rename = "PLANT_ID")]
    plant_id: String,
    #[serde(rename = "SOURCE_KEY")]
    source_key: String,
    #[serde(rename = "DC_POWER")]
    dc_power: f64,
    #[serde(rename = "AC_POWER")]
    ac_power: f64,
}

#[derive(Debug, Deserialize)]
struct WeatherRecord {
    #[serde(rename = "DATE_TIME")]
    date_time: String,
    #[serde(rename = "PLANT_ID")]
    plant_id: String,
    #[serde(rename = "AMBIENT_TEMPERATURE")]
    ambient_temperature: f64,
    #[serde(rename = "MODULE_TEMPERATURE")]
    module_temperature: f64,
    #[serde(rename = "IRRADIATION")]
    irradiation: f64,
}

fn open(path: &Path) -> Result<BufReader<File>, LoadError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn parse_time(
    table: &'static str,
    row: usize,
    value: &str,
    format: &str,
) -> Result<NaiveDateTime, LoadError> {
    NaiveDateTime::parse_from_str(value.trim(), format).map_err(|_| LoadError::Timestamp {
        table,
        row,
        value: value.to_string(),
    })
}

fn read_records<R: Read, T: serde::de::DeserializeOwned>(
    table: &'static str,
    reader: R,
) -> Result<Vec<T>, LoadError> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .map_err(|source| LoadError::Csv { table, source })
}

pub fn load_files(generation: &Path, weather: &Path) -> Result<Vec<Observation>, LoadError> {
    info!(
        generation = %generation.display(),
        weather = %weather.display(),
        "loading plant history"
    );
    from_readers(open(generation)?, open(weather)?)
}

/// Join generation and weather rows on `(DATE_TIME, PLANT_ID)` and derive the
/// model features.
///
/// The first two rows of the sorted table lack rolling-mean history and are
/// dropped.
pub fn from_readers<G: Read, W: Read>(
    generation: G,
    weather: W,
) -> Result<Vec<Observation>, LoadError> {
    let generation: Vec<GenerationRecord> = read_records("generation", generation)?;
    let weather: Vec<WeatherRecord> = read_records("weather", weather)?;
    debug!(generation = generation.len(), weather = weather.len(), "CSV rows read");

    let mut sensors: HashMap<(NaiveDateTime, String), WeatherRecord> =
        HashMap::with_capacity(weather.len());
    for (i, rec) in weather.into_iter().enumerate() {
        let ts = parse_time("weather", i + 1, &rec.date_time, WEATHER_TIME_FORMAT)?;
        // one sensor row per plant and timestamp; duplicates keep the first
        sensors.entry((ts, rec.plant_id.clone())).or_insert(rec);
    }

    let mut joined = Vec::with_capacity(generation.len());
    for (i, rec) in generation.into_iter().enumerate() {
        let ts = parse_time("generation", i + 1, &rec.date_time, GENERATION_TIME_FORMAT)?;
        if let Some(w) = sensors.get(&(ts, rec.plant_id.clone())) {
            joined.push((ts, rec, w));
        }
    }
    if joined.is_empty() {
        return Err(LoadError::EmptyMerge);
    }

    let joined: Vec<_> = joined.into_iter().sorted_by_key(|(ts, _, _)| *ts).collect();
    let dc: Vec<f64> = joined.iter().map(|(_, g, _)| g.dc_power).collect();
    let lag = lag_feature(&dc, 1);
    let roll = rolling_mean(&dc, ROLL_WINDOW);

    let observations: Vec<Observation> = joined
        .into_iter()
        .zip(lag.into_iter().zip(roll))
        .filter_map(|((ts, g, w), (lag, roll))| {
            let (hour, day, weekday) = calendar_features(&ts);
            Some(Observation {
                timestamp: ts,
                plant_id: g.plant_id,
                source_key: g.source_key,
                ac_power: g.ac_power,
                dc_power: g.dc_power,
                ambient_temperature: w.ambient_temperature,
                module_temperature: w.module_temperature,
                irradiation: w.irradiation,
                hour,
                day,
                weekday,
                dc_power_lag1: lag?,
                dc_power_roll_mean3: roll?,
            })
        })
        .collect();

    info!(rows = observations.len(), "plant history ready");
    Ok(observations)
}
