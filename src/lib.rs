//! SolarSync: solar plant generation history and autoregressive DC power
//! forecasting.

pub mod config;
pub mod domain;
pub mod error;
pub mod forecast;
pub mod ml;
pub mod repo;
pub mod service;
pub mod telemetry;
