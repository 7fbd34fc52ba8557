pub mod autoregressive;
pub mod features;
pub mod metrics;
pub mod mock;
pub mod window;

pub use autoregressive::*;
pub use metrics::{ForecastMetrics, ForecastQuality, MetricsError};
pub use mock::{mock_forecast, MockForecast};
pub use window::*;
