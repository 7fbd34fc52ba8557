use thiserror::Error;

/// Failure kinds raised while building, scaling or rolling a forecast window.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("insufficient history: need {required} observations, have {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("feature shape mismatch: scaler fitted on {expected} features, got {found}")]
    FeatureShapeMismatch { expected: usize, found: usize },

    #[error("model inference failed at step {step}: {source}")]
    ModelInferenceFailed {
        step: usize,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("forecast cancelled before step {step}")]
    Cancelled { step: usize },

    #[error("step must be at least one minute, got {step_minutes}")]
    InvalidStep { step_minutes: i64 },

    #[error("timestamp for step {step} is out of range")]
    TimestampOverflow { step: usize },
}

/// Error surfaced to callers of a forecast. The whole horizon is unavailable.
#[derive(Debug, Error)]
#[error("forecast failed: {0}")]
pub struct ForecastFailed(#[from] pub ForecastError);

impl ForecastFailed {
    pub fn cause(&self) -> &ForecastError {
        &self.0
    }

    pub fn into_cause(self) -> ForecastError {
        self.0
    }
}
