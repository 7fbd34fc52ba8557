//! Sequence model seam and the concrete models shipped with the crate.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::{ArtifactError, ModelMetadata};
use crate::forecast::SequenceWindow;

/// A trained model viewed as a capability: one scaled window in, one scaled
/// target value out.
///
/// Implementations must be safe to share read-only between concurrent
/// forecasts. A call may block for the duration of inference.
#[cfg_attr(test, mockall::automock)]
pub trait Predictor: Send + Sync {
    fn predict(&self, window: &SequenceWindow) -> Result<f64>;
}

/// Adapts a closure into a [`Predictor`]
pub struct FnPredictor<F>(F);

impl<F> FnPredictor<F>
where
    F: Fn(&SequenceWindow) -> Result<f64> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> Predictor for FnPredictor<F>
where
    F: Fn(&SequenceWindow) -> Result<f64> + Send + Sync,
{
    fn predict(&self, window: &SequenceWindow) -> Result<f64> {
        (self.0)(window)
    }
}

/// Linear model over the most recent vector of the window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSequenceModel {
    pub metadata: ModelMetadata,
    pub coefficients: Vec<f64>,
    pub intercept: f64,
}

impl LinearSequenceModel {
    pub fn new(
        coefficients: Vec<f64>,
        intercept: f64,
        metadata: ModelMetadata,
    ) -> Result<Self, ArtifactError> {
        if coefficients.is_empty() {
            return Err(ArtifactError::InvalidModel("no coefficients".to_string()));
        }
        if coefficients.len() != metadata.feature_names.len() {
            return Err(ArtifactError::InvalidModel(format!(
                "{} coefficients for {} feature names",
                coefficients.len(),
                metadata.feature_names.len()
            )));
        }
        Ok(Self {
            metadata,
            coefficients,
            intercept,
        })
    }

    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, ArtifactError> {
        let raw: Self = super::read_json(path.as_ref())?;
        Self::new(raw.coefficients, raw.intercept, raw.metadata)
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

impl Predictor for LinearSequenceModel {
    fn predict(&self, window: &SequenceWindow) -> Result<f64> {
        let last = window
            .last()
            .ok_or_else(|| anyhow::anyhow!("empty input window"))?;

        if last.len() != self.coefficients.len() {
            anyhow::bail!(
                "Feature count mismatch: expected {}, got {}",
                self.coefficients.len(),
                last.len()
            );
        }

        let prediction = last
            .iter()
            .zip(self.coefficients.iter())
            .map(|(f, c)| f * c)
            .sum::<f64>()
            + self.intercept;

        Ok(prediction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::ModelType;

    fn metadata(n: usize) -> ModelMetadata {
        ModelMetadata {
            model_id: "test".to_string(),
            model_type: ModelType::LinearRegression,
            version: "0.1.0".to_string(),
            trained_at: chrono::Utc::now(),
            training_samples: 100,
            validation_metrics: None,
            feature_names: (0..n).map(|i| format!("f{}", i)).collect(),
        }
    }

    #[test]
    fn test_linear_predict_uses_last_vector() {
        let model = LinearSequenceModel::new(vec![2.0, 3.0, 1.0], 5.0, metadata(3)).unwrap();
        let window = SequenceWindow::new(vec![vec![100.0, 100.0, 100.0], vec![1.0, 2.0, 3.0]]);

        // 2*1 + 3*2 + 1*3 + 5 = 16
        assert_eq!(model.predict(&window).unwrap(), 16.0);
    }

    #[test]
    fn test_linear_predict_rejects_width() {
        let model = LinearSequenceModel::new(vec![1.0, 1.0], 0.0, metadata(2)).unwrap();
        let window = SequenceWindow::new(vec![vec![1.0, 2.0, 3.0]]);
        assert!(model.predict(&window).is_err());
        assert!(model.predict(&SequenceWindow::new(vec![])).is_err());
    }

    #[test]
    fn test_linear_new_validates_shape() {
        assert!(LinearSequenceModel::new(vec![], 0.0, metadata(0)).is_err());
        assert!(LinearSequenceModel::new(vec![1.0], 0.0, metadata(2)).is_err());
    }

    #[test]
    fn test_fn_predictor() {
        let model = FnPredictor::new(|w| Ok(w.len() as f64));
        let window = SequenceWindow::new(vec![vec![0.0]; 4]);
        assert_eq!(model.predict(&window).unwrap(), 4.0);
    }
}
