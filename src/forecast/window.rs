//! Sequence window fed to the model.
//!
//! Windows are immutable: every rollout step produces a new window via
//! [`SequenceWindow::slide`] instead of shifting rows in place.

use serde::{Deserialize, Serialize};

use super::features::{feature_vector, LAG1_INDEX};
use crate::domain::Observation;
use crate::error::ForecastError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceWindow {
    rows: Vec<Vec<f64>>,
}

impl SequenceWindow {
    pub fn new(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent feature vector
    pub fn last(&self) -> Option<&[f64]> {
        self.rows.last().map(Vec::as_slice)
    }

    /// Drop the oldest vector and append `next`, keeping the length fixed.
    /// An empty window stays empty.
    pub fn slide(&self, next: Vec<f64>) -> Self {
        if self.rows.is_empty() {
            return self.clone();
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        rows.extend(self.rows[1..].iter().cloned());
        rows.push(next);
        Self { rows }
    }

    /// Synthetic next vector: a copy of the last vector with its lag slot set
    /// to `lag1`.
    ///
    /// Only the lag slot moves. The rolling-mean slot is carried over from the
    /// last real row unchanged.
    pub fn feedback_vector(&self, lag1: f64) -> Option<Vec<f64>> {
        let mut next = self.rows.last()?.clone();
        if let Some(slot) = next.get_mut(LAG1_INDEX) {
            *slot = lag1;
        }
        Some(next)
    }
}

/// Feature window over the last `length` observations, oldest first.
pub fn build_window(rows: &[Observation], length: usize) -> Result<SequenceWindow, ForecastError> {
    if rows.len() < length {
        return Err(ForecastError::InsufficientHistory {
            required: length,
            available: rows.len(),
        });
    }

    let vectors = rows[rows.len() - length..]
        .iter()
        .map(feature_vector)
        .collect();
    Ok(SequenceWindow::new(vectors))
}
