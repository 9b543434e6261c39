//! Evaluation engine
//!
//! Scores a stored model against held-out observations with known actuals.
//! Read-only with respect to the registry.

use std::sync::Arc;

use serde::Serialize;

use crate::dataset::{Observation, Series};
use crate::error::{ForesightError, Result};
use crate::registry::ModelRegistry;

/// Forecast accuracy over a holdout set
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    pub mae: f64,
    pub rmse: f64,
}

pub struct EvaluationEngine {
    registry: Arc<ModelRegistry>,
}

impl EvaluationEngine {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Predict each holdout timestamp with the stored model and score the
    /// predictions against the actuals.
    pub fn evaluate(&self, name: &str, observations: &[Observation]) -> Result<EvalReport> {
        let series = Series::from_observations(observations)?;

        let record = self.registry.get(name)?;
        let model = record.artifact.open()?;

        let n = series.len() as f64;
        let mut abs_sum = 0.0;
        let mut sq_sum = 0.0;
        for (date, actual) in series.dates.iter().zip(&series.values) {
            let diff = model.predict(*date).yhat - actual;
            abs_sum += diff.abs();
            sq_sum += diff * diff;
        }

        Ok(EvalReport {
            mae: abs_sum / n,
            rmse: (sq_sum / n).sqrt(),
        })
    }

    /// Same default-model rule as the forecast engine: latest trained wins
    pub fn resolve_model_name(&self, requested: Option<&str>) -> Result<String> {
        match requested {
            Some(name) => Ok(name.to_string()),
            None => self.registry.latest_model_name()?.ok_or_else(|| {
                ForesightError::Validation(
                    "no model available: train a model first".to_string(),
                )
            }),
        }
    }
}
