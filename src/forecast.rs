//! Forecast engine
//!
//! Loads a stored model and produces point/interval forecasts for a
//! requested horizon. Read-only with respect to the registry.

use std::sync::Arc;

use crate::dataset::parse_date;
use crate::error::{ForesightError, Result};
use crate::model::ForecastPoint;
use crate::registry::ModelRegistry;

pub struct ForecastEngine {
    registry: Arc<ModelRegistry>,
}

impl ForecastEngine {
    pub fn new(registry: Arc<ModelRegistry>) -> Self {
        Self { registry }
    }

    /// Forecast every timestamp in `horizon`, preserving input order.
    ///
    /// The whole horizon is validated up front: the first invalid literal
    /// fails the call naming that literal, and no partial forecast is
    /// produced.
    pub fn predict(&self, name: &str, horizon: &[String]) -> Result<Vec<ForecastPoint>> {
        if horizon.is_empty() {
            return Err(ForesightError::Validation(
                "horizon is empty: at least one date is required".to_string(),
            ));
        }

        let mut dates = Vec::with_capacity(horizon.len());
        for literal in horizon {
            dates.push(parse_date(literal)?);
        }

        let record = self.registry.get(name)?;
        let model = record.artifact.open()?;

        Ok(dates.into_iter().map(|date| model.predict(date)).collect())
    }

    /// Resolve the model to forecast with when the caller names none:
    /// the most recently trained model.
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
