//! Forecasting hyperparameters
//!
//! The registry treats `params` as an opaque key/value bag; only the fitting
//! procedure interprets it. An unrecognized key or ill-typed value fails the
//! fit, mirroring a keyword-argument mismatch in the original service.

use serde_json::{Map, Value};

use crate::error::{ForesightError, Result};

/// Seasonality switch: auto-detection based on the training span, or forced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeasonalityMode {
    Auto,
    Enabled,
    Disabled,
}

impl SeasonalityMode {
    /// Resolve against the training span in days
    pub fn resolve(self, span_days: i64, min_span_days: i64) -> bool {
        match self {
            SeasonalityMode::Auto => span_days >= min_span_days,
            SeasonalityMode::Enabled => true,
            SeasonalityMode::Disabled => false,
        }
    }
}

/// Parsed hyperparameters with Prophet-compatible defaults
#[derive(Debug, Clone)]
pub struct ForecastParams {
    pub weekly_seasonality: SeasonalityMode,
    pub yearly_seasonality: SeasonalityMode,
    /// Larger values allow more seasonal flexibility (inverse ridge strength)
    pub seasonality_prior_scale: f64,
    /// Nominal coverage of the prediction interval, in (0, 1)
    pub interval_width: f64,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            weekly_seasonality: SeasonalityMode::Auto,
            yearly_seasonality: SeasonalityMode::Auto,
            seasonality_prior_scale: 10.0,
            interval_width: 0.8,
        }
    }
}

impl ForecastParams {
    /// Parse the opaque bag. Failures are training errors: the bag reached
    /// the fitting procedure, the registry never validated it.
    pub fn from_bag(bag: &Map<String, Value>) -> Result<Self> {
        let mut params = Self::default();

        for (key, value) in bag {
            match key.as_str() {
                "weekly_seasonality" => {
                    params.weekly_seasonality = parse_seasonality(key, value)?;
                }
                "yearly_seasonality" => {
                    params.yearly_seasonality = parse_seasonality(key, value)?;
                }
                "seasonality_prior_scale" => {
                    let v = as_f64(key, value)?;
                    if v <= 0.0 {
                        return Err(bad_param(key, value, "a positive number"));
                    }
                    params.seasonality_prior_scale = v;
                }
                "interval_width" => {
                    let v = as_f64(key, value)?;
                    if !(0.0..1.0).contains(&v) || v == 0.0 {
                        return Err(bad_param(key, value, "a number in (0, 1)"));
                    }
                    params.interval_width = v;
                }
                _ => {
                    return Err(ForesightError::Training(format!(
                        "unknown parameter '{}'",
                        key
                    )));
                }
            }
        }

        Ok(params)
    }

    /// Ridge regularization strength derived from the prior scale
    pub fn ridge_alpha(&self) -> f64 {
        1.0 / self.seasonality_prior_scale
    }
}

fn parse_seasonality(key: &str, value: &Value) -> Result<SeasonalityMode> {
    match value {
        Value::Bool(true) => Ok(SeasonalityMode::Enabled),
        Value::Bool(false) => Ok(SeasonalityMode::Disabled),
        Value::String(s) if s == "auto" => Ok(SeasonalityMode::Auto),
        _ => Err(bad_param(key, value, "true, false or \"auto\"")),
    }
}

fn as_f64(key: &str, value: &Value) -> Result<f64> {
    value
        .as_f64()
        .ok_or_else(|| bad_param(key, value, "a number"))
}

fn bad_param(key: &str, value: &Value, expected: &str) -> ForesightError {
    ForesightError::Training(format!(
        "invalid value {} for parameter '{}': expected {}",
        value, key, expected
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bag(value: Value) -> Map<String, Value> {
        value.as_object().unwrap().clone()
    }

    #[test]
    fn test_defaults_from_empty_bag() {
        let params = ForecastParams::from_bag(&Map::new()).unwrap();
        assert_eq!(params.weekly_seasonality, SeasonalityMode::Auto);
        assert_eq!(params.interval_width, 0.8);
    }

    #[test]
    fn test_recognized_keys() {
        let params = ForecastParams::from_bag(&bag(json!({
            "weekly_seasonality": true,
            "yearly_seasonality": false,
            "seasonality_prior_scale": 5.0,
            "interval_width": 0.95,
        })))
        .unwrap();
        assert_eq!(params.weekly_seasonality, SeasonalityMode::Enabled);
        assert_eq!(params.yearly_seasonality, SeasonalityMode::Disabled);
        assert_eq!(params.seasonality_prior_scale, 5.0);
        assert_eq!(params.interval_width, 0.95);
    }

    #[test]
    fn test_unknown_key_is_training_error() {
        let err = ForecastParams::from_bag(&bag(json!({"changepoints": 3}))).unwrap_err();
        assert!(matches!(err, ForesightError::Training(_)));
        assert!(err.to_string().contains("changepoints"));
    }

    #[test]
    fn test_ill_typed_value_rejected() {
        assert!(ForecastParams::from_bag(&bag(json!({"interval_width": "wide"}))).is_err());
        assert!(ForecastParams::from_bag(&bag(json!({"interval_width": 1.5}))).is_err());
        assert!(
            ForecastParams::from_bag(&bag(json!({"seasonality_prior_scale": -1.0}))).is_err()
        );
    }
}
