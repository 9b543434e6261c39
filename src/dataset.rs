//! Observation types and dataset validation
//!
//! The core consumes already-parsed observations: a timestamp literal (`ds`)
//! and a numeric target (`y`). Validation here is synchronous and names the
//! offending field or literal, so malformed input never reaches a fit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{ForesightError, Result};

/// Fixed calendar-date format for all `ds` literals
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single observation as received at the boundary.
///
/// Both fields are optional at the wire level so that validation, not
/// deserialization, reports which field is missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    #[serde(default)]
    pub ds: Option<String>,
    #[serde(default)]
    pub y: Option<f64>,
}

/// A calendar exception folded into a fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holiday {
    pub ds: String,
    pub holiday: String,
}

/// A validated, parsed series of observations
#[derive(Debug, Clone)]
pub struct Series {
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}

impl Series {
    /// Validate raw observations into a parsed series.
    ///
    /// Fails on an empty dataset, a missing `ds`/`y` field (naming the field
    /// and the row), an unparsable date literal, or a non-finite target.
    pub fn from_observations(observations: &[Observation]) -> Result<Self> {
        if observations.is_empty() {
            return Err(ForesightError::Validation(
                "dataset is empty: at least one observation is required".to_string(),
            ));
        }

        let mut dates = Vec::with_capacity(observations.len());
        let mut values = Vec::with_capacity(observations.len());

        for (row, obs) in observations.iter().enumerate() {
            let ds = obs.ds.as_deref().ok_or_else(|| {
                ForesightError::Validation(format!(
                    "missing required field 'ds' in observation {}",
                    row
                ))
            })?;
            let y = obs.y.ok_or_else(|| {
                ForesightError::Validation(format!(
                    "missing required field 'y' in observation {}",
                    row
                ))
            })?;
            if !y.is_finite() {
                return Err(ForesightError::Validation(format!(
                    "non-finite value for 'y' in observation {}: {}",
                    row, y
                )));
            }
            dates.push(parse_date(ds)?);
            values.push(y);
        }

        Ok(Series { dates, values })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Parse a `YYYY-MM-DD` literal.
///
/// Stricter than bare chrono parsing: the literal must be exactly ten
/// characters with zero-padded month and day, so `2024-1-2` is rejected
/// even though chrono would accept it.
pub fn parse_date(literal: &str) -> Result<NaiveDate> {
    let bytes = literal.as_bytes();
    let shape_ok = bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| matches!(i, 4 | 7) || b.is_ascii_digit());

    if !shape_ok {
        return Err(invalid_date(literal));
    }

    NaiveDate::parse_from_str(literal, DATE_FORMAT).map_err(|_| invalid_date(literal))
}

fn invalid_date(literal: &str) -> ForesightError {
    ForesightError::Validation(format!(
        "invalid date '{}': expected YYYY-MM-DD",
        literal
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(ds: &str, y: f64) -> Observation {
        Observation {
            ds: Some(ds.to_string()),
            y: Some(y),
        }
    }

    #[test]
    fn test_parse_valid_date() {
        let d = parse_date("2024-01-15").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
    }

    #[test]
    fn test_parse_rejects_bad_literals() {
        for literal in ["2024-02-30", "not-a-date", "2024-1-2", "2024/01/02", ""] {
            let err = parse_date(literal).unwrap_err();
            assert!(
                err.to_string().contains(literal),
                "error should name the literal: {}",
                err
            );
        }
    }

    #[test]
    fn test_series_from_valid_observations() {
        let series =
            Series::from_observations(&[obs("2024-01-01", 10.0), obs("2024-01-02", 12.0)])
                .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.values, vec![10.0, 12.0]);
    }

    #[test]
    fn test_series_rejects_empty_dataset() {
        let err = Series::from_observations(&[]).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_series_names_missing_field() {
        let missing_y = Observation {
            ds: Some("2024-01-01".to_string()),
            y: None,
        };
        let err = Series::from_observations(&[missing_y]).unwrap_err();
        assert!(err.to_string().contains("'y'"));

        let missing_ds = Observation {
            ds: None,
            y: Some(1.0),
        };
        let err = Series::from_observations(&[missing_ds]).unwrap_err();
        assert!(err.to_string().contains("'ds'"));
    }

    #[test]
    fn test_series_rejects_non_finite_target() {
        let bad = Observation {
            ds: Some("2024-01-01".to_string()),
            y: Some(f64::NAN),
        };
        assert!(Series::from_observations(&[bad]).is_err());
    }
}
