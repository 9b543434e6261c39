//! The additive forecaster
//!
//! Model: `y(t) = mean + trend(t) + weekly(t) + yearly(t) + holidays(t)`,
//! fit in one ridge solve over the stacked design matrix. Seasonality blocks
//! are Fourier series over a continuous day index so the model extrapolates
//! past the training window.

use chrono::{Datelike, NaiveDate};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::dataset::{parse_date, Holiday, Series};
use crate::error::{ForesightError, Result};

use super::params::ForecastParams;
use super::solve::ridge_solve;

const WEEKLY_ORDER: usize = 3;
const YEARLY_ORDER: usize = 10;
const WEEKLY_PERIOD: f64 = 7.0;
const YEARLY_PERIOD: f64 = 365.25;

/// Minimum training span (days) before auto seasonality switches on
const WEEKLY_MIN_SPAN_DAYS: i64 = 14;
const YEARLY_MIN_SPAN_DAYS: i64 = 365;

/// A single forecast output row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub ds: NaiveDate,
    pub yhat: f64,
    pub yhat_lower: f64,
    pub yhat_upper: f64,
}

/// A fitted forecasting model. This struct is the artifact payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecaster {
    origin_day: i64,
    span_days: f64,
    train_end: NaiveDate,
    y_mean: f64,
    coefficients: Vec<f64>,
    weekly: bool,
    yearly: bool,
    holiday_labels: Vec<String>,
    holiday_dates: Vec<(NaiveDate, usize)>,
    /// Standard deviation of training residuals
    sigma: f64,
    interval_z: f64,
}

impl Forecaster {
    /// Fit the model to a validated series.
    ///
    /// Failures here are training errors: the inputs already passed
    /// validation, so anything that goes wrong is the fit itself.
    pub fn fit(series: &Series, holidays: &[Holiday], params: &ForecastParams) -> Result<Self> {
        let (first, last) = match (series.dates.iter().min(), series.dates.iter().max()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => {
                return Err(ForesightError::Training(
                    "cannot fit a model on an empty series".to_string(),
                ))
            }
        };
        let span = (last - first).num_days();
        let span_days = (span as f64).max(1.0);

        let weekly = params.weekly_seasonality.resolve(span, WEEKLY_MIN_SPAN_DAYS);
        let yearly = params.yearly_seasonality.resolve(span, YEARLY_MIN_SPAN_DAYS);

        let (holiday_labels, holiday_dates) = index_holidays(holidays)?;

        let n = series.len();
        let y_mean = series.values.iter().sum::<f64>() / n as f64;

        let mut model = Self {
            origin_day: day_index(first),
            span_days,
            train_end: last,
            y_mean,
            coefficients: Vec::new(),
            weekly,
            yearly,
            holiday_labels,
            holiday_dates,
            sigma: 0.0,
            interval_z: z_score(params.interval_width),
        };

        let p = model.feature_count();
        let mut x = Array2::zeros((n, p));
        for (i, date) in series.dates.iter().enumerate() {
            for (j, v) in model.features(*date).into_iter().enumerate() {
                x[[i, j]] = v;
            }
        }
        let y: Array1<f64> = series.values.iter().map(|v| v - y_mean).collect();

        let w = ridge_solve(&x, &y, params.ridge_alpha(), 0).ok_or_else(|| {
            ForesightError::Training("failed to fit model: singular design matrix".to_string())
        })?;

        // Residual spread drives the prediction intervals
        let fitted = x.dot(&w);
        let sq_sum: f64 = y
            .iter()
            .zip(fitted.iter())
            .map(|(actual, fit)| (actual - fit).powi(2))
            .sum();
        model.sigma = (sq_sum / n as f64).sqrt();
        model.coefficients = w.to_vec();

        Ok(model)
    }

    /// Point forecast with prediction interval for one date
    pub fn predict(&self, date: NaiveDate) -> ForecastPoint {
        let features = self.features(date);
        let yhat: f64 = self
            .coefficients
            .iter()
            .zip(features.iter())
            .map(|(w, f)| w * f)
            .sum::<f64>()
            + self.y_mean;

        // Interval widens for dates past the training window
        let days_beyond = (date - self.train_end).num_days().max(0) as f64;
        let se = self.sigma * (1.0 + days_beyond / self.span_days).sqrt();
        let margin = self.interval_z * se;

        ForecastPoint {
            ds: date,
            yhat,
            yhat_lower: yhat - margin,
            yhat_upper: yhat + margin,
        }
    }

    fn feature_count(&self) -> usize {
        let mut p = 2; // intercept + trend
        if self.weekly {
            p += 2 * WEEKLY_ORDER;
        }
        if self.yearly {
            p += 2 * YEARLY_ORDER;
        }
        p + self.holiday_labels.len()
    }

    fn features(&self, date: NaiveDate) -> Vec<f64> {
        let d = day_index(date);
        let mut row = Vec::with_capacity(self.feature_count());

        row.push(1.0);
        row.push((d - self.origin_day) as f64 / self.span_days);

        if self.weekly {
            fourier_terms(&mut row, d as f64, WEEKLY_PERIOD, WEEKLY_ORDER);
        }
        if self.yearly {
            fourier_terms(&mut row, d as f64, YEARLY_PERIOD, YEARLY_ORDER);
        }

        let mut holiday_row = vec![0.0; self.holiday_labels.len()];
        for (holiday_date, label) in &self.holiday_dates {
            if *holiday_date == date {
                holiday_row[*label] = 1.0;
            }
        }
        row.extend(holiday_row);

        row
    }
}

/// Continuous day index shared by fit and predict
fn day_index(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

fn fourier_terms(row: &mut Vec<f64>, day: f64, period: f64, order: usize) {
    for k in 1..=order {
        let angle = 2.0 * std::f64::consts::PI * k as f64 * day / period;
        row.push(angle.sin());
        row.push(angle.cos());
    }
}

/// Dedup holiday labels (order-preserving) and parse their dates
fn index_holidays(holidays: &[Holiday]) -> Result<(Vec<String>, Vec<(NaiveDate, usize)>)> {
    let mut labels: Vec<String> = Vec::new();
    let mut dates = Vec::with_capacity(holidays.len());

    for holiday in holidays {
        let date = parse_date(&holiday.ds).map_err(|_| {
            ForesightError::Training(format!("invalid holiday date '{}'", holiday.ds))
        })?;
        let label = match labels.iter().position(|l| *l == holiday.holiday) {
            Some(idx) => idx,
            None => {
                labels.push(holiday.holiday.clone());
                labels.len() - 1
            }
        };
        dates.push((date, label));
    }

    Ok((labels, dates))
}

/// Approximate z-score for a two-sided interval of the given coverage
fn z_score(interval_width: f64) -> f64 {
    match interval_width {
        w if w >= 0.99 => 2.576,
        w if w >= 0.95 => 1.96,
        w if w >= 0.90 => 1.645,
        w if w >= 0.80 => 1.282,
        _ => 1.0,
    }
}
