//! Prophet-style additive forecasting model
//!
//! Fits a linear trend plus Fourier seasonality (weekly/yearly) and optional
//! per-label holiday effects by ridge regression. The fitted model is the
//! opaque artifact the registry persists, wrapped in a versioned envelope.

mod artifact;
mod forecaster;
mod params;
mod solve;

pub use artifact::{ArtifactEnvelope, ARTIFACT_FORMAT, ARTIFACT_SCHEMA_VERSION};
pub use forecaster::{Forecaster, ForecastPoint};
pub use params::{ForecastParams, SeasonalityMode};
