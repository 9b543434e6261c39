//! Foresight - time-series forecasting service
//!
//! Manages the lifecycle of trained forecasting models: durable storage
//! under unique names, synchronous and background training, future-horizon
//! forecasting, and accuracy scoring against held-out data.
//!
//! # Modules
//!
//! - [`registry`] - durable keyed store of model artifacts + metadata
//! - [`training`] - training orchestrator (sync + background) and job records
//! - [`forecast`] - point/interval forecasts over a requested horizon
//! - [`evaluation`] - MAE/RMSE scoring against holdout observations
//! - [`model`] - the additive forecaster and its versioned artifact envelope
//! - [`dataset`] - observation types and validation
//! - [`server`] - HTTP server with REST API
//! - [`cli`] - command-line interface

// Core error handling
pub mod error;

// Data and model
pub mod dataset;
pub mod model;

// Lifecycle components
pub mod evaluation;
pub mod forecast;
pub mod registry;
pub mod training;

// Services
pub mod cli;
pub mod server;

pub use error::{ForesightError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::dataset::{Holiday, Observation, Series};
    pub use crate::error::{ForesightError, Result};
    pub use crate::evaluation::{EvalReport, EvaluationEngine};
    pub use crate::forecast::ForecastEngine;
    pub use crate::model::{ArtifactEnvelope, ForecastParams, ForecastPoint, Forecaster};
    pub use crate::registry::{ModelMetadata, ModelRecord, ModelRegistry, ModelSummary};
    pub use crate::training::{JobState, TrainRequest, TrainingJob, TrainingOrchestrator};
}
