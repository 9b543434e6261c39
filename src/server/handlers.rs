//! HTTP request handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::dataset::Observation;
use crate::model::ForecastPoint;
use crate::training::TrainRequest;

use super::error::Result;
use super::state::AppState;

#[derive(Serialize)]
pub struct TrainResponse {
    pub model_name: String,
}

#[derive(Deserialize)]
pub struct PredictRequest {
    pub horizon: Vec<String>,
    pub model_name: Option<String>,
}

#[derive(Serialize)]
pub struct PredictResponse {
    pub model_name: String,
    pub forecast: Vec<ForecastPoint>,
}

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub observations: Vec<Observation>,
    pub model_name: Option<String>,
}

#[derive(Serialize)]
pub struct EvaluateResponse {
    pub model_name: String,
    pub mae: f64,
    pub rmse: f64,
}

// ============================================================================
// Training
// ============================================================================

/// Train a model and wait for its record to be committed.
///
/// Blocks the caller for the duration of the fit; there is no deadline.
pub async fn train(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TrainRequest>,
) -> Result<Json<TrainResponse>> {
    let model_name = state.orchestrator.train_sync(request)?;
    Ok(Json(TrainResponse { model_name }))
}

/// Validate, accept, and schedule a background fit. Completion is observable
/// via the job endpoint or by polling the registry for the model name.
pub async fn train_async(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TrainRequest>,
) -> Result<impl IntoResponse> {
    let job = state.orchestrator.train_async(request).await?;
    Ok((StatusCode::ACCEPTED, Json(job)))
}

pub async fn get_training_status(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> Result<Json<crate::training::TrainingJob>> {
    let job = state.orchestrator.job(&job_id).await?;
    Ok(Json(job))
}

// ============================================================================
// Prediction and evaluation
// ============================================================================

pub async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>> {
    let model_name = state
        .forecast
        .resolve_model_name(request.model_name.as_deref())?;
    let forecast = state.forecast.predict(&model_name, &request.horizon)?;
    Ok(Json(PredictResponse {
        model_name,
        forecast,
    }))
}

pub async fn evaluate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<EvaluateRequest>,
) -> Result<Json<EvaluateResponse>> {
    let model_name = state
        .evaluation
        .resolve_model_name(request.model_name.as_deref())?;
    let report = state.evaluation.evaluate(&model_name, &request.observations)?;
    Ok(Json(EvaluateResponse {
        model_name,
        mae: report.mae,
        rmse: report.rmse,
    }))
}

// ============================================================================
// Model management
// ============================================================================

pub async fn list_models(State(state): State<Arc<AppState>>) -> Result<Json<serde_json::Value>> {
    let models = state.registry.list()?;
    Ok(Json(serde_json::json!({ "models": models })))
}

pub async fn get_model(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>> {
    let record = state.registry.get(&name)?;
    Ok(Json(serde_json::json!({
        "model_name": name,
        "metadata": record.metadata,
    })))
}

/// Download the full stored record (metadata + versioned artifact envelope)
pub async fn download_model(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse> {
    let record = state.registry.get(&name)?;
    let bytes = serde_json::to_vec_pretty(&record).map_err(crate::error::ForesightError::from)?;

    let disposition = format!("attachment; filename=\"{}.json\"", name);
    Ok((
        StatusCode::OK,
        [
            (
                axum::http::header::CONTENT_TYPE,
                axum::http::HeaderValue::from_static("application/json"),
            ),
            (
                axum::http::header::CONTENT_DISPOSITION,
                axum::http::HeaderValue::from_str(&disposition).map_err(|e| {
                    crate::error::ForesightError::Storage(format!("invalid header: {}", e))
                })?,
            ),
        ],
        bytes,
    ))
}

pub async fn delete_model(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<serde_json::Value>> {
    state.registry.delete(&name)?;
    Ok(Json(serde_json::json!({
        "message": format!("Model '{}' deleted.", name),
    })))
}

// ============================================================================
// System
// ============================================================================

pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "time": Utc::now().to_rfc3339(),
    }))
}
