//! API route definitions

use std::sync::Arc;

use axum::{
    http::StatusCode,
    middleware as axum_middleware,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{auth, handlers, state::AppState};

async fn handle_404() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": true,
            "message": "Not found. Check /api/health for API status.",
        })),
    )
}

async fn handle_405() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({
            "error": true,
            "message": "Method not allowed.",
        })),
    )
}

/// Create the main application router
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Training
        .route("/train", post(handlers::train))
        .route("/train_async", post(handlers::train_async))
        .route("/train/status/:job_id", get(handlers::get_training_status))
        // Forecasting and evaluation
        .route("/predict", post(handlers::predict))
        .route("/evaluate", post(handlers::evaluate))
        // Model management
        .route("/models", get(handlers::list_models))
        .route(
            "/models/:name",
            get(handlers::get_model).delete(handlers::delete_model),
        )
        .route("/models/:name/download", get(handlers::download_model))
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::authorize_request,
        ))
        // System. The liveness probe stays open on keyed deployments.
        .route("/health", get(handlers::health_check))
        .fallback(handle_404)
        .method_not_allowed_fallback(handle_405);

    Router::new()
        .nest("/api", api_routes)
        .fallback(handle_404)
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
