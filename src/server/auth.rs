//! Authorization seam
//!
//! The server never hard-codes policy: it asks an [`Authorizer`] whether a
//! principal may perform an action. Deployments plug in their identity
//! provider here; the bundled implementations cover "no auth" and the
//! static-key setup the original deployment used.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use super::state::AppState;

/// Capability check delegated to an external identity provider
pub trait Authorizer: Send + Sync {
    fn is_authorized(&self, principal: Option<&str>, action: &str) -> bool;
}

/// Authorizes every caller
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn is_authorized(&self, _principal: Option<&str>, _action: &str) -> bool {
        true
    }
}

/// Authorizes callers presenting a fixed key as their principal
pub struct StaticKey {
    key: String,
}

impl StaticKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

impl Authorizer for StaticKey {
    fn is_authorized(&self, principal: Option<&str>, _action: &str) -> bool {
        principal == Some(self.key.as_str())
    }
}

/// Request middleware: principal comes from the `x-api-key` header, the
/// action is the method + path.
pub async fn authorize_request(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let principal = request
        .headers()
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);
    let action = format!("{} {}", request.method(), request.uri().path());

    if state
        .authorizer
        .is_authorized(principal.as_deref(), &action)
    {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({
                "error": true,
                "message": "Unauthorized",
            })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_all() {
        assert!(AllowAll.is_authorized(None, "POST /api/train"));
        assert!(AllowAll.is_authorized(Some("anyone"), "DELETE /api/models/x"));
    }

    #[test]
    fn test_static_key() {
        let auth = StaticKey::new("secret");
        assert!(auth.is_authorized(Some("secret"), "POST /api/train"));
        assert!(!auth.is_authorized(Some("wrong"), "POST /api/train"));
        assert!(!auth.is_authorized(None, "POST /api/train"));
    }
}
