use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use service_core::error::AppError;

use crate::models::WelcomeResponse;
use crate::services::metrics;
use crate::startup::AppState;

pub const WELCOME_MESSAGE: &str = "Bem-vindo à API InsightStream AI! Acesse /docs para testar.";

/// `GET /`: welcome banner.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Welcome banner", body = WelcomeResponse)
    ),
    tag = "Observability"
)]
pub async fn root() -> Json<WelcomeResponse> {
    Json(WelcomeResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
}

/// Health check endpoint for Docker/K8s liveness probes.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy")
    ),
    tag = "Observability"
)]
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "feedback-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check endpoint for K8s readiness probes.
#[utoipa::path(
    get,
    path = "/ready",
    responses(
        (status = 200, description = "AI provider is reachable"),
        (status = 503, description = "AI provider is unreachable or rejects the credential")
    ),
    tag = "Observability"
)]
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let provider = state.analyzer.provider();
    provider.health_check().await.map_err(|e| {
        tracing::warn!(provider = provider.name(), error = %e, "Provider not ready");
        AppError::ServiceUnavailable
    })?;
    Ok(StatusCode::OK)
}

/// Prometheus scrape endpoint.
pub async fn metrics_endpoint() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::get_metrics(),
    )
}
