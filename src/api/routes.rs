//! API route configuration

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};
use crate::observability::HealthStatus;

/// Build the complete API router.
///
/// There is no HTTP-level auth layer: identity is resolved per action from
/// the caller's session token, and the rate-limit gate runs inside the
/// action pipeline so its keys can carry the resolved identity.
pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/v1/auth/login", post(handlers::login))
        .route("/api/v1/auth/register", post(handlers::register))
        .route("/api/v1/auth/logout", post(handlers::logout))
        .route("/api/v1/auth/session", get(handlers::current_session))
        .route(
            "/api/v1/polls",
            post(handlers::create_poll).get(handlers::list_own_polls),
        )
        .route(
            "/api/v1/polls/:id",
            get(handlers::get_poll)
                .put(handlers::update_poll)
                .delete(handlers::delete_poll),
        )
        .route("/api/v1/polls/:id/vote", post(handlers::submit_vote))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(max_body_bytes)),
        )
        .with_state(state)
}

/// Root handler
async fn root_handler() -> impl axum::response::IntoResponse {
    Json(serde_json::json!({
        "service": "Poll Gateway",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

/// Full health report
async fn health_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let health = state.health_checker.check_health().await;
    let status_code = match health.status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(health))
}

/// Liveness probe - always 200 while the process runs
async fn liveness_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let status = if state.health_checker.liveness() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(serde_json::json!({ "status": "alive" })))
}

/// Readiness probe - checks the backend answers
async fn readiness_handler(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    if state.health_checker.readiness().await {
        (StatusCode::OK, Json(serde_json::json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not_ready" })),
        )
    }
}

/// Prometheus metrics
async fn metrics_handler(State(state): State<AppState>) -> String {
    state.metrics.export_prometheus()
}
