//! HTTP handlers mapping gateway actions onto the wire envelope

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::actions::Actions;
use crate::error::ActionError;
use crate::observability::{GatewayMetrics, HealthChecker};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub actions: Arc<Actions>,
    pub health_checker: Arc<HealthChecker>,
    pub metrics: Arc<GatewayMetrics>,
}

/// Response envelope: exactly one of `data` and `error` is set.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Poll content as submitted; ids stay strings so identifier validation
/// happens in the pipeline, not in deserialization.
#[derive(Debug, Deserialize)]
pub struct PollContentRequest {
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub option_index: usize,
}

/// Pull the bearer token out of the Authorization header, if any.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::to_string)
}

fn status_for(err: &ActionError) -> StatusCode {
    match err {
        ActionError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
        ActionError::Validation(_) | ActionError::InvalidOption => StatusCode::BAD_REQUEST,
        ActionError::Unauthenticated | ActionError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        ActionError::Forbidden => StatusCode::FORBIDDEN,
        ActionError::NotFound => StatusCode::NOT_FOUND,
        ActionError::AlreadyVoted | ActionError::EmailTaken => StatusCode::CONFLICT,
        ActionError::Backend => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Fold an action result into the envelope, feeding the metrics counters.
fn respond<T: Serialize>(
    metrics: &GatewayMetrics,
    success: StatusCode,
    result: crate::error::Result<T>,
) -> Response {
    metrics.record_action();
    match result {
        Ok(value) => (
            success,
            Json(Envelope {
                data: Some(value),
                error: None,
            }),
        )
            .into_response(),
        Err(err) => {
            metrics.record_failure(&err);
            (
                status_for(&err),
                Json(Envelope::<T> {
                    data: None,
                    error: Some(err.to_string()),
                }),
            )
                .into_response()
        }
    }
}

pub async fn login(State(state): State<AppState>, Json(req): Json<LoginRequest>) -> Response {
    let result = state.actions.login(&req.email, &req.password).await;
    respond(&state.metrics, StatusCode::OK, result)
}

pub async fn register(State(state): State<AppState>, Json(req): Json<RegisterRequest>) -> Response {
    let result = state
        .actions
        .register(&req.email, &req.password, &req.name)
        .await;
    respond(&state.metrics, StatusCode::CREATED, result)
}

pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = bearer_token(&headers);
    let result = state.actions.logout(token.as_deref()).await;
    respond(&state.metrics, StatusCode::OK, result)
}

pub async fn current_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = bearer_token(&headers);
    let result = state.actions.current_session(token.as_deref()).await;
    respond(&state.metrics, StatusCode::OK, result)
}

pub async fn create_poll(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PollContentRequest>,
) -> Response {
    let token = bearer_token(&headers);
    let result = state
        .actions
        .create_poll(token.as_deref(), &req.question, &req.options)
        .await;
    respond(&state.metrics, StatusCode::CREATED, result)
}

pub async fn get_poll(State(state): State<AppState>, Path(poll_id): Path<String>) -> Response {
    let result = state.actions.get_poll(&poll_id).await;
    respond(&state.metrics, StatusCode::OK, result)
}

pub async fn list_own_polls(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = bearer_token(&headers);
    let result = state.actions.list_own_polls(token.as_deref()).await;
    respond(&state.metrics, StatusCode::OK, result)
}

pub async fn update_poll(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(poll_id): Path<String>,
    Json(req): Json<PollContentRequest>,
) -> Response {
    let token = bearer_token(&headers);
    let result = state
        .actions
        .update_poll(token.as_deref(), &poll_id, &req.question, &req.options)
        .await;
    respond(&state.metrics, StatusCode::OK, result)
}

pub async fn delete_poll(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(poll_id): Path<String>,
) -> Response {
    let token = bearer_token(&headers);
    let result = state.actions.delete_poll(token.as_deref(), &poll_id).await;
    respond(&state.metrics, StatusCode::OK, result)
}

pub async fn submit_vote(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(poll_id): Path<String>,
    Json(req): Json<VoteRequest>,
) -> Response {
    let token = bearer_token(&headers);
    let result = state
        .actions
        .submit_vote(token.as_deref(), &poll_id, req.option_index)
        .await;
    respond(&state.metrics, StatusCode::CREATED, result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_token_extraction() {
        let mut headers = HeaderMap::new();
        assert!(bearer_token(&headers).is_none());

        headers.insert(header::AUTHORIZATION, "Bearer tok-123".parse().unwrap());
        assert_eq!(bearer_token(&headers).as_deref(), Some("tok-123"));

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().unwrap());
        assert!(bearer_token(&headers).is_none());
    }

    #[test]
    fn error_statuses() {
        assert_eq!(
            status_for(&ActionError::Unauthenticated),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(status_for(&ActionError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(status_for(&ActionError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&ActionError::AlreadyVoted), StatusCode::CONFLICT);
        assert_eq!(
            status_for(&ActionError::Backend),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
