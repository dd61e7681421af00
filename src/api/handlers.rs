//! API handlers backed by a shared [`MoexFramework`].

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::experts::ExpertError;
use crate::framework::{DispatchError, MoexFramework};

/// Shared state for all API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub framework: Arc<MoexFramework>,
}

impl ApiState {
    #[must_use]
    pub fn new(framework: Arc<MoexFramework>) -> Self {
        Self { framework }
    }
}

/// Request body for the process endpoints.
#[derive(Debug, Deserialize)]
pub struct ProcessRequest {
    pub prompt: String,
}

/// Query parameters for the experts listing.
#[derive(Debug, Deserialize)]
pub struct ExpertsQuery {
    pub category: Option<String>,
}

/// POST /api/v1/process — dispatch a prompt to the best-scoring expert.
pub async fn post_process(
    State(state): State<ApiState>,
    Json(body): Json<ProcessRequest>,
) -> Response {
    if body.prompt.trim().is_empty() {
        return ApiErrorResponse::bad_request("prompt must not be empty");
    }

    match state.framework.process_request(&body.prompt).await {
        Ok(result) => ApiResponse::ok(result),
        Err(err) => dispatch_error_response(&err),
    }
}

/// POST /api/v1/experts/:name/process — direct query to a named expert,
/// bypassing scoring.
pub async fn post_expert_process(
    State(state): State<ApiState>,
    Path(name): Path<String>,
    Json(body): Json<ProcessRequest>,
) -> Response {
    if body.prompt.trim().is_empty() {
        return ApiErrorResponse::bad_request("prompt must not be empty");
    }

    match state.framework.process_with(&name, &body.prompt).await {
        Ok(result) => ApiResponse::ok(result),
        Err(err) => dispatch_error_response(&err),
    }
}

/// GET /api/v1/status — full framework status.
pub async fn get_status(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(state.framework.get_system_status().await)
}

/// GET /api/v1/experts — health reports, optionally filtered by category.
pub async fn get_experts(
    State(state): State<ApiState>,
    Query(query): Query<ExpertsQuery>,
) -> Response {
    let registry = state.framework.registry();

    let reports = match query.category {
        Some(category) => {
            let handles = registry.get_experts_by_category(&category).await;
            let mut reports = Vec::with_capacity(handles.len());
            for handle in &handles {
                reports.push(handle.health_report().await);
            }
            reports
        }
        None => registry.health_report().await,
    };

    ApiResponse::ok(reports)
}

/// GET /api/v1/health — health monitor status and summary.
pub async fn get_health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(state.framework.monitor().status().await)
}

/// Legacy GET /health — minimal liveness probe.
pub async fn legacy_health_check(State(state): State<ApiState>) -> Response {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "active": state.framework.is_active(),
        })),
    )
        .into_response()
}

/// Map dispatch errors onto the error envelope.
fn dispatch_error_response(err: &DispatchError) -> Response {
    match err {
        DispatchError::NotActivated | DispatchError::NoExpertAvailable => {
            ApiErrorResponse::service_unavailable(err.to_string())
        }
        DispatchError::UnknownExpert(_) => ApiErrorResponse::not_found(err.to_string()),
        DispatchError::Expert(ExpertError::BreakerOpen { .. }) => {
            ApiErrorResponse::service_unavailable(err.to_string())
        }
        DispatchError::Expert(ExpertError::Failed(_)) => {
            ApiErrorResponse::internal(err.to_string())
        }
    }
}
