//! API route definitions
//!
//! Endpoints for the MOEX dispatch framework:
//! - POST /api/v1/process - dispatch a prompt to the best-scoring expert
//! - POST /api/v1/experts/:name/process - direct query to a named expert
//! - GET /api/v1/experts - expert health reports (optional ?category=)
//! - GET /api/v1/status - full framework status
//! - GET /api/v1/health - health monitor summary

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// Create all API routes.
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        .route("/process", post(handlers::post_process))
        .route("/experts", get(handlers::get_experts))
        .route("/experts/:name/process", post(handlers::post_expert_process))
        .route("/status", get(handlers::get_status))
        .route("/health", get(handlers::get_health))
        .with_state(state)
}

/// Legacy health endpoint at root level.
pub fn legacy_routes(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(handlers::legacy_health_check))
        .with_state(state)
}
