//! API Regression Tests
//!
//! Drives the axum router with `tower::ServiceExt::oneshot` against a real
//! activated framework: envelope shape, dispatch endpoints, expert listing,
//! and error mapping.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use moex::api::{create_app, ApiState};
use moex::config::MoexConfig;
use moex::framework::MoexFramework;

/// App over a fresh activated framework.
async fn test_app() -> Router {
    let framework = Arc::new(MoexFramework::new(MoexConfig::default()).await);
    framework.activate().await;
    create_app(ApiState::new(framework))
}

/// App over a framework that was never activated.
async fn inactive_app() -> Router {
    let framework = Arc::new(MoexFramework::new(MoexConfig::default()).await);
    create_app(ApiState::new(framework))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn legacy_health_endpoint_is_alive() {
    let app = test_app().await;
    let response = app.oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let v = body_json(response).await;
    assert_eq!(v["status"], "ok");
    assert_eq!(v["active"], true);
}

#[tokio::test]
async fn status_endpoint_uses_envelope() {
    let app = test_app().await;
    let response = app.oneshot(get("/api/v1/status")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let v = body_json(response).await;
    assert_eq!(v["meta"]["version"], "1");
    assert_eq!(v["data"]["active"], true);
    assert_eq!(v["data"]["experts_registered"], 4);
    assert_eq!(v["data"]["expert_health"].as_array().unwrap().len(), 4);
    assert_eq!(v["data"]["health_monitor"]["running"], true);
}

#[tokio::test]
async fn process_endpoint_dispatches_to_echo() {
    let app = test_app().await;
    let response = app
        .oneshot(post_json("/api/v1/process", r#"{"prompt":"banana"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let v = body_json(response).await;
    assert_eq!(v["data"]["expert"], "Echo Chamber");
    assert_eq!(v["data"]["response"], "Acknowledged: \"banana\"");
    assert!(v["data"]["metadata"]["request_id"]
        .as_str()
        .unwrap()
        .starts_with("moex_"));
}

#[tokio::test]
async fn process_endpoint_routes_bug_prompts() {
    let app = test_app().await;
    let response = app
        .oneshot(post_json(
            "/api/v1/process",
            r#"{"prompt":"I have an error in my code that keeps crashing"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let v = body_json(response).await;
    assert_eq!(v["data"]["expert"], "Bug Hunter Detective");
    assert!(v["data"]["severity"].as_str().is_some());
    assert!(v["data"]["solution"].as_str().is_some());
}

#[tokio::test]
async fn empty_prompt_is_a_bad_request() {
    let app = test_app().await;
    let response = app
        .oneshot(post_json("/api/v1/process", r#"{"prompt":"   "}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let v = body_json(response).await;
    assert_eq!(v["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn inactive_framework_maps_to_service_unavailable() {
    let app = inactive_app().await;
    let response = app
        .oneshot(post_json("/api/v1/process", r#"{"prompt":"hello"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let v = body_json(response).await;
    assert_eq!(v["error"]["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test]
async fn direct_expert_query_works() {
    let app = test_app().await;
    let response = app
        .oneshot(post_json(
            "/api/v1/experts/Echo%20Chamber/process",
            r#"{"prompt":"direct hello"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let v = body_json(response).await;
    assert_eq!(v["data"]["expert"], "Echo Chamber");
    // Direct queries bypass dispatch metadata
    assert!(v["data"].get("metadata").is_none());
}

#[tokio::test]
async fn unknown_expert_is_not_found() {
    let app = test_app().await;
    let response = app
        .oneshot(post_json(
            "/api/v1/experts/Nobody%20Home/process",
            r#"{"prompt":"hello"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let v = body_json(response).await;
    assert_eq!(v["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn experts_endpoint_lists_roster() {
    let app = test_app().await;
    let response = app.oneshot(get("/api/v1/experts")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let v = body_json(response).await;
    let reports = v["data"].as_array().unwrap();
    assert_eq!(reports.len(), 4);
    let names: Vec<&str> = reports.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert!(names.contains(&"Echo Chamber"));
    assert!(names.contains(&"Bug Hunter Detective"));
}

#[tokio::test]
async fn experts_endpoint_filters_by_category() {
    let app = test_app().await;
    let response = app
        .oneshot(get("/api/v1/experts?category=genetic"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let v = body_json(response).await;
    let reports = v["data"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["name"], "DNA Transcription Specialist");
}

#[tokio::test]
async fn health_endpoint_reports_monitor_state() {
    let app = test_app().await;
    let response = app.oneshot(get("/api/v1/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let v = body_json(response).await;
    assert_eq!(v["data"]["running"], true);
    assert_eq!(v["data"]["check_interval_ms"], 30_000);
    // No periodic tick has fired yet at default intervals
    assert_eq!(v["data"]["summary"]["status"], "NO_DATA");
}
