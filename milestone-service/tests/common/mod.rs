//! Shared helpers for milestone-service integration tests.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use milestone_service::config::CorsConfig;
use milestone_service::services::providers::TextProvider;
use milestone_service::services::PromptTemplate;
use milestone_service::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt;

pub const SKILL_NAME: &str = "Music Production";
pub const GOAL: &str = "Earn income as a virtual musician";

/// Ten schema-conforming milestones, as the model would return them.
pub fn sample_milestones() -> Value {
    let milestones: Vec<Value> = (1..=10)
        .map(|level| {
            json!({
                "level": level,
                "milestone": format!("Music production milestone {}", level)
            })
        })
        .collect();

    json!({ "milestones": milestones })
}

pub fn sample_request() -> Value {
    json!({ "skillName": SKILL_NAME, "goal": GOAL })
}

/// Router over the given provider with the bundled prompt and no CORS.
pub fn router_with(provider: Arc<dyn TextProvider>) -> Router {
    build_router(
        AppState::new(provider, PromptTemplate::default()),
        &CorsConfig::default(),
    )
}

pub async fn send_raw(
    router: &Router,
    method: &str,
    uri: &str,
    body: Body,
) -> (StatusCode, HeaderMap, Vec<u8>) {
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, headers, bytes.to_vec())
}

/// Send a JSON request and decode the JSON response (Null when empty).
pub async fn send_json(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::empty(),
    };

    let (status, _, bytes) = send_raw(router, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}
