use crate::models::GenerationRequest;
use crate::services::metrics;
use crate::startup::AppState;
use axum::{
    extract::{Request, State},
    http::Method,
    Json,
};
use serde_json::Value;
use service_core::error::AppError;

/// Largest request body read after the method check.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// `/api/generate`: mounted for every method so that non-POST requests get
/// the JSON 405 body instead of axum's empty one.
pub async fn generate(
    State(state): State<AppState>,
    request: Request,
) -> Result<Json<Value>, AppError> {
    let result = run(&state, request).await;

    match &result {
        Ok(_) => metrics::record_request("success"),
        Err(e) => metrics::record_request(e.kind()),
    }

    result.map(Json)
}

async fn run(state: &AppState, request: Request) -> Result<Value, AppError> {
    if *request.method() != Method::POST {
        return Err(AppError::MethodNotAllowed);
    }

    let body = axum::body::to_bytes(request.into_body(), MAX_BODY_BYTES)
        .await
        .map_err(|e| {
            tracing::debug!(error = %e, "Failed to read generation request body");
            AppError::PayloadTooLarge {
                limit: MAX_BODY_BYTES,
            }
        })?;

    let request = GenerationRequest::from_json(&body)?;
    state.generator.generate(&request).await
}
