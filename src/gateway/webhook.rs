//! Webhook and health endpoints.

use super::AppState;
use crate::channels::{ParseError, SIGNATURE_HEADER};
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Json},
};

/// POST <webhook_path>: verify, parse, dispatch the whole batch, then answer.
///
/// The response is only sent once every event of the batch has finished,
/// so the platform sees 200 after all replies went out.
pub async fn handle_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|value| value.to_str().ok());

    let events = match state.parser.parse(signature, &body) {
        Ok(events) => events,
        Err(ParseError::InvalidSignature) => {
            tracing::warn!(
                parser = state.parser.name(),
                has_signature = signature.is_some(),
                "rejected webhook with invalid signature"
            );
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "invalid signature"})),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!(parser = state.parser.name(), error = %e, "failed to parse webhook");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "malformed webhook body"})),
            )
                .into_response();
        }
    };

    let report = state.dispatcher.handle_batch(events).await;
    tracing::info!(
        dispatcher = state.dispatcher.name(),
        events = report.len(),
        replied = report.replied(),
        failed = report.failures().count(),
        "webhook batch handled"
    );

    (StatusCode::OK, Json(serde_json::json!({}))).into_response()
}

/// GET /health
pub async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}
