use crate::error::{ServerError, ServerResult};
use crate::state::ServerState;
use axum::body::Bytes;
use axum::extract::rejection::BytesRejection;
use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use logrelay::process_envelope;
use serde_json::Value;
use std::sync::Arc;

/// Accepts one log envelope (bus push, single direct entry or direct array).
///
/// The body must be declared as JSON. Each resulting record is emitted to the
/// state's sink before the summary is returned.
///
/// # Response
///
/// ```json
/// {"status": "processed", "source": "direct", "processed": 2, "failed": 0}
/// ```
pub async fn ingest_logs(
    State(state): State<Arc<ServerState>>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> ServerResult<impl IntoResponse> {
    require_json(&headers)?;

    let body = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge(state.config.max_body_size_mb)
        } else {
            ServerError::BadRequest(rejection.body_text())
        }
    })?;

    let envelope: Value = serde_json::from_slice(&body)?;
    let summary = process_envelope(&envelope, &state.config.ingest, state.sink.as_ref())?;

    Ok(Json(summary))
}

fn require_json(headers: &HeaderMap) -> ServerResult<()> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if content_type.to_ascii_lowercase().contains("application/json") {
        Ok(())
    } else {
        Err(ServerError::UnsupportedContentType(content_type.to_string()))
    }
}
