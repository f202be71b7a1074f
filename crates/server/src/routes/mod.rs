//! API route handlers
//!
//! - `health`: liveness checks and Prometheus metrics
//! - `logs`: the log envelope endpoint

pub mod health;
pub mod logs;

use crate::error::{ServerError, ServerResult};
use crate::state::ServerMetadata;
use axum::response::IntoResponse;
use axum::Json;

/// API version and base info
///
/// # Response
///
/// ```json
/// {
///   "name": "logrelay",
///   "version": "0.1.0",
///   "uptime_seconds": 42,
///   "endpoints": ["..."]
/// }
/// ```
pub async fn api_info() -> ServerResult<impl IntoResponse> {
    Ok(Json(ServerMetadata::current(health::uptime_seconds())))
}

/// 404 Not Found handler
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
