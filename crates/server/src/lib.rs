//! logrelay server: HTTP front door for the access-log pipeline.
//!
//! Accepts log envelopes from a message-bus push subscription (base64 data
//! wrapped in `{"message": {"data": ...}}`) or directly from a log shipper
//! (one JSON object or an array of them). Every entry is normalized, its
//! access-log line parsed and classified, and the result emitted as a
//! structured `tracing` event.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /` and `POST /api/v1/logs` - Ingest one envelope
//! - `GET /` - API information
//! - `GET /healthz`, `GET /health` - Liveness check
//! - `GET /metrics` - Prometheus metrics
//!
//! # Configuration
//!
//! Read from an optional `server.{toml,yaml,json}` file, then `LOGRELAY__*`
//! environment variables (`LOGRELAY__INGEST__MAX_DECODED_BYTES=1048576`), then
//! `PORT`. The binary loads a `.env` file first when present.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
