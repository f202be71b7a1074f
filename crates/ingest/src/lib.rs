//! logrelay ingest layer
//!
//! This is where access-log events enter the gateway. We take the JSON body of
//! an HTTP request, figure out which envelope it came in, pull the log entries
//! out of it, and map each entry onto a [`CanonicalLogRecord`].
//!
//! ## What we do here
//!
//! - **Detect the envelope** - Pub/Sub push (`message.data`, base64 JSON) or a
//!   direct sidecar payload (one object or an array of them).
//! - **Decode bus payloads** - base64 → UTF-8 → JSON, each step with its own
//!   typed error.
//! - **Normalize** - Kubernetes metadata from `resource.labels` or top-level
//!   keys, log text into `payload` or `message`, a processing timestamp.
//! - **Log everything** - Structured logs via tracing.
//!
//! Parsing the access-log line itself lives in the `accesslog` crate.
//!
//! ## Example
//!
//! ```
//! use ingest::{normalize, unwrap_envelope, EntrySlot, IngestConfig, SourceKind};
//! use serde_json::json;
//!
//! let cfg = IngestConfig::default();
//! let body = json!({"message": "10.0.0.1 - - [..]", "pod": "web-0"});
//!
//! let decoded = unwrap_envelope(&body, &cfg).unwrap();
//! assert_eq!(decoded.kind, SourceKind::Direct);
//!
//! for slot in decoded.entries {
//!     if let EntrySlot::Entry(entry) = slot {
//!         let record = normalize(entry, decoded.kind, &cfg);
//!         assert_eq!(record.pod.as_deref(), Some("web-0"));
//!     }
//! }
//! ```
use std::time::Instant;

use serde_json::Value;
use tracing::{debug, warn};

mod config;
mod envelope;
mod error;
mod normalize;
mod types;

pub use crate::config::{ConfigError, IngestConfig};
pub use crate::envelope::{decode_bus_data, decode_envelope, detect_source, encode_bus_envelope};
pub use crate::error::{DecodeError, IngestError};
pub use crate::normalize::{normalize, normalize_at};
pub use crate::types::{CanonicalLogRecord, DecodedEnvelope, EntrySlot, InnerEntry, SourceKind};

/// Decodes an envelope and logs the outcome.
///
/// Same contract as [`decode_envelope`]; this is the entry point the pipeline
/// uses so every request leaves one `envelope_decoded` or `envelope_rejected`
/// event behind.
pub fn unwrap_envelope(body: &Value, cfg: &IngestConfig) -> Result<DecodedEnvelope, IngestError> {
    let start = Instant::now();
    let kind = detect_source(body);

    match decode_envelope(body, cfg) {
        Ok(decoded) => {
            let elapsed_micros = start.elapsed().as_micros();
            debug!(
                source = %decoded.kind,
                entries = decoded.entries.len(),
                usable = decoded.entry_count(),
                elapsed_micros,
                "envelope_decoded"
            );
            Ok(decoded)
        }
        Err(err) => {
            let elapsed_micros = start.elapsed().as_micros();
            warn!(
                source = %kind,
                error = %err,
                error_code = err.error_code(),
                elapsed_micros,
                "envelope_rejected"
            );
            Err(err)
        }
    }
}
