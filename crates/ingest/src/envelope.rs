//! Envelope detection and decoding.
//!
//! An inbound body is either a message-bus push envelope or a direct payload.
//!
//! # Envelope Flow
//!
//! ```text
//! body (serde_json::Value)
//!        │
//!        ▼
//! ┌─────────────────────────────────────┐
//! │ message.data present?               │
//! │   yes → Bus                         │
//! │     base64 → bytes → UTF-8 → JSON   │
//! │   no  → Direct                      │
//! │     object → one entry              │
//! │     array  → one slot per element   │
//! │     scalar → EnvelopeFormat error   │
//! └─────────────────────────────────────┘
//!        │
//!        ▼
//! DecodedEnvelope { kind, entries }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use ingest::{decode_envelope, encode_bus_envelope, EntrySlot, IngestConfig, SourceKind};
//! use serde_json::json;
//!
//! let entry = json!({"message": "hello", "pod": "web-0"});
//! let envelope = encode_bus_envelope(entry.as_object().unwrap());
//!
//! let decoded = decode_envelope(&envelope, &IngestConfig::default()).unwrap();
//! assert_eq!(decoded.kind, SourceKind::Bus);
//! assert_eq!(decoded.entries, vec![EntrySlot::Entry(entry.as_object().unwrap().clone())]);
//! ```
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::{json, Value};

use crate::config::IngestConfig;
use crate::error::{DecodeError, IngestError};
use crate::types::{DecodedEnvelope, EntrySlot, InnerEntry, SourceKind};

/// Classifies a body without decoding it.
///
/// A body is a bus envelope when it is an object whose `message` value is
/// itself an object containing `data`. Everything else is direct, including
/// `{"message": "plain text"}`.
pub fn detect_source(body: &Value) -> SourceKind {
    let is_bus = body
        .get("message")
        .and_then(Value::as_object)
        .is_some_and(|message| message.contains_key("data"));

    if is_bus {
        SourceKind::Bus
    } else {
        SourceKind::Direct
    }
}

/// Extracts the inner log entries from an envelope.
///
/// # Errors
///
/// - [`IngestError::Decode`] when a bus payload is not base64, not UTF-8,
///   not JSON, or not a JSON object.
/// - [`IngestError::PayloadTooLarge`] when the decoded bus payload exceeds
///   [`IngestConfig::max_decoded_bytes`].
/// - [`IngestError::EnvelopeFormat`] when a direct body is a scalar or null.
///
/// Array elements that are not objects do not fail the call; they come back
/// as [`EntrySlot::Rejected`].
pub fn decode_envelope(body: &Value, cfg: &IngestConfig) -> Result<DecodedEnvelope, IngestError> {
    match detect_source(body) {
        SourceKind::Bus => {
            let data = &body["message"]["data"];
            let entry = decode_bus_data(data, cfg)?;
            Ok(DecodedEnvelope {
                kind: SourceKind::Bus,
                entries: vec![EntrySlot::Entry(entry)],
            })
        }
        SourceKind::Direct => {
            let entries = match body {
                Value::Object(entry) => vec![EntrySlot::Entry(entry.clone())],
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .map(|(index, item)| match item {
                        Value::Object(entry) => EntrySlot::Entry(entry.clone()),
                        other => EntrySlot::Rejected {
                            index,
                            reason: format!(
                                "element is a JSON {}, expected an object",
                                json_kind(other)
                            ),
                        },
                    })
                    .collect(),
                other => {
                    return Err(IngestError::EnvelopeFormat(format!(
                        "body is a JSON {}, expected an object or an array of objects",
                        json_kind(other)
                    )))
                }
            };
            Ok(DecodedEnvelope {
                kind: SourceKind::Direct,
                entries,
            })
        }
    }
}

/// Decodes the `message.data` field of a bus envelope into an entry.
pub fn decode_bus_data(data: &Value, cfg: &IngestConfig) -> Result<InnerEntry, IngestError> {
    let encoded = data.as_str().ok_or_else(|| {
        DecodeError::Base64(format!("data is a JSON {}, expected a string", json_kind(data)))
    })?;

    let bytes = BASE64
        .decode(encoded.trim())
        .map_err(|err| DecodeError::Base64(err.to_string()))?;

    if let Some(limit) = cfg.max_decoded_bytes {
        if bytes.len() > limit {
            return Err(IngestError::PayloadTooLarge(format!(
                "decoded payload size {} exceeds limit of {limit}",
                bytes.len()
            )));
        }
    }

    let text = String::from_utf8(bytes).map_err(|err| DecodeError::Utf8(err.to_string()))?;
    let value: Value =
        serde_json::from_str(&text).map_err(|err| DecodeError::Json(err.to_string()))?;

    match value {
        Value::Object(entry) => Ok(entry),
        other => Err(DecodeError::NotAnObject(json_kind(&other)).into()),
    }
}

/// Wraps an entry in a bus push envelope.
///
/// The inverse of [`decode_envelope`] for bus messages; used by tests and
/// by clients that want to replay entries through the gateway.
pub fn encode_bus_envelope(entry: &InnerEntry) -> Value {
    let text = Value::Object(entry.clone()).to_string();
    json!({
        "message": {
            "data": BASE64.encode(text.as_bytes()),
        }
    })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
