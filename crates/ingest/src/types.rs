//! Core data model types for the ingest crate.
//!
//! ```text
//! RawEnvelope (serde_json::Value)
//!
//!         ↓ decode_envelope()
//!
//! DecodedEnvelope
//! ├── kind: SourceKind (Bus | Direct)
//! └── entries: Vec<EntrySlot>
//!     ├── Entry(InnerEntry)
//!     └── Rejected { index, reason }
//!
//!         ↓ normalize()
//!
//! CanonicalLogRecord
//! ├── timestamp: DateTime<Utc> (processing instant)
//! ├── source: SourceKind
//! ├── cluster / namespace / pod / container: Option<String>
//! ├── message: Option<Value> (direct only)
//! ├── payload: Option<Value> (bus only)
//! ├── parsed_access_log: Option<ParsedLine>
//! └── raw_entry: InnerEntry
//! ```
use accesslog::{ParsedLine, SeverityTier};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single log entry extracted from an envelope.
///
/// Bus envelopes carry a Cloud Logging `LogEntry`; direct envelopes carry the
/// sidecar shape (`message`, `pod`, `namespace`). Both are plain JSON objects
/// until normalization picks the fields it understands.
pub type InnerEntry = Map<String, Value>;

/// Which transport envelope a request arrived in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// Message-bus push envelope: `{"message": {"data": "<base64 json>"}}`.
    #[serde(rename = "pubsub")]
    Bus,
    /// JSON sent straight to the gateway, either one object or an array.
    #[serde(rename = "direct")]
    Direct,
}

impl SourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            SourceKind::Bus => "pubsub",
            SourceKind::Direct => "direct",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One position in a decoded envelope.
///
/// Direct arrays may mix objects with values that cannot be log entries.
/// Those are kept as `Rejected` so the caller can report them without
/// dropping their siblings.
#[derive(Debug, Clone, PartialEq)]
pub enum EntrySlot {
    Entry(InnerEntry),
    Rejected { index: usize, reason: String },
}

/// Result of [`decode_envelope`](crate::decode_envelope).
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedEnvelope {
    pub kind: SourceKind,
    pub entries: Vec<EntrySlot>,
}

impl DecodedEnvelope {
    /// Number of slots that hold a usable entry.
    pub fn entry_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|slot| matches!(slot, EntrySlot::Entry(_)))
            .count()
    }
}

/// Source-agnostic representation of one access-log event.
///
/// Exactly one of `message` (direct) and `payload` (bus) is populated.
/// `parsed_access_log` is filled in by the pipeline only when the candidate
/// line could be parsed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalLogRecord {
    /// When the gateway processed the entry, not when the request was served.
    pub timestamp: DateTime<Utc>,
    pub source: SourceKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pod: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub container: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parsed_access_log: Option<ParsedLine>,
    #[serde(default)]
    pub raw_entry: InnerEntry,
}

impl CanonicalLogRecord {
    /// The text the access-log parser should look at, if any.
    ///
    /// - Direct: `message` when it is a string.
    /// - Bus: `payload` when it is a non-empty string (`textPayload`), else a
    ///   string `message` inside an object payload (`jsonPayload.message`),
    ///   else a string `message` at the top level of the inner entry.
    pub fn candidate_line(&self) -> Option<&str> {
        match self.source {
            SourceKind::Direct => self.message.as_ref().and_then(Value::as_str),
            SourceKind::Bus => match self.payload.as_ref() {
                Some(Value::String(text)) if !text.is_empty() => Some(text.as_str()),
                Some(Value::Object(fields)) => fields
                    .get("message")
                    .and_then(Value::as_str)
                    .or_else(|| self.raw_message()),
                _ => self.raw_message(),
            },
        }
    }

    /// Severity of this record, derived from the parsed status code.
    pub fn severity(&self) -> SeverityTier {
        accesslog::classify(self.parsed_access_log.as_ref())
    }

    fn raw_message(&self) -> Option<&str> {
        self.raw_entry.get("message").and_then(Value::as_str)
    }
}
