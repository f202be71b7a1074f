//! Mapping of inner entries onto [`CanonicalLogRecord`].
//!
//! # Field Mapping
//!
//! | Record field | Bus entry | Direct entry |
//! |--------------|-----------|--------------|
//! | `payload` | `jsonPayload`, else `textPayload`, else `""` | - |
//! | `message` | - | `message` |
//! | `cluster` | `resource.labels.cluster_name` | - |
//! | `namespace` | `resource.labels.namespace_name`, else `namespace` | `namespace` |
//! | `pod` | `resource.labels.pod_name`, else `pod` | `pod` |
//! | `container` | `resource.labels.container_name` | - |
//!
//! Metadata strings are sanitized the same way regardless of source: control
//! characters are stripped (when configured), whitespace is trimmed, and
//! values that end up empty are treated as absent.
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::config::IngestConfig;
use crate::types::{CanonicalLogRecord, InnerEntry, SourceKind};

/// Normalizes an entry using the current instant as the record timestamp.
pub fn normalize(entry: InnerEntry, kind: SourceKind, cfg: &IngestConfig) -> CanonicalLogRecord {
    normalize_at(entry, kind, cfg, Utc::now())
}

/// Normalizes an entry with an explicit processing timestamp.
///
/// Any timestamp inside the entry is ignored; it survives only inside the
/// log text and `raw_entry`.
pub fn normalize_at(
    entry: InnerEntry,
    kind: SourceKind,
    cfg: &IngestConfig,
    now: DateTime<Utc>,
) -> CanonicalLogRecord {
    let strip = cfg.strip_control_chars;

    match kind {
        SourceKind::Bus => {
            let payload = non_null(entry.get("jsonPayload"))
                .or_else(|| non_null(entry.get("textPayload")))
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));

            let labels = entry
                .get("resource")
                .and_then(|resource| resource.get("labels"));
            let label = |key: &str| labels.and_then(|labels| labels.get(key));

            CanonicalLogRecord {
                timestamp: now,
                source: kind,
                cluster: sanitize_value(label("cluster_name"), strip),
                namespace: sanitize_value(label("namespace_name"), strip)
                    .or_else(|| sanitize_value(entry.get("namespace"), strip)),
                pod: sanitize_value(label("pod_name"), strip)
                    .or_else(|| sanitize_value(entry.get("pod"), strip)),
                container: sanitize_value(label("container_name"), strip),
                message: None,
                payload: Some(payload),
                parsed_access_log: None,
                raw_entry: entry,
            }
        }
        SourceKind::Direct => CanonicalLogRecord {
            timestamp: now,
            source: kind,
            cluster: None,
            namespace: sanitize_value(entry.get("namespace"), strip),
            pod: sanitize_value(entry.get("pod"), strip),
            container: None,
            message: non_null(entry.get("message")).cloned(),
            payload: None,
            parsed_access_log: None,
            raw_entry: entry,
        },
    }
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

/// Accepts strings as-is and renders numbers and booleans; anything else is
/// not a usable identifier.
fn sanitize_value(value: Option<&Value>, strip_control: bool) -> Option<String> {
    let raw = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => return None,
    };
    sanitize_optional_string(Some(raw), strip_control)
}

pub(crate) fn sanitize_optional_string(
    value: Option<String>,
    strip_control: bool,
) -> Option<String> {
    value.and_then(|raw| {
        let filtered = if strip_control {
            raw.chars().filter(|c| !c.is_control()).collect::<String>()
        } else {
            raw
        };
        let trimmed = filtered.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}
