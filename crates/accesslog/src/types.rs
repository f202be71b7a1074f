use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Fields extracted from a combined-format access-log line.
///
/// `time_local` is kept exactly as it appeared between the brackets. Status
/// and size saturate at `u64::MAX` instead of rejecting the line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CombinedLogLine {
    pub remote_addr: String,
    pub time_local: String,
    pub method: String,
    pub path: String,
    pub protocol: String,
    pub status: u64,
    pub body_bytes_sent: u64,
    /// Empty when the log carried the `-` placeholder.
    pub http_referer: String,
    pub user_agent: String,
}

/// Result of parsing one access-log line.
///
/// Lines written by a JSON `log_format` have no fixed schema, so they are kept
/// as the decoded object. Use [`ParsedLine::status`] instead of matching on the
/// variant when only the status code matters.
///
/// Serialized untagged: a `Combined` line shows up as its nine fields and a
/// `Json` line as the original object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ParsedLine {
    Combined(CombinedLogLine),
    Json(Map<String, Value>),
}

impl ParsedLine {
    /// HTTP status code of the line, if it has a usable one.
    ///
    /// For JSON lines the `status` key is read as a non-negative number
    /// (fractions truncated) or a string of ASCII digits (nginx `escape=json`
    /// formats usually quote it). Anything else is treated as absent.
    pub fn status(&self) -> Option<u64> {
        match self {
            ParsedLine::Combined(line) => Some(line.status),
            ParsedLine::Json(fields) => match fields.get("status")? {
                Value::Number(n) => n.as_u64().or_else(|| {
                    n.as_f64()
                        .filter(|f| f.is_finite() && *f >= 0.0)
                        .map(|f| f as u64)
                }),
                Value::String(s) => parse_count(s.trim()),
                _ => None,
            },
        }
    }
}

/// Parses a run of ASCII digits, saturating at `u64::MAX` on overflow.
///
/// Returns `None` for an empty string or any non-digit character.
pub(crate) fn parse_count(digits: &str) -> Option<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}
