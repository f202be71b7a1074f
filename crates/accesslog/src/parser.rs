//! Access-log line parsing.
//!
//! Two strategies run in order and the first one that succeeds wins:
//!
//! 1. **JSON** - a line whose first non-blank character is `{` is decoded as a
//!    JSON object and returned as-is.
//! 2. **Combined log format** -
//!    `<addr> - - [<time>] "<method> <path> <protocol>" <status> <bytes> "<referer>" "<agent>"`,
//!    anchored at the start of the line. Trailing text (e.g. `$request_time`
//!    appended by a custom `log_format`) is ignored.
//!
//! A line neither strategy recognizes yields `None`. That is an expected
//! outcome, not an error.
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use tracing::trace;

use crate::types::{parse_count, CombinedLogLine, ParsedLine};

const REFERER_PLACEHOLDER: &str = "-";

fn combined_re() -> &'static Regex {
    static COMBINED_RE: OnceLock<Regex> = OnceLock::new();
    COMBINED_RE.get_or_init(|| {
        Regex::new(
            r#"^(\S+) - - \[(.*?)\] "(\S+) (\S+) (\S+)" ([0-9]+) ([0-9]+) "(.*?)" "(.*?)""#,
        )
        .expect("valid combined log regex")
    })
}

/// Parses an optional candidate line.
///
/// `None` in, `None` out; otherwise identical to [`parse`].
pub fn parse_line(line: Option<&str>) -> Option<ParsedLine> {
    line.and_then(parse)
}

/// Parses a single access-log line.
///
/// ```rust
/// use accesslog::{parse, ParsedLine};
///
/// let line = r#"127.0.0.1 - - [10/Oct/2023:10:30:45 +0000] "GET / HTTP/1.1" 200 612 "-" "curl/7.0""#;
/// let Some(ParsedLine::Combined(parsed)) = parse(line) else { panic!("expected a match") };
/// assert_eq!(parsed.status, 200);
/// assert_eq!(parsed.http_referer, "");
///
/// assert!(parse("not an access log").is_none());
/// ```
pub fn parse(line: &str) -> Option<ParsedLine> {
    parse_json(line)
        .map(ParsedLine::Json)
        .or_else(|| parse_combined(line).map(ParsedLine::Combined))
}

/// JSON strategy. Returns `None` for lines that do not start with `{` or
/// that fail to decode as an object.
pub fn parse_json(line: &str) -> Option<Map<String, Value>> {
    if !line.trim_start().starts_with('{') {
        return None;
    }
    match serde_json::from_str::<Map<String, Value>>(line) {
        Ok(fields) => Some(fields),
        Err(err) => {
            trace!(error = %err, "json_strategy_skipped");
            None
        }
    }
}

/// Combined-log-format strategy.
///
/// Method, path and protocol are not validated; whatever non-blank tokens
/// appear in the request line are taken verbatim. A status or size too large
/// for `u64` saturates; a line matching the grammar is never dropped.
pub fn parse_combined(line: &str) -> Option<CombinedLogLine> {
    let caps = combined_re().captures(line)?;

    let status = parse_count(&caps[6])?;
    let body_bytes_sent = parse_count(&caps[7])?;
    let referer = group(&caps, 8);

    Some(CombinedLogLine {
        remote_addr: group(&caps, 1),
        time_local: group(&caps, 2),
        method: group(&caps, 3),
        path: group(&caps, 4),
        protocol: group(&caps, 5),
        status,
        body_bytes_sent,
        http_referer: if referer == REFERER_PLACEHOLDER {
            String::new()
        } else {
            referer
        },
        user_agent: group(&caps, 9),
    })
}

fn group(caps: &Captures<'_>, index: usize) -> String {
    caps.get(index)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default()
}
