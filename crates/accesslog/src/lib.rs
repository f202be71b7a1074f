//! Access-log line parsing and severity classification.
//!
//! [`parse`] turns one line of web-server access log into a [`ParsedLine`],
//! trying JSON first and the combined log format second. [`classify`] maps
//! the parsed status code onto a [`SeverityTier`].
//!
//! ```rust
//! use accesslog::{classify, parse, SeverityTier};
//!
//! let line = r#"10.0.0.7 - - [10/Oct/2023:10:30:45 +0000] "GET /health HTTP/1.1" 503 0 "-" "Go-http-client/1.1""#;
//! let parsed = parse(line);
//! assert_eq!(parsed.as_ref().and_then(|p| p.status()), Some(503));
//! assert_eq!(classify(parsed.as_ref()), SeverityTier::ServerError);
//! ```
mod parser;
mod severity;
mod types;

pub use crate::parser::{parse, parse_combined, parse_json, parse_line};
pub use crate::severity::{classify, SeverityTier};
pub use crate::types::{CombinedLogLine, ParsedLine};
