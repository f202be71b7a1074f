//! Error types produced by the ingest crate.
//!
//! Every failure that can happen before a log entry reaches the normalizer is
//! described here. All errors are typed, cloneable, and comparable so callers
//! can map them to HTTP responses and assert on them in tests.
//!
//! # Error Categories
//!
//! | Error | Category | Description |
//! |-------|----------|-------------|
//! | [`EnvelopeFormat`](IngestError::EnvelopeFormat) | Envelope | Body is neither a bus nor a direct shape |
//! | [`Decode`](IngestError::Decode) | Envelope | Bus payload failed base64, UTF-8 or JSON decoding |
//! | [`PayloadTooLarge`](IngestError::PayloadTooLarge) | Limits | Decoded bus payload exceeds the configured limit |
//!
//! A line the access-log parser cannot recognize is *not* an error; that case
//! is modelled as `None` by the parser crate.
//!
//! # HTTP Status Code Mapping
//!
//! ```rust
//! use ingest::{DecodeError, IngestError};
//!
//! let err = IngestError::Decode(DecodeError::Base64("invalid byte 33".into()));
//! assert_eq!(err.http_status_code(), 400);
//!
//! let err = IngestError::PayloadTooLarge("decoded payload 2048 exceeds 1024".into());
//! assert_eq!(err.http_status_code(), 413);
//! ```
use thiserror::Error;

/// Errors raised while unwrapping an inbound envelope.
///
/// The enum is `#[non_exhaustive]`; match with a catch-all arm.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum IngestError {
    /// The body is a JSON scalar or `null`, so there is no entry to extract.
    #[error("unrecognized envelope format: {0}")]
    EnvelopeFormat(String),

    /// The bus message payload (`message.data`) could not be decoded.
    #[error("failed to decode bus message: {0}")]
    Decode(#[from] DecodeError),

    /// The decoded bus payload is larger than
    /// [`IngestConfig::max_decoded_bytes`](crate::IngestConfig::max_decoded_bytes).
    #[error("payload exceeds size limit: {0}")]
    PayloadTooLarge(String),
}

/// The individual decoding step of a bus payload that failed.
///
/// Decoding runs base64 → UTF-8 → JSON, and the variant names the first step
/// that rejected the input. The string carries the underlying error message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("invalid base64 payload: {0}")]
    Base64(String),

    #[error("invalid utf-8 payload: {0}")]
    Utf8(String),

    #[error("invalid json payload: {0}")]
    Json(String),

    /// The payload decoded to valid JSON that is not an object.
    #[error("decoded payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

impl IngestError {
    /// Returns a suggested HTTP status code for this error.
    ///
    /// - `PayloadTooLarge`: 413
    /// - All others: 400
    pub fn http_status_code(&self) -> u16 {
        match self {
            IngestError::PayloadTooLarge(_) => 413,
            _ => 400,
        }
    }

    /// Stable machine-readable code used in error response bodies.
    pub fn error_code(&self) -> &'static str {
        match self {
            IngestError::EnvelopeFormat(_) => "ENVELOPE_FORMAT_ERROR",
            IngestError::Decode(_) => "DECODE_ERROR",
            IngestError::PayloadTooLarge(_) => "PAYLOAD_TOO_LARGE",
        }
    }
}
