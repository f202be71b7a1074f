//! Workspace umbrella crate for logrelay, the access-log ingestion gateway.
//!
//! This crate stitches envelope decoding, normalization, access-log parsing
//! and severity classification into one call, [`process_envelope`], and hands
//! every resulting [`LogEvent`] to an injected [`EventSink`].
//!
//! ```
//! use logrelay::{process_envelope, IngestConfig, MemorySink, SeverityTier};
//! use serde_json::json;
//!
//! let sink = MemorySink::new();
//! let body = json!({
//!     "message": r#"10.1.2.3 - - [10/Oct/2023:10:30:45 +0000] "GET /missing HTTP/1.1" 404 153 "-" "curl/8.4""#,
//!     "pod": "nginx-0",
//! });
//!
//! let summary = process_envelope(&body, &IngestConfig::default(), &sink).unwrap();
//! assert_eq!(summary.processed, 1);
//! assert_eq!(sink.events()[0].severity, SeverityTier::ClientError);
//! ```

mod sink;

pub use crate::sink::{EventSink, LogEvent, MemorySink, TracingSink};
pub use accesslog::{CombinedLogLine, ParsedLine, SeverityTier, classify, parse, parse_line};
pub use ingest::{
    CanonicalLogRecord, DecodeError, DecodedEnvelope, EntrySlot, IngestConfig, IngestError,
    InnerEntry, SourceKind, decode_envelope, encode_bus_envelope, normalize,
};

use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt;
use std::time::Instant;
use tracing::{Level, info, warn};

/// Errors that abort processing of a whole request.
///
/// Failures confined to one element of a direct array are reported as
/// [`ElementFault`]s in the summary instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    Ingest(IngestError),
}

impl PipelineError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            PipelineError::Ingest(err) => err.http_status_code(),
        }
    }
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::Ingest(err) => write!(f, "ingest failure: {err}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PipelineError::Ingest(err) => Some(err),
        }
    }
}

impl From<IngestError> for PipelineError {
    fn from(value: IngestError) -> Self {
        PipelineError::Ingest(value)
    }
}

/// An element of a direct array that could not be processed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ElementFault {
    pub index: usize,
    pub reason: String,
}

/// Outcome of one request, returned to the HTTP caller.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IngestSummary {
    pub status: &'static str,
    pub source: SourceKind,
    /// Entries that were normalized and emitted.
    pub processed: usize,
    pub failed: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<ElementFault>,
}

/// Runs one inner entry through normalize → parse → classify.
pub fn process_entry(entry: InnerEntry, kind: SourceKind, cfg: &IngestConfig) -> LogEvent {
    let mut record = normalize(entry, kind, cfg);
    record.parsed_access_log = parse_line(record.candidate_line());
    let severity = record.severity();
    LogEvent { record, severity }
}

/// Processes a request body end-to-end and emits one event per entry.
///
/// Envelope-level failures (bad base64, scalar body, ...) abort the request
/// with a [`PipelineError`]. Elements of a direct array are independent: a
/// rejected element is recorded as an [`ElementFault`] and the rest are still
/// processed and emitted.
pub fn process_envelope(
    body: &Value,
    cfg: &IngestConfig,
    sink: &dyn EventSink,
) -> Result<IngestSummary, PipelineError> {
    let start = Instant::now();
    let decoded = ingest::unwrap_envelope(body, cfg)?;
    let kind = decoded.kind;

    let span = tracing::span!(Level::INFO, "pipeline.envelope", source = %kind);
    let _guard = span.enter();

    let mut processed = 0;
    let mut faults = Vec::new();

    for slot in decoded.entries {
        match slot {
            EntrySlot::Entry(entry) => {
                let event = process_entry(entry, kind, cfg);
                sink.emit(&event);
                processed += 1;
            }
            EntrySlot::Rejected { index, reason } => {
                warn!(index, reason = %reason, "element_rejected");
                faults.push(ElementFault { index, reason });
            }
        }
    }

    let elapsed_micros = start.elapsed().as_micros();
    info!(
        processed,
        failed = faults.len(),
        elapsed_micros,
        "envelope_processed"
    );

    Ok(IngestSummary {
        status: "processed",
        source: kind,
        processed,
        failed: faults.len(),
        faults,
    })
}
