//! Destinations for processed log events.
//!
//! The pipeline never logs records through a global; it hands every
//! [`LogEvent`] to the [`EventSink`] it was given. Production uses
//! [`TracingSink`], tests use [`MemorySink`].
use std::sync::Mutex;

use accesslog::SeverityTier;
use ingest::CanonicalLogRecord;
use serde::Serialize;
use tracing::{Level, error, info, warn};

/// One processed record together with its severity tier.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LogEvent {
    pub record: CanonicalLogRecord,
    pub severity: SeverityTier,
}

impl LogEvent {
    /// Status code the severity was derived from, if the line had one.
    pub fn status(&self) -> Option<u64> {
        self.record
            .parsed_access_log
            .as_ref()
            .and_then(|parsed| parsed.status())
    }
}

/// Receives one event per canonical record.
///
/// Implementations must not panic and must not block for long; emission
/// happens inline while the HTTP request is being served.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &LogEvent);
}

/// Emits events as structured `tracing` events and counts them with
/// `metrics`.
///
/// The level is [`SeverityTier::level`]: info for normal traffic, warn for
/// client errors, error for server errors.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: &LogEvent) {
        let record = serde_json::to_string(&event.record)
            .unwrap_or_else(|err| format!("<unserializable record: {err}>"));
        let source = event.record.source.as_str();
        let severity = event.severity.as_str();
        let status = event.status();
        let parsed = event.record.parsed_access_log.is_some();

        metrics::counter!(
            "logrelay_events_total",
            "source" => source,
            "severity" => severity
        )
        .increment(1);

        match event.severity.level() {
            Level::ERROR => {
                error!(
                    target: "logrelay::events",
                    source, severity, status, parsed, record = %record,
                    "access_log_server_error"
                )
            }
            Level::WARN => {
                warn!(
                    target: "logrelay::events",
                    source, severity, status, parsed, record = %record,
                    "access_log_client_error"
                )
            }
            _ => {
                info!(
                    target: "logrelay::events",
                    source, severity, status, parsed, record = %record,
                    "access_log_processed"
                )
            }
        }
    }
}

/// Collects events in memory. Intended for tests and local tooling.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<LogEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn events(&self) -> Vec<LogEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: &LogEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}
