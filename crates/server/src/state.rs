use crate::config::ServerConfig;
use logrelay::{EventSink, TracingSink};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Where processed log events go
    pub sink: Arc<dyn EventSink>,

    /// Renders the Prometheus text exposition, if a recorder was installed
    pub metrics: Option<PrometheusHandle>,
}

impl ServerState {
    /// State for production: events go to `tracing`, no metrics handle.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_sink(config, Arc::new(TracingSink))
    }

    /// State with a caller-supplied sink, used by tests and embedders.
    pub fn with_sink(config: ServerConfig, sink: Arc<dyn EventSink>) -> Self {
        Self {
            config: Arc::new(config),
            sink,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

/// Server metadata for the index endpoint
#[derive(Debug, serde::Serialize)]
pub struct ServerMetadata {
    pub name: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub endpoints: &'static [&'static str],
}

impl ServerMetadata {
    pub fn current(uptime_seconds: u64) -> Self {
        Self {
            name: "logrelay",
            version: env!("CARGO_PKG_VERSION"),
            uptime_seconds,
            endpoints: &[
                "POST /",
                "POST /api/v1/logs",
                "GET /healthz",
                "GET /health",
                "GET /metrics",
            ],
        }
    }
}
