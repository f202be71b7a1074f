//! HTTP-level tests for the ingest server, driven through the router with
//! `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use logrelay::{encode_bus_envelope, EventSink, LogEvent, MemorySink, SeverityTier};
use serde_json::{json, Value};
use server::{build_router, ServerConfig, ServerState};
use tower::ServiceExt;

fn access_line(status: u16) -> String {
    format!(
        r#"10.0.0.7 - - [10/Oct/2023:10:30:45 +0000] "GET /orders HTTP/1.1" {status} 512 "-" "Go-http-client/1.1""#
    )
}

fn bus_body(inner: Value) -> Value {
    let Value::Object(entry) = inner else {
        panic!("inner entry must be an object");
    };
    encode_bus_envelope(&entry)
}

fn test_app(config: ServerConfig) -> (Router, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let state = ServerState::with_sink(config, sink.clone());
    (build_router(Arc::new(state)), sink)
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_bus_envelope_ok_line() {
    let (app, sink) = test_app(ServerConfig::default());
    let body = bus_body(json!({"message": access_line(200), "pod": "p1", "namespace": "ns1"}));

    let (status, summary) = send(app, post_json("/", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["status"], "processed");
    assert_eq!(summary["source"], "pubsub");
    assert_eq!(summary["processed"], 1);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].status(), Some(200));
    assert_eq!(events[0].severity, SeverityTier::Normal);
    assert_eq!(events[0].record.pod.as_deref(), Some("p1"));
}

#[tokio::test]
async fn test_bus_envelope_server_error_line() {
    let (app, sink) = test_app(ServerConfig::default());
    let body = bus_body(json!({"message": access_line(503), "pod": "p1", "namespace": "ns1"}));

    let (status, _) = send(app, post_json("/api/v1/logs", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(sink.events()[0].severity, SeverityTier::ServerError);
}

#[tokio::test]
async fn test_unparsed_direct_message_is_accepted() {
    let (app, sink) = test_app(ServerConfig::default());
    let body = json!({"message": "not-a-valid-access-log-line"});

    let (status, summary) = send(app, post_json("/", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["source"], "direct");

    let events = sink.events();
    assert!(events[0].record.parsed_access_log.is_none());
    assert_eq!(events[0].severity, SeverityTier::Normal);
}

#[tokio::test]
async fn test_bad_base64_is_decode_error() {
    let (app, sink) = test_app(ServerConfig::default());
    let body = json!({"message": {"data": "!!!not-base64!!!"}});

    let (status, error) = send(app, post_json("/", &body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "DECODE_ERROR");
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_direct_array_with_bad_element() {
    let (app, sink) = test_app(ServerConfig::default());
    let body = json!([
        {"message": access_line(200)},
        42,
        {"message": access_line(404)},
    ]);

    let (status, summary) = send(app, post_json("/", &body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["processed"], 2);
    assert_eq!(summary["failed"], 1);
    assert_eq!(summary["faults"][0]["index"], 1);

    let tiers: Vec<_> = sink.events().iter().map(|e| e.severity).collect();
    assert_eq!(tiers, vec![SeverityTier::Normal, SeverityTier::ClientError]);
}

#[tokio::test]
async fn test_empty_object_is_processed() {
    let (app, sink) = test_app(ServerConfig::default());

    let (status, summary) = send(app, post_json("/", &json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["processed"], 1);
    assert!(sink.events()[0].record.message.is_none());
}

#[tokio::test]
async fn test_scalar_body_is_envelope_error() {
    let (app, _) = test_app(ServerConfig::default());

    let (status, error) = send(app, post_json("/", &json!(17))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "ENVELOPE_FORMAT_ERROR");
}

#[tokio::test]
async fn test_non_json_content_type_rejected() {
    let (app, sink) = test_app(ServerConfig::default());
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(access_line(200)))
        .unwrap();

    let (status, error) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "UNSUPPORTED_CONTENT_TYPE");
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let (app, _) = test_app(ServerConfig::default());
    let request = Request::builder()
        .method("POST")
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"message\": "))
        .unwrap();

    let (status, error) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_body_over_limit_is_413() {
    let config = ServerConfig {
        max_body_size_mb: 1,
        ..ServerConfig::default()
    };
    let (app, sink) = test_app(config);
    let big = "x".repeat(2 * 1024 * 1024);
    let body = json!({"message": big});

    let (status, error) = send(app, post_json("/", &body)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert!(sink.is_empty());
}

#[tokio::test]
async fn test_decoded_payload_over_limit_is_413() {
    let mut config = ServerConfig::default();
    config.ingest.max_decoded_bytes = Some(16);
    let (app, _) = test_app(config);
    let body = bus_body(json!({"message": access_line(200)}));

    let (status, error) = send(app, post_json("/", &body)).await;
    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(error["error"]["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_health_endpoints() {
    for path in ["/healthz", "/health"] {
        let (app, _) = test_app(ServerConfig::default());
        let request = Request::builder().uri(path).body(Body::empty()).unwrap();

        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::OK, "{path}");
        assert_eq!(body["status"], "healthy");
        assert!(body["timestamp"].is_string());
    }
}

#[tokio::test]
async fn test_api_info() {
    let (app, _) = test_app(ServerConfig::default());
    let request = Request::builder().uri("/").body(Body::empty()).unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "logrelay");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_seconds"].is_u64());
    let endpoints = body["endpoints"].as_array().unwrap();
    assert!(endpoints.contains(&json!("POST /api/v1/logs")));
    assert!(endpoints.contains(&json!("GET /metrics")));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (app, _) = test_app(ServerConfig::default());
    let request = Request::builder()
        .uri("/nope")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_metrics_route_follows_config() {
    let (app, _) = test_app(ServerConfig::default());
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/plain"));

    let config = ServerConfig {
        metrics_enabled: false,
        ..ServerConfig::default()
    };
    let (app, _) = test_app(config);
    let request = Request::builder().uri("/metrics").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_echoed_or_generated() {
    let (app, _) = test_app(ServerConfig::default());
    let request = Request::builder()
        .uri("/healthz")
        .header("x-request-id", "trace-123")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-123");

    let (app, _) = test_app(ServerConfig::default());
    let request = Request::builder().uri("/healthz").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 36);
}

struct PanickingSink;

impl EventSink for PanickingSink {
    fn emit(&self, _event: &LogEvent) {
        panic!("sink exploded");
    }
}

#[tokio::test]
async fn test_handler_panic_becomes_500() {
    let state = ServerState::with_sink(ServerConfig::default(), Arc::new(PanickingSink));
    let app = build_router(Arc::new(state));
    let body = json!({"message": access_line(200)});

    let (status, error) = send(app, post_json("/", &body)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error["error"]["code"], "INTERNAL_ERROR");
}
