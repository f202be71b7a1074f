use logrelay::{
    DecodeError, IngestConfig, IngestError, MemorySink, ParsedLine, PipelineError, SeverityTier,
    SourceKind, encode_bus_envelope, process_envelope,
};
use serde_json::{Value, json};

fn access_line(status: u16) -> String {
    format!(
        r#"127.0.0.1 - - [10/Oct/2023:10:30:45 +0000] "GET / HTTP/1.1" {status} 612 "-" "curl/7.0""#
    )
}

fn bus_body(inner: Value) -> Value {
    let Value::Object(entry) = inner else {
        panic!("inner entry must be an object");
    };
    encode_bus_envelope(&entry)
}

#[test]
fn bus_envelope_with_ok_line_is_normal() {
    let sink = MemorySink::new();
    let body = bus_body(json!({
        "message": access_line(200),
        "pod": "p1",
        "namespace": "ns1",
    }));

    let summary = process_envelope(&body, &IngestConfig::default(), &sink).unwrap();
    assert_eq!(summary.source, SourceKind::Bus);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.failed, 0);

    let events = sink.events();
    assert_eq!(events.len(), 1);
    let event = &events[0];
    assert_eq!(event.record.source, SourceKind::Bus);
    assert_eq!(event.record.pod.as_deref(), Some("p1"));
    assert_eq!(event.record.namespace.as_deref(), Some("ns1"));
    assert_eq!(event.record.payload, Some(json!("")));
    assert!(event.record.message.is_none());
    assert_eq!(event.status(), Some(200));
    assert_eq!(event.severity, SeverityTier::Normal);
}

#[test]
fn bus_envelope_with_503_is_server_error() {
    let sink = MemorySink::new();
    let body = bus_body(json!({
        "message": access_line(503),
        "pod": "p1",
        "namespace": "ns1",
    }));

    process_envelope(&body, &IngestConfig::default(), &sink).unwrap();
    let events = sink.events();
    assert_eq!(events[0].severity, SeverityTier::ServerError);
    assert_eq!(events[0].severity.level(), tracing::Level::ERROR);
}

#[test]
fn cloud_logging_entry_uses_text_payload_and_labels() {
    let sink = MemorySink::new();
    let body = bus_body(json!({
        "textPayload": access_line(404),
        "timestamp": "2023-10-10T10:30:45Z",
        "resource": {
            "type": "k8s_container",
            "labels": {
                "cluster_name": "edge-1",
                "namespace_name": "ingress",
                "pod_name": "nginx-5f7",
                "container_name": "nginx"
            }
        }
    }));

    process_envelope(&body, &IngestConfig::default(), &sink).unwrap();
    let event = &sink.events()[0];
    assert_eq!(event.record.cluster.as_deref(), Some("edge-1"));
    assert_eq!(event.record.container.as_deref(), Some("nginx"));
    assert_eq!(event.severity, SeverityTier::ClientError);
    // The record carries the processing time, never the entry's own timestamp.
    assert_ne!(event.record.timestamp.to_rfc3339(), "2023-10-10T10:30:45+00:00");
}

#[test]
fn unparseable_direct_message_is_still_emitted() {
    let sink = MemorySink::new();
    let body = json!({"message": "not-a-valid-access-log-line"});

    let summary = process_envelope(&body, &IngestConfig::default(), &sink).unwrap();
    assert_eq!(summary.source, SourceKind::Direct);
    assert_eq!(summary.processed, 1);

    let event = &sink.events()[0];
    assert!(event.record.parsed_access_log.is_none());
    assert_eq!(event.record.message, Some(json!("not-a-valid-access-log-line")));
    assert_eq!(event.severity, SeverityTier::Normal);
}

#[test]
fn malformed_base64_rejects_request() {
    let sink = MemorySink::new();
    let body = json!({"message": {"data": "!!!not-base64!!!"}});

    let err = process_envelope(&body, &IngestConfig::default(), &sink).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Ingest(IngestError::Decode(DecodeError::Base64(_)))
    ));
    assert_eq!(err.http_status_code(), 400);
    assert!(sink.is_empty());
}

#[test]
fn direct_array_processes_each_element() {
    let sink = MemorySink::new();
    let body = json!([
        {"message": access_line(200)},
        {"message": access_line(404)},
    ]);

    let summary = process_envelope(&body, &IngestConfig::default(), &sink).unwrap();
    assert_eq!(summary.processed, 2);

    let tiers: Vec<_> = sink.events().iter().map(|e| e.severity).collect();
    assert_eq!(tiers, vec![SeverityTier::Normal, SeverityTier::ClientError]);
}

#[test]
fn malformed_array_element_does_not_abort_siblings() {
    let sink = MemorySink::new();
    let body = json!([
        {"message": access_line(200)},
        "garbage",
        {"message": "not an access log"},
        {"message": access_line(500)},
    ]);

    let summary = process_envelope(&body, &IngestConfig::default(), &sink).unwrap();
    assert_eq!(summary.processed, 3);
    assert_eq!(summary.failed, 1);
    assert_eq!(summary.faults[0].index, 1);

    let tiers: Vec<_> = sink.events().iter().map(|e| e.severity).collect();
    assert_eq!(
        tiers,
        vec![
            SeverityTier::Normal,
            SeverityTier::Normal,
            SeverityTier::ServerError
        ]
    );
}

#[test]
fn empty_object_is_processed_as_direct() {
    let sink = MemorySink::new();
    let summary = process_envelope(&json!({}), &IngestConfig::default(), &sink).unwrap();
    assert_eq!(summary.source, SourceKind::Direct);
    assert_eq!(summary.processed, 1);

    let record = &sink.events()[0].record;
    assert!(record.message.is_none());
    assert!(record.pod.is_none());
    assert!(record.namespace.is_none());
    assert!(record.parsed_access_log.is_none());
}

#[test]
fn scalar_body_is_envelope_format_error() {
    let sink = MemorySink::new();
    let err = process_envelope(&json!("hello"), &IngestConfig::default(), &sink).unwrap_err();
    assert!(matches!(err, PipelineError::Ingest(IngestError::EnvelopeFormat(_))));
}

#[test]
fn json_log_line_passes_through_verbatim() {
    let sink = MemorySink::new();
    let line = r#"{"remote_addr":"10.0.0.1","request":"GET /api HTTP/1.1","status":"502","upstream_status":"502"}"#;
    process_envelope(&json!({"message": line}), &IngestConfig::default(), &sink).unwrap();

    let event = &sink.events()[0];
    let Some(ParsedLine::Json(fields)) = &event.record.parsed_access_log else {
        panic!("expected JSON pass-through");
    };
    assert_eq!(fields["upstream_status"], json!("502"));
    assert_eq!(event.severity, SeverityTier::ServerError);
}

#[test]
fn emitted_record_serializes_parsed_fields() {
    let sink = MemorySink::new();
    process_envelope(
        &json!({"message": access_line(200), "pod": "web"}),
        &IngestConfig::default(),
        &sink,
    )
    .unwrap();

    let value = serde_json::to_value(&sink.events()[0]).unwrap();
    assert_eq!(value["severity"], json!("normal"));
    assert_eq!(value["record"]["source"], json!("direct"));
    assert_eq!(value["record"]["parsed_access_log"]["status"], json!(200));
    assert_eq!(value["record"]["parsed_access_log"]["http_referer"], json!(""));
    assert_eq!(value["record"]["raw_entry"]["pod"], json!("web"));
}
