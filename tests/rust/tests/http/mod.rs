//! HTTP middleware integration tests
//!
//! Requests served through the request id middleware with the rotating file
//! layer installed; every record logged while serving a request must carry
//! that request's id.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    routing::get,
    Router,
};
use pretty_assertions::assert_eq;
use reqlog_core::{LogFormat, LogLevel, LogRecord, NO_REQUEST_ID};
use reqlog_gateway::{with_request_logging, RotatingFileLayer, REQUEST_ID_HEADER};
use tests::fixtures::{read_records, TestLogDir};
use tower::ServiceExt;
use tracing_subscriber::layer::SubscriberExt;

async fn list_orders() -> &'static str {
    tracing::info!(count = 2, "listing orders");
    helper();
    "ok"
}

fn helper() {
    tracing::debug!("helper called");
}

async fn failing_order() -> StatusCode {
    let err = anyhow::anyhow!("connection reset").context("Failed to load order");
    reqlog_gateway::exception!(err, order_id = 7, "order lookup failed");
    StatusCode::INTERNAL_SERVER_ERROR
}

fn app() -> Router {
    with_request_logging(
        Router::new()
            .route("/orders", get(list_orders))
            .route("/orders/7", get(failing_order)),
    )
}

fn request(path: &str, request_id: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(path);
    if let Some(id) = request_id {
        builder = builder.header(REQUEST_ID_HEADER, id);
    }
    builder.body(Body::empty()).unwrap()
}

/// Log directory with the file layer installed on the current thread
fn logged() -> (TestLogDir, tracing::subscriber::DefaultGuard) {
    let dir = TestLogDir::new(|c| c.with_format(LogFormat::Json));
    let subscriber =
        tracing_subscriber::registry().with(RotatingFileLayer::new(dir.handler.clone()));
    let guard = tracing::subscriber::set_default(subscriber);
    (dir, guard)
}

fn records_for<'a>(records: &'a [LogRecord], request_id: &str) -> Vec<&'a LogRecord> {
    records
        .iter()
        .filter(|record| record.request_id == request_id)
        .collect()
}

#[tokio::test]
async fn handler_records_carry_client_request_id() {
    let (dir, _guard) = logged();

    let response = app()
        .oneshot(request("/orders", Some("client-abc")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[REQUEST_ID_HEADER], "client-abc");

    tracing::info!("between requests");

    let records = read_records(&dir.active());
    let messages: Vec<&str> = records.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "→ GET /orders",
            "listing orders",
            "helper called",
            messages[3],
            "between requests",
        ]
    );
    assert!(messages[3].starts_with("← 200"));

    assert_eq!(records_for(&records, "client-abc").len(), 4);
    assert_eq!(records[4].request_id, NO_REQUEST_ID);
    assert_eq!(records[1].fields["count"], 2);
}

#[tokio::test]
async fn generated_request_id_is_logged_and_echoed() {
    let (dir, _guard) = logged();

    let response = app().oneshot(request("/orders", None)).await.unwrap();
    let echoed = response.headers()[REQUEST_ID_HEADER]
        .to_str()
        .unwrap()
        .to_string();
    assert_eq!(echoed.len(), 36);

    let records = read_records(&dir.active());
    assert_eq!(records.len(), 4);
    assert!(records.iter().all(|r| r.request_id == echoed));
}

#[tokio::test]
async fn sequential_requests_do_not_share_ids() {
    let (dir, _guard) = logged();

    for id in ["first", "second", "third"] {
        app().oneshot(request("/orders", Some(id))).await.unwrap();
    }

    let records = read_records(&dir.active());
    for id in ["first", "second", "third"] {
        let own = records_for(&records, id);
        assert_eq!(own.len(), 4);
        assert!(own.iter().any(|r| r.message == "listing orders"));
    }
    assert!(records_for(&records, NO_REQUEST_ID).is_empty());
}

#[tokio::test]
async fn exception_record_carries_trace_and_request_id() {
    let (dir, _guard) = logged();

    let response = app()
        .oneshot(request("/orders/7", Some("req-err")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let records = read_records(&dir.active());
    let with_trace: Vec<&LogRecord> = records.iter().filter(|r| r.trace.is_some()).collect();
    assert_eq!(with_trace.len(), 1);

    let failure = with_trace[0];
    assert_eq!(failure.level, LogLevel::Error);
    assert_eq!(failure.message, "order lookup failed");
    assert_eq!(failure.request_id, "req-err");
    assert_eq!(failure.fields["order_id"], 7);
    let trace = failure.trace.as_deref().unwrap();
    assert!(trace.contains("Failed to load order"));
    assert!(trace.contains("connection reset"));

    // The exit line follows the failure without a trace
    assert!(records.last().unwrap().message.starts_with("← 500"));
}
