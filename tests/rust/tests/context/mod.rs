//! Context store integration tests
//!
//! Request ids must stay with the task or thread that set them, including
//! when many requests are in flight on a multi-threaded runtime.

use futures::future::join_all;
use pretty_assertions::assert_eq;
use reqlog_core::context::{self, RequestIdGuard};
use reqlog_core::{LogFormat, NO_REQUEST_ID};
use reqlog_gateway::RotatingFileLayer;
use std::collections::HashMap;
use std::time::Duration;
use tests::fixtures::{read_records, TestLogDir};
use tracing_subscriber::layer::SubscriberExt;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_tasks_keep_their_own_request_id() {
    let tasks = (0..32).map(|i| {
        tokio::spawn(context::scope(async move {
            let id = format!("req-{}", i);
            let _guard = RequestIdGuard::set(id.clone());

            let mut seen = Vec::new();
            for step in 0..5u64 {
                // Yield so tasks interleave and migrate between workers
                tokio::time::sleep(Duration::from_millis((i + step) % 3)).await;
                seen.push(context::request_id());
            }
            (id, seen)
        }))
    });

    for result in join_all(tasks).await {
        let (id, seen) = result.unwrap();
        assert!(seen.iter().all(|s| *s == id), "{} saw {:?}", id, seen);
    }
}

#[tokio::test]
async fn scope_starts_empty_and_does_not_leak() {
    context::scope(async {
        assert_eq!(context::request_id(), NO_REQUEST_ID);
        context::set_request_id("inner");
        assert_eq!(context::request_id(), "inner");
    })
    .await;

    context::scope(async {
        assert_eq!(context::request_id(), NO_REQUEST_ID);
    })
    .await;
}

#[test]
fn threads_keep_their_own_request_id() {
    let threads: Vec<_> = (0..8)
        .map(|i| {
            std::thread::spawn(move || {
                let id = format!("thread-{}", i);
                let _guard = RequestIdGuard::set(id.clone());
                for _ in 0..100 {
                    assert_eq!(context::request_id(), id);
                    std::thread::yield_now();
                }
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }
}

#[test]
fn cleared_context_reports_sentinel() {
    std::thread::spawn(|| {
        context::set_request_id("abc");
        context::set_captured_trace("boom");
        context::clear_request_id();
        context::clear_captured_trace();

        assert_eq!(context::request_id(), NO_REQUEST_ID);
        assert_eq!(context::captured_trace(), None);
    })
    .join()
    .unwrap();
}

#[test]
fn records_from_concurrent_threads_carry_their_ids() {
    let dir = TestLogDir::new(|c| c.with_format(LogFormat::Json));
    let layer = RotatingFileLayer::new(dir.handler.clone());
    let dispatch = tracing::Dispatch::new(tracing_subscriber::registry().with(layer));

    let threads: Vec<_> = (0..4)
        .map(|t| {
            let dispatch = dispatch.clone();
            std::thread::spawn(move || {
                tracing::dispatcher::with_default(&dispatch, || {
                    let _guard = RequestIdGuard::set(format!("req-{}", t));
                    for i in 0..25 {
                        tracing::info!(owner = t, seq = i, "working");
                    }
                });
                tracing::dispatcher::with_default(&dispatch, || {
                    tracing::info!(owner = t, "after request");
                });
            })
        })
        .collect();
    for thread in threads {
        thread.join().unwrap();
    }

    let records = read_records(&dir.active());
    assert_eq!(records.len(), 4 * 26);

    let mut per_owner: HashMap<u64, usize> = HashMap::new();
    for record in &records {
        let owner = record.fields["owner"].as_u64().unwrap();
        if record.message == "after request" {
            assert_eq!(record.request_id, NO_REQUEST_ID);
        } else {
            assert_eq!(record.request_id, format!("req-{}", owner));
            *per_owner.entry(owner).or_default() += 1;
        }
    }
    assert_eq!(per_owner.len(), 4);
    assert!(per_owner.values().all(|count| *count == 25));
}
