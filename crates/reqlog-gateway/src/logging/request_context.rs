//! Request Context - request ids and per-request log lines

use std::time::Instant;
use tracing::{info, info_span, Span};
use uuid::Uuid;

/// Generate a fresh request id
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Correlation data for a single request
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Request id (client supplied or generated)
    pub request_id: String,
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request path
    pub path: String,
    /// Request start time
    pub started_at: Instant,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>, method: &str, path: &str) -> Self {
        Self {
            request_id: request_id.into(),
            method: method.to_string(),
            path: path.to_string(),
            started_at: Instant::now(),
        }
    }

    /// Elapsed time since the request started
    pub fn elapsed_ms(&self) -> u64 {
        self.started_at.elapsed().as_millis() as u64
    }
}

/// Span and entry/exit lines for a request
pub struct RequestSpan;

impl RequestSpan {
    /// Span covering the request
    pub fn enter(ctx: &RequestContext) -> Span {
        info_span!(
            "request",
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.path,
        )
    }

    /// Single entry line
    pub fn log_entry(ctx: &RequestContext) {
        info!(method = %ctx.method, path = %ctx.path, "→ {} {}", ctx.method, ctx.path);
    }

    /// Single exit line
    pub fn log_exit(ctx: &RequestContext, status: u16) {
        info!(
            status,
            elapsed_ms = ctx.elapsed_ms(),
            "← {} ({}ms)",
            status,
            ctx.elapsed_ms()
        );
    }
}
