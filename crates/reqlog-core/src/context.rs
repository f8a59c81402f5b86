//! Request Context Store
//!
//! Per-execution-context slot holding the current request id and an optional
//! captured error trace. An execution context is the tokio task running inside
//! [`scope`] (or the closure inside [`sync_scope`]); outside of a scope it is
//! the current OS thread.
//!
//! Nothing here is shared between contexts, so no locking is involved. A
//! thread that is reused without clearing its slot keeps the previous value;
//! request handling should go through [`scope`] or [`RequestIdGuard`] so the
//! slot is always released.

use std::cell::RefCell;
use std::future::Future;

/// Returned by [`request_id`] when no request is in flight
pub const NO_REQUEST_ID: &str = "no_request_id";

/// Values carried by one execution context
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogContext {
    /// Request id set by the middleware, if any
    pub request_id: Option<String>,
    /// Error trace captured for the duration of a single exception log call
    pub captured_trace: Option<String>,
}

impl LogContext {
    /// Request id, or the sentinel when unset
    pub fn request_id_or_default(&self) -> &str {
        self.request_id.as_deref().unwrap_or(NO_REQUEST_ID)
    }
}

thread_local! {
    static THREAD_CONTEXT: RefCell<LogContext> = RefCell::new(LogContext::default());
}

tokio::task_local! {
    static TASK_CONTEXT: RefCell<LogContext>;
}

/// Run `f` against the calling execution context's slot
fn with_current<R>(f: impl FnOnce(&mut LogContext) -> R) -> R {
    if TASK_CONTEXT.try_with(|_| ()).is_ok() {
        TASK_CONTEXT.with(|cell| f(&mut cell.borrow_mut()))
    } else {
        THREAD_CONTEXT.with(|cell| f(&mut cell.borrow_mut()))
    }
}

/// Set the request id for the current execution context
pub fn set_request_id(id: impl Into<String>) {
    let id = id.into();
    with_current(|ctx| ctx.request_id = Some(id));
}

/// Clear the request id for the current execution context
pub fn clear_request_id() {
    with_current(|ctx| ctx.request_id = None);
}

/// Current request id, or [`NO_REQUEST_ID`]
pub fn request_id() -> String {
    with_current(|ctx| ctx.request_id_or_default().to_string())
}

/// Store an error trace for the current execution context
pub fn set_captured_trace(trace: impl Into<String>) {
    let trace = trace.into();
    with_current(|ctx| ctx.captured_trace = Some(trace));
}

/// Drop the captured error trace
pub fn clear_captured_trace() {
    with_current(|ctx| ctx.captured_trace = None);
}

/// Currently captured error trace, if any
pub fn captured_trace() -> Option<String> {
    with_current(|ctx| ctx.captured_trace.clone())
}

/// Copy of the whole context
pub fn snapshot() -> LogContext {
    with_current(|ctx| ctx.clone())
}

/// Run a future with its own, initially empty, context.
///
/// Values set inside the future are invisible to other tasks and vanish when
/// the future completes, even if the task migrates between worker threads.
pub async fn scope<F>(future: F) -> F::Output
where
    F: Future,
{
    TASK_CONTEXT
        .scope(RefCell::new(LogContext::default()), future)
        .await
}

/// Synchronous counterpart of [`scope`]
pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
    TASK_CONTEXT.sync_scope(RefCell::new(LogContext::default()), f)
}

/// Sets the request id on creation and clears it when dropped
#[must_use = "the request id is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct RequestIdGuard {
    _private: (),
}

impl RequestIdGuard {
    pub fn set(id: impl Into<String>) -> Self {
        set_request_id(id);
        Self { _private: () }
    }
}

impl Drop for RequestIdGuard {
    fn drop(&mut self) {
        clear_request_id();
    }
}

/// Holds a captured error trace for the lifetime of the guard
#[must_use = "the trace is cleared as soon as the guard is dropped"]
#[derive(Debug)]
pub struct TraceGuard {
    _private: (),
}

impl TraceGuard {
    pub fn capture(trace: impl Into<String>) -> Self {
        set_captured_trace(trace);
        Self { _private: () }
    }
}

impl Drop for TraceGuard {
    fn drop(&mut self) {
        clear_captured_trace();
    }
}
