//! Error logging with the trace attached to a single record

use reqlog_core::TraceGuard;
use std::fmt;

/// Capture the `Debug` rendering of `error` for the current execution
/// context until the returned guard is dropped.
///
/// For `anyhow::Error` this is the message followed by the cause chain (and
/// the backtrace when one was captured).
pub fn capture_error<E>(error: &E) -> TraceGuard
where
    E: fmt::Debug + ?Sized,
{
    TraceGuard::capture(format!("{:?}", error))
}

/// Log an error event with the error's trace attached to that record only.
///
/// ```ignore
/// if let Err(e) = save_order(&order).await {
///     reqlog_gateway::exception!(e, order_id = %order.id, "Failed to save order");
/// }
/// ```
#[macro_export]
macro_rules! exception {
    ($err:expr, $($arg:tt)+) => {{
        let _trace = $crate::logging::capture_error(&$err);
        $crate::__private::tracing::error!($($arg)+);
    }};
}
