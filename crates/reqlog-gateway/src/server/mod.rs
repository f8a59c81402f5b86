//! HTTP integration
//!
//! Attach [`request_id_middleware`] to a router with [`with_request_logging`].

mod logging_middleware;

pub use logging_middleware::{incoming_request_id, request_id_middleware, REQUEST_ID_HEADER};

use axum::Router;

/// Wrap every route of `router` in the request id middleware
pub fn with_request_logging<S>(router: Router<S>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(axum::middleware::from_fn(request_id_middleware))
}
