//! Reqlog Gateway
//!
//! Web-service side of request-scoped logging:
//! - `tracing` layer writing enriched records to a rotating file
//! - Subscriber initialisation from configuration
//! - axum middleware that scopes a request id around each request
//! - `exception!` for error logs that carry their trace

pub mod logging;
pub mod server;

pub use logging::{init_logging, LoggingConfig, RequestContext, RotatingFileLayer};
pub use server::{request_id_middleware, with_request_logging, REQUEST_ID_HEADER};

#[doc(hidden)]
pub mod __private {
    pub use tracing;
}
