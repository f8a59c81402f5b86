//! Request-scoped Logging Infrastructure
//!
//! Provides:
//! - Request ids for correlation
//! - A tracing layer that stamps request context onto every record
//! - Rotating file output with retention
//! - Error traces attached to exactly one record

mod exception;
mod init;
mod layer;
mod request_context;

pub use exception::capture_error;
pub use init::{init_logging, LoggingConfig};
pub use layer::{log_level, record_from_event, RotatingFileLayer};
pub use request_context::{generate_request_id, RequestContext, RequestSpan};
