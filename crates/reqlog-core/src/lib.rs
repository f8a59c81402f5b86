//! # Reqlog Core Library
//!
//! Request-scoped log context and size/time rotating log files.
//!
//! ## Modules
//!
//! - `context` - per-execution-context request id and captured error trace
//! - `domain` - log records and rotation configuration
//! - `enricher` - pre-emit hooks that stamp context onto records
//! - `format` - rendering of records into file lines
//! - `rotation` - rollover policy, archiving and retention
//! - `clock` - time source port

pub mod clock;
pub mod context;
pub mod domain;
pub mod enricher;
pub mod error;
pub mod format;
pub mod rotation;

// Re-export commonly used types
pub use clock::{Clock, SystemClock};
pub use context::{LogContext, RequestIdGuard, TraceGuard, NO_REQUEST_ID};
pub use domain::*;
pub use enricher::{ContextEnricher, RecordEnricher};
pub use error::{Error, Result};
pub use format::{JsonFormatter, RecordFormatter, TextFormatter};
pub use rotation::{
    RetentionSweeper, RolloverOutcome, RolloverReason, RotatingFileHandler, RotationState,
    SweepReport,
};

/// Build a rotating handler the way a service sets up its main log file:
/// UTF-8, daily rotation at midnight, size cap and retention in days.
pub fn create_timed_rotating_log_handler(
    filename: impl Into<std::path::PathBuf>,
    max_bytes: u64,
    keep_days: u32,
) -> Result<RotatingFileHandler> {
    RotatingFileHandler::new(
        RotationConfig::new(filename)
            .with_max_bytes(max_bytes)
            .with_keep_days(keep_days),
    )
}
