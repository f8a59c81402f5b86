//! Log rotation engine
//!
//! - `policy` - decides whether the next record needs a rollover first
//! - `schedule` - computes the next time-based rollover
//! - `archive` - archive names and the rename step
//! - `retention` - deletes archives past the retention window
//! - `handler` - the locked evaluate/rotate/append pipeline

pub mod archive;
mod handler;
pub mod policy;
pub mod retention;
pub mod schedule;

pub use handler::{RolloverOutcome, RotatingFileHandler};
pub use policy::{RolloverReason, RotationState};
pub use retention::{RetentionSweeper, SweepReport};
