//! Rollover decision

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Why a rollover happened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolloverReason {
    /// The next record would push the file to `max_bytes`
    Size,
    /// The scheduled rollover time has passed
    Time,
    /// Requested directly through `RotatingFileHandler::rollover`
    Manual,
}

/// Mutable rotation parameters of one active file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationState {
    /// Size threshold in bytes, 0 disables the size check
    pub max_bytes: u64,
    /// When the next time-based rollover is due
    pub next_rollover_at: DateTime<Utc>,
    /// Age after which archives are swept, `None` keeps them
    pub retention: Option<Duration>,
}

impl RotationState {
    /// Decide whether appending `candidate_len` bytes to a file currently
    /// `file_len` bytes long must be preceded by a rollover.
    ///
    /// The size check wins over the time check.
    pub fn evaluate(
        &self,
        file_len: u64,
        candidate_len: u64,
        now: DateTime<Utc>,
    ) -> Option<RolloverReason> {
        if self.max_bytes > 0 && file_len.saturating_add(candidate_len) >= self.max_bytes {
            return Some(RolloverReason::Size);
        }
        if now >= self.next_rollover_at {
            return Some(RolloverReason::Time);
        }
        None
    }
}
