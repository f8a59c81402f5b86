//! Size-and-time rotating file handler

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::fs::{self, File, OpenOptions};
use std::io::{Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

use super::archive;
use super::policy::{RolloverReason, RotationState};
use super::retention::{RetentionSweeper, SweepReport};
use super::schedule;
use crate::clock::{Clock, SystemClock};
use crate::domain::{LogRecord, RotationConfig};
use crate::error::{Error, Result};
use crate::format::{formatter_for, RecordFormatter};

lazy_static! {
    /// Base paths currently owned by a handler in this process
    static ref OPEN_BASE_PATHS: Mutex<HashSet<PathBuf>> = Mutex::new(HashSet::new());
}

/// What a rollover did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolloverOutcome {
    pub reason: RolloverReason,
    /// Archive the active file was moved to, `None` when there was no file
    pub archived: Option<PathBuf>,
    /// Newly scheduled time-based rollover
    pub next_rollover_at: DateTime<Utc>,
    /// Result of the retention sweep that followed
    pub sweep: SweepReport,
}

struct HandlerState {
    stream: Option<File>,
    rotation: RotationState,
}

/// Appends records to one log file and rotates it by size or schedule.
///
/// Evaluating the policy, rotating and appending all happen under one lock,
/// so concurrent writers never interleave partial lines and never race on the
/// rename. At most one handler may own a given base path per process.
///
/// Nothing executed under the lock emits `tracing` events: the handler is
/// usually the sink of those events and would deadlock on itself.
pub struct RotatingFileHandler {
    base_path: PathBuf,
    config: RotationConfig,
    formatter: Box<dyn RecordFormatter>,
    clock: Arc<dyn Clock>,
    sweeper: Option<RetentionSweeper>,
    state: Mutex<HandlerState>,
}

impl RotatingFileHandler {
    /// Create a handler using the system clock
    pub fn new(config: RotationConfig) -> Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a handler driven by `clock`.
    ///
    /// Creates the log directory, schedules the first time-based rollover
    /// from the existing file's modification time (or now), opens the file
    /// unless `delay` is set and sweeps expired archives.
    pub fn with_clock(config: RotationConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let base_path = resolve_base_path(&config.filename)?;
        register(&base_path)?;

        let now = clock.now();
        let schedule_from = fs::metadata(&base_path)
            .and_then(|m| m.modified())
            .map(DateTime::<Utc>::from)
            .unwrap_or(now);

        let rotation = RotationState {
            max_bytes: config.max_bytes,
            next_rollover_at: schedule::next_rollover(
                schedule_from,
                config.when,
                config.interval,
                config.utc,
            ),
            retention: config.retention(),
        };

        let handler = Self {
            sweeper: rotation
                .retention
                .map(|window| RetentionSweeper::for_base_path(&base_path, window)),
            formatter: formatter_for(config.format),
            base_path,
            config,
            clock,
            state: Mutex::new(HandlerState {
                stream: None,
                rotation,
            }),
        };

        // From here on a failure drops `handler`, which releases the path
        if !handler.config.delay {
            let mut state = handler.state.lock();
            handler.ensure_open(&mut state)?;
        }
        handler.sweep();

        debug!(
            path = %handler.base_path.display(),
            next_rollover_at = %handler.next_rollover_at(),
            "Opened rotating log file"
        );

        Ok(handler)
    }

    /// Absolute path of the active log file
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    /// When the next time-based rollover is due
    pub fn next_rollover_at(&self) -> DateTime<Utc> {
        self.state.lock().rotation.next_rollover_at
    }

    /// Render a record exactly as it would be appended
    pub fn format(&self, record: &LogRecord) -> Result<String> {
        self.formatter.format(record)
    }

    /// Whether appending `record` now must be preceded by a rollover.
    ///
    /// Opens the file first if it is closed. The current size is read from
    /// the file itself, so writes made by other processes are accounted for.
    pub fn should_rollover(&self, record: &LogRecord) -> Result<bool> {
        let line = self.format(record)?;
        let mut state = self.state.lock();
        Ok(self.evaluate(&mut state, line.len() as u64)?.is_some())
    }

    /// Rotate the active file now
    pub fn rollover(&self) -> Result<RolloverOutcome> {
        let mut state = self.state.lock();
        self.rollover_locked(&mut state, RolloverReason::Manual)
    }

    /// Format and append `record`, rotating first when the policy says so.
    ///
    /// Returns the rollover that preceded the write, if any.
    pub fn emit(&self, record: &LogRecord) -> Result<Option<RolloverOutcome>> {
        let line = self.format(record)?;
        self.write_line(&line)
    }

    /// Append an already formatted line (including its newline)
    pub fn write_line(&self, line: &str) -> Result<Option<RolloverOutcome>> {
        let mut state = self.state.lock();

        let outcome = match self.evaluate(&mut state, line.len() as u64)? {
            Some(reason) => Some(self.rollover_locked(&mut state, reason)?),
            None => None,
        };

        let stream = self.ensure_open(&mut state)?;
        stream.write_all(line.as_bytes())?;
        stream.flush()?;

        Ok(outcome)
    }

    /// Delete archives older than the retention window
    pub fn sweep(&self) -> SweepReport {
        let _state = self.state.lock();
        self.sweep_at(self.clock.now())
    }

    /// Flush and close the active file; the next write reopens it
    pub fn close(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(mut stream) = state.stream.take() {
            stream.flush()?;
        }
        Ok(())
    }

    fn evaluate(
        &self,
        state: &mut HandlerState,
        candidate_len: u64,
    ) -> Result<Option<RolloverReason>> {
        let file_len = {
            let stream = self.ensure_open(state)?;
            stream.seek(SeekFrom::End(0))?
        };
        Ok(state
            .rotation
            .evaluate(file_len, candidate_len, self.clock.now()))
    }

    fn rollover_locked(
        &self,
        state: &mut HandlerState,
        reason: RolloverReason,
    ) -> Result<RolloverOutcome> {
        if let Some(mut stream) = state.stream.take() {
            stream.flush()?;
        }

        let now = self.clock.now();
        let target = archive::next_free_archive_path(&self.base_path, now, self.config.utc);
        let archived = if archive::move_to_archive(&self.base_path, &target)? {
            Some(target)
        } else {
            None
        };

        if !self.config.delay {
            self.ensure_open(state)?;
        }

        state.rotation.next_rollover_at = schedule::next_rollover(
            now,
            self.config.when,
            self.config.interval,
            self.config.utc,
        );

        Ok(RolloverOutcome {
            reason,
            archived,
            next_rollover_at: state.rotation.next_rollover_at,
            sweep: self.sweep_at(now),
        })
    }

    fn sweep_at(&self, now: DateTime<Utc>) -> SweepReport {
        match &self.sweeper {
            Some(sweeper) => sweeper.sweep(SystemTime::from(now)),
            None => SweepReport::default(),
        }
    }

    fn ensure_open<'a>(&self, state: &'a mut HandlerState) -> Result<&'a mut File> {
        let stream = match state.stream.take() {
            Some(stream) => stream,
            None => open_log_file(&self.base_path)?,
        };
        Ok(state.stream.insert(stream))
    }
}

impl Drop for RotatingFileHandler {
    fn drop(&mut self) {
        if let Some(mut stream) = self.state.get_mut().stream.take() {
            let _ = stream.flush();
        }
        OPEN_BASE_PATHS.lock().remove(&self.base_path);
    }
}

impl std::fmt::Debug for RotatingFileHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RotatingFileHandler")
            .field("base_path", &self.base_path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Create the parent directory and return the canonical active file path
fn resolve_base_path(filename: &Path) -> Result<PathBuf> {
    let dir = match filename.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir).map_err(|source| Error::CreateDirectory {
        path: dir.clone(),
        source,
    })?;

    let file_name = filename
        .file_name()
        .ok_or_else(|| Error::Configuration(format!("{} does not name a file", filename.display())))?;
    let dir = dir.canonicalize().map_err(|source| Error::CreateDirectory {
        path: dir.clone(),
        source,
    })?;
    Ok(dir.join(file_name))
}

fn register(base_path: &Path) -> Result<()> {
    let mut open = OPEN_BASE_PATHS.lock();
    if !open.insert(base_path.to_path_buf()) {
        return Err(Error::AlreadyOpen(base_path.to_path_buf()));
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })
}
