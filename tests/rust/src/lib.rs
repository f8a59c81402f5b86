//! Shared test utilities and fixtures for Reqlog integration tests.

pub use reqlog_core::clock::ManualClock;
pub use reqlog_core::{LogFormat, LogLevel, LogRecord, RotatingFileHandler, RotationConfig};

/// Clock helpers
pub mod clock {
    use chrono::{Timelike, Utc};
    use reqlog_core::clock::ManualClock;
    use std::sync::Arc;

    /// Manual clock starting at the current second.
    ///
    /// Starting at real time keeps freshly written archives inside the
    /// retention window during rollover sweeps.
    pub fn manual_clock() -> Arc<ManualClock> {
        let now = Utc::now();
        Arc::new(ManualClock::new(now.with_nanosecond(0).unwrap_or(now)))
    }
}

/// Test fixture utilities
pub mod fixtures {
    use super::*;
    use std::path::{Path, PathBuf};
    use std::sync::Arc;
    use tempfile::TempDir;

    /// Base file name used by the fixtures
    pub const BASE_NAME: &str = "app.log";

    /// A log directory with a handler driven by a manual clock
    pub struct TestLogDir {
        pub handler: Arc<RotatingFileHandler>,
        pub clock: Arc<ManualClock>,
        dir: PathBuf,
        _temp_dir: TempDir,
    }

    impl TestLogDir {
        /// Create a handler in a fresh temporary directory, letting the
        /// caller adjust the default configuration
        pub fn new(configure: impl FnOnce(RotationConfig) -> RotationConfig) -> Self {
            let temp_dir = TempDir::new().expect("Failed to create temp dir");
            // Handlers report canonical paths
            let dir = temp_dir
                .path()
                .canonicalize()
                .expect("Failed to resolve temp dir");
            let clock = crate::clock::manual_clock();
            let config = configure(RotationConfig::new(dir.join(BASE_NAME)));
            let handler = RotatingFileHandler::with_clock(config, clock.clone())
                .expect("Failed to create handler");
            Self {
                handler: Arc::new(handler),
                clock,
                dir,
                _temp_dir: temp_dir,
            }
        }

        pub fn path(&self) -> &Path {
            &self.dir
        }

        /// The active log file
        pub fn active(&self) -> PathBuf {
            self.handler.base_path().to_path_buf()
        }

        /// Record stamped with the clock's current time
        pub fn record(&self, message: &str) -> LogRecord {
            LogRecord::new(LogLevel::Info, "tests", message).with_timestamp(
                reqlog_core::Clock::now(self.clock.as_ref()),
            )
        }

        /// Archived files, oldest name first
        pub fn archives(&self) -> Vec<PathBuf> {
            archives_in(self.path())
        }
    }

    /// Every `app.log.*` file in `dir`, sorted by name
    pub fn archives_in(dir: &Path) -> Vec<PathBuf> {
        let prefix = format!("{}.", BASE_NAME);
        let mut found: Vec<PathBuf> = std::fs::read_dir(dir)
            .expect("Failed to list log dir")
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .map(|n| n.to_string_lossy().starts_with(&prefix))
                    .unwrap_or(false)
            })
            .collect();
        found.sort();
        found
    }

    /// Non-empty lines of a file
    pub fn read_lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .expect("Failed to read log file")
            .lines()
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect()
    }

    /// Parse a JSON-lines log file
    pub fn read_records(path: &Path) -> Vec<LogRecord> {
        read_lines(path)
            .iter()
            .map(|line| serde_json::from_str(line).expect("Invalid JSON log line"))
            .collect()
    }
}
