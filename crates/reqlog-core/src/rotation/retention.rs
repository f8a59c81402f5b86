//! Deletion of expired archives
//!
//! Every sweep lists the whole log directory, so its cost grows with the
//! number of entries in that directory. That is fine for a directory that
//! only holds one service's logs; put busy handlers in their own directory.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Outcome of one sweep
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Archives that were removed
    pub deleted: Vec<PathBuf>,
    /// Entries that could not be inspected or removed, with the reason
    pub failed: Vec<(PathBuf, String)>,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.failed.is_empty()
    }
}

/// Removes `<base>.*` files older than the retention window
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    dir: PathBuf,
    prefix: OsString,
    window: Duration,
}

impl RetentionSweeper {
    /// Sweeper for the archives of `base_path`
    pub fn for_base_path(base_path: &Path, window: Duration) -> Self {
        let dir = match base_path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut prefix = base_path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        prefix.push(".");

        Self {
            dir,
            prefix,
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Delete every archive whose modification time is more than the window
    /// before `now`.
    ///
    /// Failures are printed to stderr and collected in the report; they never
    /// stop the sweep. The active file does not carry the `<base>.` prefix and
    /// is therefore never touched.
    pub fn sweep(&self, now: SystemTime) -> SweepReport {
        self.sweep_with(now, |path| fs::remove_file(path))
    }

    fn sweep_with(
        &self,
        now: SystemTime,
        mut remove: impl FnMut(&Path) -> io::Result<()>,
    ) -> SweepReport {
        let mut report = SweepReport::default();

        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) => {
                eprintln!("Error listing log directory {}: {}", self.dir.display(), e);
                report.failed.push((self.dir.clone(), e.to_string()));
                return report;
            }
        };

        for entry in entries.flatten() {
            let name = entry.file_name();
            if !name
                .as_encoded_bytes()
                .starts_with(self.prefix.as_encoded_bytes())
            {
                continue;
            }

            let path = entry.path();
            let modified = match entry.metadata().and_then(|m| {
                if m.is_file() {
                    m.modified().map(Some)
                } else {
                    Ok(None)
                }
            }) {
                Ok(Some(modified)) => modified,
                Ok(None) => continue,
                Err(e) => {
                    eprintln!("Error reading {}: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                    continue;
                }
            };

            let expired = now
                .duration_since(modified)
                .map(|age| age > self.window)
                .unwrap_or(false);
            if !expired {
                continue;
            }

            match remove(path.as_path()) {
                Ok(()) => {
                    eprintln!("Deleted old log file: {}", path.display());
                    report.deleted.push(path);
                }
                Err(e) => {
                    eprintln!("Error deleting {}: {}", path.display(), e);
                    report.failed.push((path, e.to_string()));
                }
            }
        }

        report
    }
}
