//! Archive naming and the rename step of a rollover

use chrono::{DateTime, Local, Utc};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Timestamp suffix of archived files: `<base>.<YYYYMMDD_HHMMSS>`
pub const ARCHIVE_SUFFIX_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Timestamp suffix for a rollover at `now`
pub fn archive_suffix(now: DateTime<Utc>, utc: bool) -> String {
    if utc {
        now.format(ARCHIVE_SUFFIX_FORMAT).to_string()
    } else {
        now.with_timezone(&Local)
            .format(ARCHIVE_SUFFIX_FORMAT)
            .to_string()
    }
}

/// `<base>.<suffix>` without collision handling
pub fn archive_path(base: &Path, now: DateTime<Utc>, utc: bool) -> PathBuf {
    with_suffix(base, &archive_suffix(now, utc))
}

/// First free archive name for a rollover at `now`.
///
/// Sub-second rollovers produce the same timestamp, so `.1`, `.2`, ... are
/// appended until nothing exists under the name.
pub fn next_free_archive_path(base: &Path, now: DateTime<Utc>, utc: bool) -> PathBuf {
    let candidate = archive_path(base, now, utc);
    if !candidate.exists() {
        return candidate;
    }

    let mut counter: u32 = 1;
    loop {
        let numbered = with_suffix(&candidate, &counter.to_string());
        if !numbered.exists() {
            return numbered;
        }
        counter += 1;
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Rename the active file to `archive`.
///
/// Returns `Ok(false)` when there is no active file to move. If the rename
/// fails while the destination exists, the destination is removed and the
/// rename retried once. Any other failure is returned as [`Error::Rename`].
pub fn move_to_archive(active: &Path, archive: &Path) -> Result<bool> {
    let first = match fs::rename(active, archive) {
        Ok(()) => return Ok(true),
        Err(e) => e,
    };

    if first.kind() == io::ErrorKind::NotFound && !active.exists() {
        return Ok(false);
    }

    if archive.exists() {
        fs::remove_file(archive).map_err(|source| rename_error(active, archive, source))?;
        fs::rename(active, archive).map_err(|source| rename_error(active, archive, source))?;
        return Ok(true);
    }

    Err(rename_error(active, archive, first))
}

fn rename_error(from: &Path, to: &Path, source: io::Error) -> Error {
    Error::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    }
}
