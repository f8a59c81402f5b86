//! Rotation configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default size threshold (5 MiB)
pub const DEFAULT_MAX_BYTES: u64 = 5 * 1024 * 1024;

/// Default retention in days
pub const DEFAULT_KEEP_DAYS: u32 = 10;

/// Default file encoding
pub const DEFAULT_ENCODING: &str = "utf-8";

const SECONDS_PER_DAY: u64 = 24 * 60 * 60;

/// Unit of the time-based rollover schedule
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolloverWhen {
    Seconds,
    Minutes,
    Hours,
    Days,
    /// Roll at the day boundary
    #[default]
    Midnight,
}

/// How records are rendered into the file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Configuration for a size-and-time rotating log file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RotationConfig {
    /// Path of the active log file; archives live next to it
    pub filename: PathBuf,

    /// Size threshold in bytes (0 disables size-based rotation)
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,

    /// Archives older than this many days are deleted (0 keeps everything)
    #[serde(default = "default_keep_days")]
    pub keep_days: u32,

    /// Text encoding of the file
    #[serde(default = "default_encoding")]
    pub encoding: String,

    /// Time-based schedule unit
    #[serde(default)]
    pub when: RolloverWhen,

    /// Number of `when` units between scheduled rollovers
    #[serde(default = "default_interval")]
    pub interval: u32,

    /// Use UTC for archive names and day boundaries (local time otherwise)
    #[serde(default = "default_utc")]
    pub utc: bool,

    /// Defer opening the file until the first write
    #[serde(default)]
    pub delay: bool,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_BYTES
}

fn default_keep_days() -> u32 {
    DEFAULT_KEEP_DAYS
}

fn default_encoding() -> String {
    DEFAULT_ENCODING.to_string()
}

fn default_interval() -> u32 {
    1
}

fn default_utc() -> bool {
    true
}

impl RotationConfig {
    /// Configuration with defaults for everything but the file name
    pub fn new(filename: impl Into<PathBuf>) -> Self {
        Self {
            filename: filename.into(),
            max_bytes: DEFAULT_MAX_BYTES,
            keep_days: DEFAULT_KEEP_DAYS,
            encoding: default_encoding(),
            when: RolloverWhen::default(),
            interval: 1,
            utc: true,
            delay: false,
            format: LogFormat::default(),
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    pub fn with_keep_days(mut self, keep_days: u32) -> Self {
        self.keep_days = keep_days;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_schedule(mut self, when: RolloverWhen, interval: u32) -> Self {
        self.when = when;
        self.interval = interval;
        self
    }

    pub fn with_utc(mut self, utc: bool) -> Self {
        self.utc = utc;
        self
    }

    pub fn with_delay(mut self, delay: bool) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Retention window, `None` when archives are kept forever
    pub fn retention(&self) -> Option<Duration> {
        if self.keep_days == 0 {
            None
        } else {
            Some(Duration::from_secs(u64::from(self.keep_days) * SECONDS_PER_DAY))
        }
    }

    /// Check the configuration before a handler is built
    pub fn validate(&self) -> Result<()> {
        if self.filename.as_os_str().is_empty() {
            return Err(Error::Configuration("filename must not be empty".to_string()));
        }
        if self.filename.file_name().is_none() {
            return Err(Error::Configuration(format!(
                "filename {} does not name a file",
                self.filename.display()
            )));
        }
        if self.interval == 0 {
            return Err(Error::Configuration("interval must be at least 1".to_string()));
        }
        let encoding = self.encoding.to_ascii_lowercase().replace(['-', '_'], "");
        if encoding != "utf8" {
            // Records are Rust strings, so UTF-8 is the only lossless encoding
            return Err(Error::Configuration(format!(
                "unsupported encoding '{}', only utf-8 is available",
                self.encoding
            )));
        }
        Ok(())
    }
}
