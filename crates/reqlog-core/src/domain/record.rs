//! Log record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::context::NO_REQUEST_ID;

/// A single log event on its way to the active file (stored as JSON Lines
/// when the JSON format is selected)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Timestamp (ISO 8601)
    #[serde(rename = "ts")]
    pub timestamp: DateTime<Utc>,

    /// Log level
    #[serde(rename = "lvl")]
    pub level: LogLevel,

    /// Emitting module
    pub target: String,

    /// Message
    #[serde(rename = "msg")]
    pub message: String,

    /// Request the record was emitted under
    pub request_id: String,

    /// Error trace captured by an exception log call
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub trace: Option<String>,

    /// Extra structured fields
    #[serde(skip_serializing_if = "Map::is_empty", default)]
    pub fields: Map<String, Value>,
}

impl LogRecord {
    /// Create a record with no request attached yet
    pub fn new(level: LogLevel, target: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            level,
            target: target.into(),
            message: message.into(),
            request_id: NO_REQUEST_ID.to_string(),
            trace: None,
            fields: Map::new(),
        }
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

/// Log level
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}
