//! Rendering of records into file lines

use serde_json::Value;

use crate::domain::{LogFormat, LogRecord};
use crate::error::Result;

/// Turns a record into the exact text appended to the file
pub trait RecordFormatter: Send + Sync {
    /// Render `record`, including the trailing newline
    fn format(&self, record: &LogRecord) -> Result<String>;
}

/// `2026-10-19T08:15:02.113Z INFO [req-1] api::orders: created id=7`
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFormatter;

impl RecordFormatter for TextFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let mut line = format!(
            "{} {:<5} [{}] {}: {}",
            record.timestamp.format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            record.level.as_str().to_uppercase(),
            record.request_id,
            record.target,
            record.message
        );
        for (key, value) in &record.fields {
            line.push(' ');
            line.push_str(key);
            line.push('=');
            match value {
                Value::String(s) => line.push_str(s),
                other => line.push_str(&other.to_string()),
            }
        }
        if let Some(trace) = &record.trace {
            line.push('\n');
            line.push_str(trace.trim_end());
        }
        line.push('\n');
        Ok(line)
    }
}

/// One JSON object per line
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFormatter;

impl RecordFormatter for JsonFormatter {
    fn format(&self, record: &LogRecord) -> Result<String> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');
        Ok(line)
    }
}

/// Formatter for a configured [`LogFormat`]
pub fn formatter_for(format: LogFormat) -> Box<dyn RecordFormatter> {
    match format {
        LogFormat::Text => Box::new(TextFormatter),
        LogFormat::Json => Box::new(JsonFormatter),
    }
}
