//! Error types for the rotating file handler

use std::io;
use std::path::PathBuf;

/// Result type for handler operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while opening, writing or rotating a log file
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error on the active stream
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failed to create the log directory
    #[error("Failed to create log directory at {path}: {source}")]
    CreateDirectory {
        /// The directory that could not be created
        path: PathBuf,
        /// The underlying error
        source: io::Error,
    },

    /// Failed to open the active log file
    #[error("Failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        source: io::Error,
    },

    /// Failed to move the active file to its archive name
    #[error("Failed to rotate {from} to {to}: {source}")]
    Rename {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    /// Another handler already owns this base path
    #[error("Log file {0} is already owned by another handler")]
    AlreadyOpen(PathBuf),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Record could not be serialized
    #[error("Failed to serialize log record: {0}")]
    Serialization(#[from] serde_json::Error),
}
