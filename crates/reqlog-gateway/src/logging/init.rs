//! Subscriber setup for a service

use anyhow::{Context, Result};
use reqlog_core::{LogFormat, RotatingFileHandler, RotationConfig};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::RotatingFileLayer;

/// Logging section of the service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Rotating log file
    pub rotation: RotationConfig,

    /// `EnvFilter` directives, e.g. `info,reqlog_gateway=debug`
    #[serde(default = "default_filter")]
    pub filter: String,

    /// Also log to the console
    #[serde(default = "default_console")]
    pub console: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

fn default_console() -> bool {
    true
}

impl LoggingConfig {
    pub fn new(rotation: RotationConfig) -> Self {
        Self {
            rotation,
            filter: default_filter(),
            console: default_console(),
        }
    }

    /// Read the configuration from the environment (and `.env` if present).
    ///
    /// `REQLOG_FILE` is required; `REQLOG_MAX_BYTES`, `REQLOG_KEEP_DAYS`,
    /// `REQLOG_ENCODING`, `REQLOG_UTC`, `REQLOG_FORMAT`, `REQLOG_CONSOLE` and
    /// `RUST_LOG` override the defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`LoggingConfig::from_env`] with a custom variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let filename = lookup("REQLOG_FILE").context("REQLOG_FILE must be set")?;
        let mut rotation = RotationConfig::new(filename);

        if let Some(max_bytes) = parse_var(&lookup, "REQLOG_MAX_BYTES")? {
            rotation = rotation.with_max_bytes(max_bytes);
        }
        if let Some(keep_days) = parse_var(&lookup, "REQLOG_KEEP_DAYS")? {
            rotation = rotation.with_keep_days(keep_days);
        }
        if let Some(encoding) = lookup("REQLOG_ENCODING") {
            rotation = rotation.with_encoding(encoding);
        }
        if let Some(utc) = parse_var(&lookup, "REQLOG_UTC")? {
            rotation = rotation.with_utc(utc);
        }
        if let Some(format) = lookup("REQLOG_FORMAT") {
            let format = match format.to_lowercase().as_str() {
                "text" => LogFormat::Text,
                "json" => LogFormat::Json,
                other => anyhow::bail!("REQLOG_FORMAT must be 'text' or 'json', got '{}'", other),
            };
            rotation = rotation.with_format(format);
        }
        rotation.validate().context("Invalid rotation configuration")?;

        let mut config = Self::new(rotation);
        if let Some(filter) = lookup("RUST_LOG") {
            config.filter = filter;
        }
        if let Some(console) = parse_var(&lookup, "REQLOG_CONSOLE")? {
            config.console = console;
        }
        Ok(config)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .with_context(|| format!("Invalid value for {}: '{}'", key, raw))
        })
        .transpose()
}

/// Install the global subscriber: env filter, optional console output and
/// the rotating file layer.
///
/// Returns the handler so the caller can close it on shutdown.
pub fn init_logging(config: LoggingConfig) -> Result<Arc<RotatingFileHandler>> {
    let handler = Arc::new(
        RotatingFileHandler::new(config.rotation.clone())
            .context("Failed to create rotating log file")?,
    );

    let env_filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("Invalid log filter '{}'", config.filter))?;

    // Console layer: colored, compact
    let console_layer = config.console.then(|| {
        fmt::layer()
            .with_ansi(true)
            .compact()
            .with_thread_names(false)
            .with_target(true)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(RotatingFileLayer::new(handler.clone()))
        .try_init()
        .context("Failed to install tracing subscriber")?;

    tracing::info!(
        path = %handler.base_path().display(),
        max_bytes = config.rotation.max_bytes,
        keep_days = config.rotation.keep_days,
        "Logging initialized"
    );

    Ok(handler)
}
