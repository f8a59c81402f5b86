//! Tracing layer that writes enriched records to a rotating file

use reqlog_core::enricher::enrich_all;
use reqlog_core::{ContextEnricher, LogLevel, LogRecord, RecordEnricher, RotatingFileHandler};
use serde_json::{Map, Value};
use std::cell::Cell;
use std::fmt;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::Context;
use tracing_subscriber::Layer;

thread_local! {
    /// Set while this thread is inside `on_event`
    static EMITTING: Cell<bool> = const { Cell::new(false) };
}

/// Layer that turns every event into a [`LogRecord`], runs the enricher
/// chain on it and appends it to a [`RotatingFileHandler`].
///
/// Built explicitly and added to a subscriber; the default chain holds the
/// [`ContextEnricher`], which stamps the request id of the current execution
/// context.
pub struct RotatingFileLayer {
    handler: Arc<RotatingFileHandler>,
    enrichers: Vec<Arc<dyn RecordEnricher>>,
}

impl RotatingFileLayer {
    pub fn new(handler: Arc<RotatingFileHandler>) -> Self {
        Self {
            handler,
            enrichers: vec![Arc::new(ContextEnricher)],
        }
    }

    /// Append an enricher to the chain
    pub fn with_enricher(mut self, enricher: impl RecordEnricher + 'static) -> Self {
        self.enrichers.push(Arc::new(enricher));
        self
    }

    pub fn handler(&self) -> &Arc<RotatingFileHandler> {
        &self.handler
    }
}

impl<S> Layer<S> for RotatingFileLayer
where
    S: Subscriber,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        // Events raised while a record is being written would re-enter the
        // handler lock on this thread
        let Some(_emitting) = EmittingGuard::enter() else {
            return;
        };

        let mut record = record_from_event(event);
        if !enrich_all(&self.enrichers, &mut record) {
            return;
        }

        if let Err(e) = self.handler.emit(&record) {
            eprintln!(
                "Failed to write log record to {}: {}",
                self.handler.base_path().display(),
                e
            );
        }
    }
}

struct EmittingGuard;

impl EmittingGuard {
    fn enter() -> Option<Self> {
        if EMITTING.with(|flag| flag.replace(true)) {
            None
        } else {
            Some(Self)
        }
    }
}

impl Drop for EmittingGuard {
    fn drop(&mut self) {
        EMITTING.with(|flag| flag.set(false));
    }
}

/// Map a tracing level onto the record level
pub fn log_level(level: &Level) -> LogLevel {
    match *level {
        Level::TRACE => LogLevel::Trace,
        Level::DEBUG => LogLevel::Debug,
        Level::INFO => LogLevel::Info,
        Level::WARN => LogLevel::Warn,
        Level::ERROR => LogLevel::Error,
    }
}

/// Build an un-enriched record from an event
pub fn record_from_event(event: &Event<'_>) -> LogRecord {
    let metadata = event.metadata();
    let mut visitor = FieldVisitor::default();
    event.record(&mut visitor);

    let mut record = LogRecord::new(
        log_level(metadata.level()),
        metadata.target(),
        visitor.message.unwrap_or_default(),
    );
    record.fields = visitor.fields;
    record
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Map<String, Value>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: Value) {
        match field.name() {
            "message" => {
                self.message = Some(match value {
                    Value::String(s) => s,
                    other => other.to_string(),
                });
            }
            name if name.starts_with("log.") => {}
            name => {
                self.fields.insert(name.to_string(), value);
            }
        }
    }
}

impl Visit for FieldVisitor {
    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, Value::from(value));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, Value::from(value));
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, Value::from(value));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, Value::from(value.to_string()));
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, Value::from(format!("{:?}", value)));
    }
}
