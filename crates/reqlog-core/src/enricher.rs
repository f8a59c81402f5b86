//! Pre-emit enrichment hooks

use crate::context;
use crate::domain::LogRecord;

/// Stage run on every record before it reaches an output.
///
/// Returning `false` drops the record.
pub trait RecordEnricher: Send + Sync {
    fn enrich(&self, record: &mut LogRecord) -> bool;
}

/// Stamps the current execution context onto the record
#[derive(Debug, Default, Clone, Copy)]
pub struct ContextEnricher;

impl RecordEnricher for ContextEnricher {
    fn enrich(&self, record: &mut LogRecord) -> bool {
        let ctx = context::snapshot();
        record.request_id = ctx.request_id_or_default().to_string();
        if let Some(trace) = ctx.captured_trace {
            record.trace = Some(trace);
        }
        true
    }
}

/// Run every enricher in order; stops at the first one that drops the record
pub fn enrich_all(enrichers: &[std::sync::Arc<dyn RecordEnricher>], record: &mut LogRecord) -> bool {
    enrichers.iter().all(|enricher| enricher.enrich(record))
}
