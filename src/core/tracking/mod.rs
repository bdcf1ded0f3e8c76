//! Call tracking
//!
//! [`UsageTracker`] drives a call from detection to its finished
//! [`RequestRecord`](crate::core::types::RequestRecord) and hands the record
//! to persistence sinks, span exporters and the budget enforcer.

pub mod enrichment;
pub mod export;
pub mod sink;
pub mod tracker;

pub use enrichment::{HeuristicTokenCounter, TokenCounter, estimate_stream_tokens, request_text};
pub use export::{
    AttributeValue, ExportSpan, ExporterSink, GenAiSpanBuilder, InMemoryExporter, SpanBuilder,
    SpanStatus, StatusCode,
};
pub use sink::{InMemorySink, PersistenceSink, TracingSink};
pub use tracker::{UsageTracker, UsageTrackerBuilder};
