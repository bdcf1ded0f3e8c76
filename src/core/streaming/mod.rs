//! Streaming response aggregation
//!
//! Reconstructs text, token usage, finish reason and model identity from an
//! incremental response without buffering the whole body.

pub mod aggregator;
pub mod decoder;
pub mod merger;
pub mod stream;


pub use aggregator::{StreamAggregator, StreamOutcome};
pub use decoder::{ChunkDecoder, NdjsonDecoder, SseDecoder, SseEvent};
pub use merger::{MergedStream, StreamFraming, StreamIdentity, StreamMerger, UsageMap};
pub use stream::AggregatingStream;
