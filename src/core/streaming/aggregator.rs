//! Single-pass stream aggregation
//!
//! Chunks are applied strictly in arrival order. Text fragments are
//! concatenated; usage, finish reason and model identity are overlays. At the
//! end the merged state is reassembled into a vendor-shaped body and run
//! through the handler's regular extractors, so a streamed call and the
//! equivalent non-streamed call produce the same metrics.

use super::merger::MergedStream;
use crate::core::handlers::Handler;
use crate::core::types::{ApiRequest, Metrics};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Result of a finished stream
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamOutcome {
    pub text: String,
    pub metrics: Metrics,
    pub finish_reason: Option<String>,
    pub model: Option<String>,
    pub response_id: Option<String>,
    pub has_tool_calls: bool,
    /// Body rebuilt in the vendor's non-streaming shape
    pub assembled: Value,
    pub chunk_count: usize,
    pub dropped_chunks: usize,
    /// Time from stream start to the first chunk carrying text
    #[serde(skip)]
    pub time_to_first_token: Option<Duration>,
}

impl StreamOutcome {
    pub fn time_to_first_token_ms(&self) -> Option<u64> {
        self.time_to_first_token.map(|d| d.as_millis() as u64)
    }

    /// Whether the vendor reported any token usage during the stream
    pub fn has_usage(&self) -> bool {
        self.metrics.tokens.is_some_and(|t| !t.is_empty())
    }
}

/// Reconstructs metrics from an ordered chunk sequence.
#[derive(Debug)]
pub struct StreamAggregator {
    handler: Arc<dyn Handler>,
    merged: MergedStream,
    chunk_count: usize,
    dropped_chunks: usize,
    started_at: Instant,
    first_token_at: Option<Instant>,
}

impl StreamAggregator {
    /// Returns `None` when the handler cannot merge streams.
    pub fn new(handler: Arc<dyn Handler>) -> Option<Self> {
        handler.stream_merger()?;
        Some(Self {
            handler,
            merged: MergedStream::default(),
            chunk_count: 0,
            dropped_chunks: 0,
            started_at: Instant::now(),
            first_token_at: None,
        })
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn text(&self) -> &str {
        &self.merged.text
    }

    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    pub fn dropped_chunks(&self) -> usize {
        self.dropped_chunks
    }

    /// Feed one raw payload. Unparseable payloads are dropped.
    pub fn push_raw(&mut self, raw: &str) {
        match serde_json::from_str::<Value>(raw) {
            Ok(chunk) => self.push(&chunk),
            Err(e) => {
                self.dropped_chunks += 1;
                debug!(
                    handler = self.handler.name(),
                    error = %e,
                    "dropping malformed stream chunk"
                );
            }
        }
    }

    /// Apply one parsed chunk
    pub fn push(&mut self, chunk: &Value) {
        let Some(merger) = self.handler.stream_merger() else {
            return;
        };
        if !chunk.is_object() {
            self.dropped_chunks += 1;
            return;
        }
        self.chunk_count += 1;

        if let Some(text) = merger.text(chunk) {
            if !text.is_empty() && self.first_token_at.is_none() {
                self.first_token_at = Some(Instant::now());
            }
            self.merged.text.push_str(&text);
        }

        let usage = std::mem::take(&mut self.merged.usage);
        self.merged.usage = merger.usage(chunk, usage);

        if let Some(reason) = merger.finish_reason(chunk) {
            self.merged.finish_reason = Some(reason);
        }

        if let Some(identity) = merger.model(chunk) {
            if identity.model.is_some() {
                self.merged.model = identity.model;
            }
            if identity.id.is_some() {
                self.merged.id = identity.id;
            }
        }

        if merger.signals_tool_call(chunk) {
            self.merged.has_tool_calls = true;
        }
    }

    /// Finish the stream and synthesize metrics as if the merged state had
    /// arrived as one response body.
    pub fn finish(self, request: &ApiRequest) -> StreamOutcome {
        let Some(merger) = self.handler.stream_merger() else {
            warn!(handler = self.handler.name(), "stream finished without merger");
            return StreamOutcome {
                text: self.merged.text,
                metrics: Metrics::empty(),
                finish_reason: None,
                model: None,
                response_id: None,
                has_tool_calls: false,
                assembled: Value::Null,
                chunk_count: self.chunk_count,
                dropped_chunks: self.dropped_chunks,
                time_to_first_token: None,
            };
        };

        let assembled = merger.assemble(&self.merged);
        let metrics = self.handler.extract_metrics(request, &assembled);
        let finish_reason = self
            .handler
            .finish_reason()
            .and_then(|f| f.extract_finish_reason(&assembled))
            .or_else(|| self.merged.finish_reason.clone());
        let model = self
            .handler
            .extract_model(&assembled)
            .or_else(|| self.merged.model.clone());
        let response_id = self
            .handler
            .extract_response_id(&assembled)
            .or_else(|| self.merged.id.clone());
        let has_tool_calls = self.merged.has_tool_calls || self.handler.has_tool_calls(&assembled);
        let time_to_first_token = self
            .first_token_at
            .map(|t| t.saturating_duration_since(self.started_at));

        debug!(
            handler = self.handler.name(),
            chunks = self.chunk_count,
            dropped = self.dropped_chunks,
            "stream aggregation finished"
        );

        StreamOutcome {
            text: self.merged.text,
            metrics,
            finish_reason,
            model,
            response_id,
            has_tool_calls,
            assembled,
            chunk_count: self.chunk_count,
            dropped_chunks: self.dropped_chunks,
            time_to_first_token,
        }
    }
}
