//! Per-call tracking context
//!
//! Created when a call begins, finished exactly once by `complete` or `fail`,
//! then turned into a [`RequestRecord`](super::RequestRecord) and dropped.

use super::{Metrics, PricingTier, Trackable};
use crate::utils::error::{Result, TrackerError};
use crate::utils::generate_trace_id;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Lifecycle of a context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextState {
    Pending,
    Completed,
    Failed,
}

/// Why a call failed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureInfo {
    /// Error class, e.g. `http_error`, `timeout`, `budget_exceeded`
    pub kind: String,
    pub message: String,
}

/// State of one in-flight call. Never shared between calls.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub id: Uuid,
    pub trace_id: String,
    pub provider: String,
    pub model: Option<String>,
    pub endpoint: String,
    /// HTTP method
    pub operation: String,
    pub trackable: Option<Trackable>,
    pub pricing_tier: Option<PricingTier>,
    pub metadata: BTreeMap<String, Value>,
    pub request_payload: Value,
    pub response_payload: Option<Value>,
    pub metrics: Metrics,
    pub http_status: Option<u16>,
    pub failure: Option<FailureInfo>,
    pub is_streaming: bool,
    pub time_to_first_token: Option<Duration>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    tags: Vec<String>,
    state: ContextState,
    started: Instant,
    finished: Option<Instant>,
}

impl RequestContext {
    pub fn new(
        provider: impl Into<String>,
        endpoint: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            trace_id: generate_trace_id(),
            provider: provider.into(),
            model: None,
            endpoint: endpoint.into(),
            operation: operation.into().to_ascii_uppercase(),
            trackable: None,
            pricing_tier: None,
            metadata: BTreeMap::new(),
            request_payload: Value::Null,
            response_payload: None,
            metrics: Metrics::empty(),
            http_status: None,
            failure: None,
            is_streaming: false,
            time_to_first_token: None,
            started_at: Utc::now(),
            completed_at: None,
            tags: Vec::new(),
            state: ContextState::Pending,
            started: Instant::now(),
            finished: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_trackable(mut self, trackable: Trackable) -> Self {
        self.trackable = Some(trackable);
        self
    }

    pub fn with_pricing_tier(mut self, tier: PricingTier) -> Self {
        self.pricing_tier = Some(tier);
        self
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = trace_id.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.add_tag(tag);
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_request_payload(mut self, payload: Value) -> Self {
        self.request_payload = payload;
        self
    }

    pub fn streaming(mut self, is_streaming: bool) -> Self {
        self.is_streaming = is_streaming;
        self
    }

    /// Add a tag, keeping insertion order and ignoring duplicates.
    pub fn add_tag(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !tag.is_empty() && !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn state(&self) -> ContextState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state != ContextState::Pending
    }

    /// Wall time from start to completion, or to now while pending
    pub fn elapsed(&self) -> Duration {
        self.finished
            .map(|f| f.saturating_duration_since(self.started))
            .unwrap_or_else(|| self.started.elapsed())
    }

    /// Record the first streamed token, once.
    pub fn mark_first_token(&mut self) {
        if self.time_to_first_token.is_none() {
            self.time_to_first_token = Some(self.started.elapsed());
        }
    }

    /// Finish successfully with the response body and extracted metrics.
    pub fn complete(&mut self, response: Value, metrics: Metrics) -> Result<()> {
        self.finish(ContextState::Completed)?;
        self.response_payload = Some(response);
        self.metrics = metrics;
        self.http_status.get_or_insert(200);
        Ok(())
    }

    /// Finish with a failure.
    pub fn fail(
        &mut self,
        kind: impl Into<String>,
        message: impl Into<String>,
        http_status: Option<u16>,
    ) -> Result<()> {
        self.finish(ContextState::Failed)?;
        self.failure = Some(FailureInfo {
            kind: kind.into(),
            message: message.into(),
        });
        self.http_status = http_status;
        Ok(())
    }

    fn finish(&mut self, state: ContextState) -> Result<()> {
        if self.is_finished() {
            return Err(TrackerError::ContextFinished(self.id));
        }
        self.state = state;
        self.finished = Some(Instant::now());
        self.completed_at = Some(Utc::now());
        Ok(())
    }
}
