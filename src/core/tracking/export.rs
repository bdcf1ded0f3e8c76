//! Telemetry export
//!
//! Records are turned into OTLP-shaped spans by a [`SpanBuilder`] and handed
//! to every [`ExporterSink`]. The default builder follows the OpenTelemetry
//! `gen_ai.*` semantic conventions.

use crate::core::types::{ModelType, RequestRecord};
use crate::utils::error::Result;
use crate::utils::generate_span_id;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An attribute value as OTLP models it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    StringArray(Vec<String>),
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        Self::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u16> for AttributeValue {
    fn from(value: u16) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Vec<String>> for AttributeValue {
    fn from(value: Vec<String>) -> Self {
        Self::StringArray(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusCode {
    Unset,
    Ok,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanStatus {
    pub code: StatusCode,
    pub message: Option<String>,
}

/// One exported span
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportSpan {
    /// 32 hex characters
    pub trace_id: String,
    /// 16 hex characters
    pub span_id: String,
    pub parent_span_id: Option<String>,
    pub name: String,
    pub start_time_unix_nano: u64,
    pub end_time_unix_nano: u64,
    pub attributes: BTreeMap<String, AttributeValue>,
    pub status: SpanStatus,
}

impl ExportSpan {
    pub fn attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    pub fn duration_nanos(&self) -> u64 {
        self.end_time_unix_nano
            .saturating_sub(self.start_time_unix_nano)
    }
}

/// Turns a record into a span. Hosts may supply their own.
pub trait SpanBuilder: Send + Sync {
    fn build(&self, record: &RequestRecord) -> ExportSpan;
}

/// Receives spans
#[async_trait]
pub trait ExporterSink: Send + Sync {
    async fn export(&self, span: &ExportSpan) -> Result<()>;
}

fn unix_nanos(at: DateTime<Utc>) -> u64 {
    at.timestamp_nanos_opt()
        .and_then(|n| u64::try_from(n).ok())
        .unwrap_or(0)
}

/// `gen_ai.operation.name` for a capability
fn operation_name(model_type: Option<ModelType>) -> &'static str {
    match model_type {
        Some(ModelType::Text) | None => "chat",
        Some(ModelType::Embedding) => "embeddings",
        Some(ModelType::Image) => "generate_image",
        Some(ModelType::Video) => "generate_video",
        Some(ModelType::Tts) => "text_to_speech",
        Some(ModelType::Stt) => "speech_to_text",
    }
}

/// Builds spans with `gen_ai.*` attributes plus tracker-specific
/// `ai_tracker.*` attributes for cost and attribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct GenAiSpanBuilder;

impl SpanBuilder for GenAiSpanBuilder {
    fn build(&self, record: &RequestRecord) -> ExportSpan {
        let operation = operation_name(record.model_type);
        let mut attributes: BTreeMap<String, AttributeValue> = BTreeMap::new();
        let mut set = |key: &str, value: AttributeValue| {
            attributes.insert(key.to_string(), value);
        };

        set("gen_ai.system", record.provider.as_str().into());
        set("gen_ai.operation.name", operation.into());
        if let Some(model) = &record.model {
            set("gen_ai.request.model", model.clone().into());
        }
        if let Some(snapshot) = &record.snapshot {
            set("gen_ai.response.model", snapshot.clone().into());
        }
        if let Some(id) = &record.response_id {
            set("gen_ai.response.id", id.clone().into());
        }
        if let Some(reason) = &record.finish_reason {
            set("gen_ai.response.finish_reasons", vec![reason.clone()].into());
        }
        if record.prompt_tokens > 0 || record.completion_tokens > 0 {
            set("gen_ai.usage.input_tokens", record.prompt_tokens.into());
            set("gen_ai.usage.output_tokens", record.completion_tokens.into());
        }
        if record.cached_tokens > 0 {
            set("gen_ai.usage.cache_read_input_tokens", record.cached_tokens.into());
        }
        if record.cache_creation_tokens > 0 {
            set(
                "gen_ai.usage.cache_creation_input_tokens",
                record.cache_creation_tokens.into(),
            );
        }
        if record.reasoning_tokens > 0 {
            set("gen_ai.usage.reasoning_tokens", record.reasoning_tokens.into());
        }
        if let Some(effort) = &record.reasoning_effort {
            set("gen_ai.request.reasoning_effort", effort.clone().into());
        }

        set("http.request.method", record.operation.as_str().into());
        set("url.path", record.endpoint.as_str().into());
        if let Some(status) = record.http_status {
            set("http.response.status_code", status.into());
        }

        set("ai_tracker.request_id", record.id.to_string().into());
        set("ai_tracker.pricing_tier", record.pricing_tier.as_str().into());
        set("ai_tracker.cost.input_cents", record.cost.input_cost.into());
        set("ai_tracker.cost.output_cents", record.cost.output_cost.into());
        set("ai_tracker.cost.total_cents", record.cost.total_cost.into());
        set("ai_tracker.latency_ms", record.latency_ms.into());
        if let Some(ttft) = record.time_to_first_token_ms {
            set("ai_tracker.time_to_first_token_ms", ttft.into());
        }
        if let Some(tps) = record.tokens_per_second {
            set("ai_tracker.tokens_per_second", tps.into());
        }
        set("ai_tracker.streaming", record.is_streaming.into());
        if let Some(subject) = &record.trackable {
            set("ai_tracker.trackable", subject.key().into());
        }
        if !record.tags.is_empty() {
            set("ai_tracker.tags", record.tags.clone().into());
        }
        if let Some(kind) = &record.error_kind {
            set("error.type", kind.clone().into());
        }

        let status = if record.success {
            SpanStatus {
                code: StatusCode::Ok,
                message: None,
            }
        } else {
            SpanStatus {
                code: StatusCode::Error,
                message: record.error_message.clone(),
            }
        };

        let name = match record.model.as_deref().or(record.snapshot.as_deref()) {
            Some(model) => format!("{} {}", operation, model),
            None => operation.to_string(),
        };

        ExportSpan {
            trace_id: record.trace_id.clone(),
            span_id: generate_span_id(),
            parent_span_id: None,
            name,
            start_time_unix_nano: unix_nanos(record.started_at),
            end_time_unix_nano: unix_nanos(record.completed_at),
            attributes,
            status,
        }
    }
}

/// Collects spans in memory
#[derive(Debug, Default)]
pub struct InMemoryExporter {
    spans: RwLock<Vec<ExportSpan>>,
}

impl InMemoryExporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> Vec<ExportSpan> {
        self.spans.read().clone()
    }

    pub fn len(&self) -> usize {
        self.spans.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.read().is_empty()
    }
}

#[async_trait]
impl ExporterSink for InMemoryExporter {
    async fn export(&self, span: &ExportSpan) -> Result<()> {
        self.spans.write().push(span.clone());
        Ok(())
    }
}
