//! The immutable record handed to persistence and export sinks

use super::{ModelType, PricingTier, Trackable};
use crate::core::handlers::StoredMedia;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Cost of one call, in fractional cents
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostFields {
    pub input_cost: f64,
    pub output_cost: f64,
    pub total_cost: f64,
}

impl CostFields {
    pub fn new(input_cost: f64, output_cost: f64) -> Self {
        Self {
            input_cost,
            output_cost,
            total_cost: input_cost + output_cost,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.total_cost == 0.0
    }
}

/// One finished AI call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    pub id: Uuid,
    pub trace_id: String,
    pub provider: String,
    /// Model name used for pricing
    pub model: Option<String>,
    /// Raw model string reported by the vendor
    pub snapshot: Option<String>,
    pub model_type: Option<ModelType>,
    pub handler: Option<String>,
    pub endpoint: String,
    pub operation: String,

    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub cached_tokens: u64,
    pub reasoning_tokens: u64,
    pub cache_creation_tokens: u64,
    pub total_tokens: u64,
    pub duration_seconds: Option<f64>,
    pub input_characters: Option<u64>,
    pub image_count: Option<u32>,
    pub video_count: Option<u32>,

    pub pricing_tier: PricingTier,
    pub cost: CostFields,

    pub latency_ms: u64,
    pub time_to_first_token_ms: Option<u64>,
    pub tokens_per_second: Option<f64>,

    pub is_reasoning: bool,
    pub reasoning_effort: Option<String>,
    pub is_streaming: bool,
    pub finish_reason: Option<String>,
    pub has_tool_calls: bool,

    pub http_status: Option<u16>,
    pub success: bool,
    pub error_kind: Option<String>,
    pub error_message: Option<String>,

    pub trackable: Option<Trackable>,
    pub tags: Vec<String>,
    pub metadata: BTreeMap<String, Value>,
    pub request_payload: Option<Value>,
    pub response_text: Option<String>,
    pub response_id: Option<String>,
    pub media: Vec<StoredMedia>,

    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

impl RequestRecord {
    pub fn total_cost(&self) -> f64 {
        self.cost.total_cost
    }

    /// Window key used by usage aggregates
    pub fn subject_key(&self) -> Option<String> {
        self.trackable.as_ref().map(Trackable::key)
    }
}

#[cfg(test)]
impl RequestRecord {
    /// A successful chat record for sink and exporter tests
    pub(crate) fn fixture(provider: &str, model: &str) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            trace_id: crate::utils::generate_trace_id(),
            provider: provider.to_string(),
            model: Some(model.to_string()),
            snapshot: None,
            model_type: Some(ModelType::Text),
            handler: Some("chat".to_string()),
            endpoint: "/v1/chat/completions".to_string(),
            operation: "POST".to_string(),
            prompt_tokens: 100,
            completion_tokens: 50,
            cached_tokens: 0,
            reasoning_tokens: 0,
            cache_creation_tokens: 0,
            total_tokens: 150,
            duration_seconds: None,
            input_characters: None,
            image_count: None,
            video_count: None,
            pricing_tier: PricingTier::Standard,
            cost: CostFields::new(0.025, 0.05),
            latency_ms: 1200,
            time_to_first_token_ms: None,
            tokens_per_second: None,
            is_reasoning: false,
            reasoning_effort: None,
            is_streaming: false,
            finish_reason: Some("stop".to_string()),
            has_tool_calls: false,
            http_status: Some(200),
            success: true,
            error_kind: None,
            error_message: None,
            trackable: None,
            tags: Vec::new(),
            metadata: BTreeMap::new(),
            request_payload: None,
            response_text: None,
            response_id: Some("chatcmpl-1".to_string()),
            media: Vec::new(),
            started_at: now - chrono::Duration::milliseconds(1200),
            completed_at: now,
        }
    }
}

/// Output tokens per second of generation time. Streaming calls exclude the
/// wait for the first token.
pub fn tokens_per_second(
    completion_tokens: u64,
    latency_ms: u64,
    time_to_first_token_ms: Option<u64>,
) -> Option<f64> {
    if completion_tokens == 0 {
        return None;
    }
    let generation_ms = latency_ms.saturating_sub(time_to_first_token_ms.unwrap_or(0));
    if generation_ms == 0 {
        return None;
    }
    Some(completion_tokens as f64 / (generation_ms as f64 / 1000.0))
}
