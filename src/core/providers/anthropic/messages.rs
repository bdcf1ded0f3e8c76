//! Messages API (`/v1/messages`)
//!
//! Streaming reports usage in two places: `message_start` carries the input
//! and cache counters, `message_delta` the final output count. Both are
//! overlaid onto one usage object.

use crate::core::handlers::{
    ExtractsFinishReason, ExtractsModelFromRequest, Handler, MatchesResponse, handler_capabilities,
    model_from_request_body,
};
use crate::core::streaming::{MergedStream, StreamIdentity, StreamMerger, UsageMap};
use crate::core::types::{ApiRequest, Metrics, ModelType, TokenMetrics};
use crate::utils::json::{
    array_at, get_path, join_text, overlay_value, str_at, string_at, u64_at,
};
use serde_json::{Value, json};

/// Parse an Anthropic usage object.
///
/// `input_tokens` excludes cache traffic, so the normalized prompt is
/// `input + cache_read + cache_creation`.
pub fn token_metrics(usage: &Value) -> Option<TokenMetrics> {
    if !usage.is_object() {
        return None;
    }
    let input = u64_at(usage, "input_tokens");
    let output = u64_at(usage, "output_tokens");
    if input.is_none() && output.is_none() {
        return None;
    }
    let cache_read = u64_at(usage, "cache_read_input_tokens").unwrap_or(0);
    let cache_creation = u64_at(usage, "cache_creation_input_tokens").unwrap_or(0);
    let one_hour = u64_at(usage, "cache_creation.ephemeral_1h_input_tokens").unwrap_or(0);

    Some(
        TokenMetrics::new(
            input.unwrap_or(0) + cache_read + cache_creation,
            output.unwrap_or(0),
        )
        .with_cached(cache_read)
        .with_cache_creation(cache_creation, one_hour),
    )
}

#[derive(Debug, Clone, Default)]
pub struct MessagesHandler;

impl MessagesHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Handler for MessagesHandler {
    handler_capabilities!(finish_reason, request_model, shape_matcher, stream_merger);

    fn name(&self) -> &'static str {
        "messages"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Text
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v1/messages"]
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        Metrics::empty().with_tokens(response.get("usage").and_then(token_metrics))
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        string_at(response, "model")
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        join_text(
            array_at(response, "content")
                .iter()
                .filter(|block| str_at(block, "type") == Some("text"))
                .filter_map(|block| str_at(block, "text")),
        )
    }

    fn has_tool_calls(&self, response: &Value) -> bool {
        str_at(response, "stop_reason") == Some("tool_use")
            || array_at(response, "content")
                .iter()
                .any(|block| str_at(block, "type") == Some("tool_use"))
    }
}

impl ExtractsFinishReason for MessagesHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        string_at(response, "stop_reason")
    }
}

impl ExtractsModelFromRequest for MessagesHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

impl MatchesResponse for MessagesHandler {
    fn matches_response(&self, response: &Value) -> bool {
        str_at(response, "type") == Some("message") && response.get("content").is_some()
    }
}

impl StreamMerger for MessagesHandler {
    fn text(&self, chunk: &Value) -> Option<String> {
        if str_at(chunk, "type") != Some("content_block_delta") {
            return None;
        }
        match str_at(chunk, "delta.type") {
            Some("text_delta") => string_at(chunk, "delta.text"),
            _ => None,
        }
    }

    fn usage(&self, chunk: &Value, mut current: UsageMap) -> UsageMap {
        match str_at(chunk, "type") {
            Some("message_start") => overlay_value(&mut current, get_path(chunk, "message.usage")),
            Some("message_delta") => overlay_value(&mut current, chunk.get("usage")),
            _ => {}
        }
        current
    }

    fn finish_reason(&self, chunk: &Value) -> Option<String> {
        match str_at(chunk, "type") {
            Some("message_delta") => string_at(chunk, "delta.stop_reason"),
            _ => None,
        }
    }

    fn model(&self, chunk: &Value) -> Option<StreamIdentity> {
        match str_at(chunk, "type") {
            Some("message_start") => StreamIdentity::new(
                string_at(chunk, "message.model"),
                string_at(chunk, "message.id"),
            ),
            _ => None,
        }
    }

    fn signals_tool_call(&self, chunk: &Value) -> bool {
        str_at(chunk, "type") == Some("content_block_start")
            && str_at(chunk, "content_block.type") == Some("tool_use")
    }

    fn assemble(&self, merged: &MergedStream) -> Value {
        json!({
            "id": merged.id,
            "type": "message",
            "role": "assistant",
            "model": merged.model,
            "content": [{"type": "text", "text": merged.text}],
            "stop_reason": merged.finish_reason,
            "usage": merged.usage_value(),
        })
    }
}
