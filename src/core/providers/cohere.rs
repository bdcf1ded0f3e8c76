//! Cohere v2 (chat + embed)
//!
//! Usage is reported twice: `tokens` (raw) and `billed_units` (what is
//! charged). Billed units win when present.

use super::provider::Provider;
use crate::core::handlers::{
    ExtractsFinishReason, ExtractsModelFromRequest, Handler, handler_capabilities,
    model_from_request_body,
};
use crate::core::streaming::{MergedStream, StreamIdentity, StreamMerger, UsageMap};
use crate::core::types::{ApiRequest, Metrics, ModelType, TokenMetrics};
use crate::utils::json::{array_at, get_path, join_text, overlay_value, str_at, string_at, u64_at};
use serde_json::{Value, json};

pub const SLUG: &str = "cohere";
pub const HOSTS: &[&str] = &["api.cohere.com", "api.cohere.ai"];

fn token_metrics(usage: &Value) -> Option<TokenMetrics> {
    ["billed_units", "tokens"].iter().find_map(|section| {
        let counts = usage.get(*section)?;
        let input = u64_at(counts, "input_tokens");
        let output = u64_at(counts, "output_tokens");
        if input.is_none() && output.is_none() {
            return None;
        }
        Some(TokenMetrics::new(input.unwrap_or(0), output.unwrap_or(0)))
    })
}

#[derive(Debug, Clone, Default)]
pub struct CohereChatHandler;

impl Handler for CohereChatHandler {
    handler_capabilities!(finish_reason, request_model, stream_merger);

    fn name(&self) -> &'static str {
        "cohere_chat"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Text
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v2/chat"]
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        Metrics::empty().with_tokens(response.get("usage").and_then(token_metrics))
    }

    /// The chat response does not echo the model.
    fn extract_model(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        join_text(
            array_at(response, "message.content")
                .iter()
                .filter(|c| str_at(c, "type") == Some("text"))
                .filter_map(|c| str_at(c, "text")),
        )
    }

    fn has_tool_calls(&self, response: &Value) -> bool {
        !array_at(response, "message.tool_calls").is_empty()
    }
}

impl ExtractsFinishReason for CohereChatHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        string_at(response, "finish_reason")
    }
}

impl ExtractsModelFromRequest for CohereChatHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

impl StreamMerger for CohereChatHandler {
    fn text(&self, chunk: &Value) -> Option<String> {
        match str_at(chunk, "type") {
            Some("content-delta") => string_at(chunk, "delta.message.content.text"),
            _ => None,
        }
    }

    fn usage(&self, chunk: &Value, mut current: UsageMap) -> UsageMap {
        if str_at(chunk, "type") == Some("message-end") {
            overlay_value(&mut current, get_path(chunk, "delta.usage"));
        }
        current
    }

    fn finish_reason(&self, chunk: &Value) -> Option<String> {
        match str_at(chunk, "type") {
            Some("message-end") => string_at(chunk, "delta.finish_reason"),
            _ => None,
        }
    }

    fn model(&self, chunk: &Value) -> Option<StreamIdentity> {
        match str_at(chunk, "type") {
            Some("message-start") => StreamIdentity::new(None, string_at(chunk, "id")),
            _ => None,
        }
    }

    fn signals_tool_call(&self, chunk: &Value) -> bool {
        str_at(chunk, "type") == Some("tool-call-start")
    }

    fn assemble(&self, merged: &MergedStream) -> Value {
        json!({
            "id": merged.id,
            "finish_reason": merged.finish_reason,
            "message": {
                "role": "assistant",
                "content": [{"type": "text", "text": merged.text}],
            },
            "usage": merged.usage_value(),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct CohereEmbedHandler;

impl Handler for CohereEmbedHandler {
    handler_capabilities!(request_model);

    fn name(&self) -> &'static str {
        "cohere_embed"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Embedding
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v2/embed"]
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        let input = u64_at(response, "meta.billed_units.input_tokens");
        Metrics::empty().with_tokens(input.map(|i| TokenMetrics::new(i, 0)))
    }

    fn extract_model(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_text(&self, _response: &Value) -> Option<String> {
        None
    }
}

impl ExtractsModelFromRequest for CohereEmbedHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

pub fn provider() -> Provider {
    Provider::builder(SLUG, "Cohere")
        .hosts(HOSTS.iter().copied())
        .handler(CohereChatHandler)
        .handler(CohereEmbedHandler)
        .build()
}
