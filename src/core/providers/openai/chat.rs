//! Chat completions (`/v1/chat/completions`) and its OpenAI-compatible clones

use super::usage::body_token_metrics;
use crate::core::handlers::{
    ExtractsFinishReason, ExtractsModelFromRequest, Handler, MatchesResponse, handler_capabilities,
    model_from_request_body,
};
use crate::core::streaming::{MergedStream, StreamIdentity, StreamMerger, UsageMap};
use crate::core::types::{ApiRequest, Metrics, ModelType};
use crate::utils::json::{array_at, get_path, join_text, overlay_value, str_at, string_at};
use serde_json::{Value, json};

/// Chat completion handler.
///
/// The endpoint list is configurable so OpenAI-compatible vendors
/// (Groq under `/openai/v1`, OpenRouter under `/api/v1`, ...) reuse it.
#[derive(Debug, Clone)]
pub struct ChatCompletionHandler {
    endpoints: &'static [&'static str],
}

impl ChatCompletionHandler {
    pub const OPENAI_ENDPOINTS: &'static [&'static str] = &["/v1/chat/completions"];

    pub fn new(endpoints: &'static [&'static str]) -> Self {
        Self { endpoints }
    }

    pub fn openai() -> Self {
        Self::new(Self::OPENAI_ENDPOINTS)
    }
}

/// Text of one `message` or `delta`: a plain string or a list of parts.
pub(crate) fn message_content(message: &Value) -> Option<String> {
    match message.get("content")? {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => join_text(
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str)),
        ),
        _ => None,
    }
}

fn has_tool_call_entries(message: &Value) -> bool {
    !array_at(message, "tool_calls").is_empty() || get_path(message, "function_call").is_some()
}

impl Handler for ChatCompletionHandler {
    handler_capabilities!(finish_reason, request_model, shape_matcher, stream_merger);

    fn name(&self) -> &'static str {
        "chat_completion"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Text
    }

    fn endpoints(&self) -> &'static [&'static str] {
        self.endpoints
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        Metrics::empty().with_tokens(body_token_metrics(response))
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        string_at(response, "model")
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        join_text(
            array_at(response, "choices")
                .iter()
                .filter_map(|c| c.get("message").and_then(message_content)),
        )
    }

    fn has_tool_calls(&self, response: &Value) -> bool {
        array_at(response, "choices").iter().any(|c| {
            str_at(c, "finish_reason") == Some("tool_calls")
                || c.get("message").is_some_and(has_tool_call_entries)
        })
    }
}

impl ExtractsFinishReason for ChatCompletionHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        string_at(response, "choices.0.finish_reason")
    }
}

impl ExtractsModelFromRequest for ChatCompletionHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

impl MatchesResponse for ChatCompletionHandler {
    fn matches_response(&self, response: &Value) -> bool {
        str_at(response, "object") == Some("chat.completion")
    }
}

impl StreamMerger for ChatCompletionHandler {
    fn text(&self, chunk: &Value) -> Option<String> {
        get_path(chunk, "choices.0.delta").and_then(message_content)
    }

    fn usage(&self, chunk: &Value, mut current: UsageMap) -> UsageMap {
        overlay_value(&mut current, chunk.get("usage"));
        overlay_value(&mut current, get_path(chunk, "x_groq.usage"));
        current
    }

    fn finish_reason(&self, chunk: &Value) -> Option<String> {
        string_at(chunk, "choices.0.finish_reason")
    }

    fn model(&self, chunk: &Value) -> Option<StreamIdentity> {
        StreamIdentity::new(string_at(chunk, "model"), string_at(chunk, "id"))
    }

    fn signals_tool_call(&self, chunk: &Value) -> bool {
        get_path(chunk, "choices.0.delta").is_some_and(has_tool_call_entries)
    }

    fn assemble(&self, merged: &MergedStream) -> Value {
        json!({
            "id": merged.id,
            "object": "chat.completion",
            "model": merged.model,
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": merged.text},
                "finish_reason": merged.finish_reason,
            }],
            "usage": merged.usage_value(),
        })
    }
}
