//! Responses API (`/v1/responses`)
//!
//! The text handler is the default for the endpoint. When the model calls the
//! built-in image generation tool the output carries
//! `image_generation_call` items and [`ResponsesImageHandler`] takes over.

use super::usage::token_metrics;
use crate::core::handlers::{
    ExtractsFinishReason, ExtractsModelFromRequest, Handler, HasMedia, MatchesResponse,
    MediaPayload, SkipsResponse, handler_capabilities, model_from_request_body,
};
use crate::core::streaming::{MergedStream, StreamIdentity, StreamMerger, UsageMap};
use crate::core::types::{ApiRequest, Metrics, ModelType};
use crate::utils::json::{array_at, get_path, join_text, overlay_value, str_at, string_at};
use serde_json::{Value, json};

const ENDPOINTS: &[&str] = &["/v1/responses", "/v1/responses/{response_id}"];

const TOOL_CALL_ITEMS: &[&str] = &[
    "function_call",
    "custom_tool_call",
    "computer_call",
    "local_shell_call",
    "mcp_call",
];

fn output_items<'a>(response: &'a Value, kind: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
    array_at(response, "output")
        .iter()
        .filter(move |item| str_at(item, "type") == Some(kind))
}

fn output_text(response: &Value) -> Option<String> {
    join_text(
        output_items(response, "message")
            .flat_map(|item| array_at(item, "content").iter())
            .filter(|part| str_at(part, "type") == Some("output_text"))
            .filter_map(|part| str_at(part, "text")),
    )
}

fn finish_reason_of(response: &Value) -> Option<String> {
    string_at(response, "incomplete_details.reason").or_else(|| string_at(response, "status"))
}

fn is_pending(response: &Value) -> bool {
    matches!(str_at(response, "status"), Some("queued" | "in_progress"))
}

#[derive(Debug, Clone, Default)]
pub struct ResponsesHandler;

impl ResponsesHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Handler for ResponsesHandler {
    handler_capabilities!(finish_reason, request_model, response_skipper, stream_merger);

    fn name(&self) -> &'static str {
        "responses"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Text
    }

    fn endpoints(&self) -> &'static [&'static str] {
        ENDPOINTS
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        Metrics::empty().with_tokens(response.get("usage").and_then(token_metrics))
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        string_at(response, "model")
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        output_text(response)
    }

    fn has_tool_calls(&self, response: &Value) -> bool {
        array_at(response, "output")
            .iter()
            .filter_map(|item| str_at(item, "type"))
            .any(|kind| TOOL_CALL_ITEMS.contains(&kind))
    }
}

impl ExtractsFinishReason for ResponsesHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        finish_reason_of(response)
    }
}

impl ExtractsModelFromRequest for ResponsesHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

impl SkipsResponse for ResponsesHandler {
    /// Background responses are polled until they leave the queue.
    fn should_skip_response(&self, response: &Value) -> bool {
        is_pending(response)
    }
}

impl StreamMerger for ResponsesHandler {
    fn text(&self, chunk: &Value) -> Option<String> {
        match str_at(chunk, "type") {
            Some("response.output_text.delta") => string_at(chunk, "delta"),
            _ => None,
        }
    }

    fn usage(&self, chunk: &Value, mut current: UsageMap) -> UsageMap {
        overlay_value(&mut current, get_path(chunk, "response.usage"));
        current
    }

    fn finish_reason(&self, chunk: &Value) -> Option<String> {
        match str_at(chunk, "type") {
            Some("response.completed" | "response.incomplete" | "response.failed") => {
                chunk.get("response").and_then(finish_reason_of)
            }
            _ => None,
        }
    }

    fn model(&self, chunk: &Value) -> Option<StreamIdentity> {
        StreamIdentity::new(
            string_at(chunk, "response.model"),
            string_at(chunk, "response.id"),
        )
    }

    fn signals_tool_call(&self, chunk: &Value) -> bool {
        matches!(
            str_at(chunk, "type"),
            Some("response.output_item.added" | "response.output_item.done")
        ) && str_at(chunk, "item.type").is_some_and(|kind| TOOL_CALL_ITEMS.contains(&kind))
    }

    fn assemble(&self, merged: &MergedStream) -> Value {
        let mut body = json!({
            "id": merged.id,
            "object": "response",
            "model": merged.model,
            "status": Value::Null,
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{"type": "output_text", "text": merged.text}],
            }],
            "usage": merged.usage_value(),
        });
        match merged.finish_reason.as_deref() {
            None => {}
            Some(status @ ("completed" | "failed" | "cancelled" | "in_progress" | "queued")) => {
                body["status"] = json!(status);
            }
            Some(reason) => {
                body["status"] = json!("incomplete");
                body["incomplete_details"] = json!({"reason": reason});
            }
        }
        body
    }
}

/// Responses calls that ran the `image_generation` tool
#[derive(Debug, Clone, Default)]
pub struct ResponsesImageHandler;

impl ResponsesImageHandler {
    pub fn new() -> Self {
        Self
    }

    fn image_calls<'a>(response: &'a Value) -> impl Iterator<Item = &'a Value> + 'a {
        output_items(response, "image_generation_call")
            .filter(|item| str_at(item, "status") != Some("failed"))
    }
}

impl Handler for ResponsesImageHandler {
    handler_capabilities!(
        finish_reason,
        request_model,
        response_skipper,
        shape_matcher,
        media
    );

    fn name(&self) -> &'static str {
        "responses_image"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Image
    }

    fn endpoints(&self) -> &'static [&'static str] {
        ENDPOINTS
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        let count = Self::image_calls(response).count() as u32;
        Metrics::empty()
            .with_tokens(response.get("usage").and_then(token_metrics))
            .with_image(count)
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        string_at(response, "model")
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        let prompts = Self::image_calls(response).filter_map(|item| str_at(item, "revised_prompt"));
        join_text(prompts.map(str::to_string).chain(output_text(response)))
    }
}

impl ExtractsFinishReason for ResponsesImageHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        finish_reason_of(response)
    }
}

impl ExtractsModelFromRequest for ResponsesImageHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

impl SkipsResponse for ResponsesImageHandler {
    fn should_skip_response(&self, response: &Value) -> bool {
        is_pending(response)
    }
}

impl MatchesResponse for ResponsesImageHandler {
    fn matches_response(&self, response: &Value) -> bool {
        output_items(response, "image_generation_call").next().is_some()
    }
}

impl HasMedia for ResponsesImageHandler {
    fn collect_media(&self, _request: &ApiRequest, response: &Value) -> Vec<MediaPayload> {
        Self::image_calls(response)
            .filter_map(|item| {
                let data = str_at(item, "result")?;
                let format = str_at(item, "output_format").unwrap_or("png");
                Some(MediaPayload::inline(format!("image/{}", format), data))
            })
            .collect()
    }
}
