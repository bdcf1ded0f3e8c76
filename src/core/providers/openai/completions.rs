//! Legacy text completions (`/v1/completions`)

use super::usage::body_token_metrics;
use crate::core::handlers::{
    ExtractsFinishReason, ExtractsModelFromRequest, Handler, handler_capabilities,
    model_from_request_body,
};
use crate::core::streaming::{MergedStream, StreamIdentity, StreamMerger, UsageMap};
use crate::core::types::{ApiRequest, Metrics, ModelType};
use crate::utils::json::{array_at, join_text, overlay_value, str_at, string_at};
use serde_json::{Value, json};

#[derive(Debug, Clone)]
pub struct CompletionHandler {
    endpoints: &'static [&'static str],
}

impl CompletionHandler {
    pub const OPENAI_ENDPOINTS: &'static [&'static str] = &["/v1/completions"];

    pub fn new(endpoints: &'static [&'static str]) -> Self {
        Self { endpoints }
    }

    pub fn openai() -> Self {
        Self::new(Self::OPENAI_ENDPOINTS)
    }
}

impl Handler for CompletionHandler {
    handler_capabilities!(finish_reason, request_model, stream_merger);

    fn name(&self) -> &'static str {
        "completion"
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
                .filter_map(|c| str_at(c, "text")),
        )
    }
}

impl ExtractsFinishReason for CompletionHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        string_at(response, "choices.0.finish_reason")
    }
}

impl ExtractsModelFromRequest for CompletionHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

impl StreamMerger for CompletionHandler {
    fn text(&self, chunk: &Value) -> Option<String> {
        string_at(chunk, "choices.0.text")
    }

    fn usage(&self, chunk: &Value, mut current: UsageMap) -> UsageMap {
        overlay_value(&mut current, chunk.get("usage"));
        current
    }

    fn finish_reason(&self, chunk: &Value) -> Option<String> {
        string_at(chunk, "choices.0.finish_reason")
    }

    fn model(&self, chunk: &Value) -> Option<StreamIdentity> {
        StreamIdentity::new(string_at(chunk, "model"), string_at(chunk, "id"))
    }

    fn assemble(&self, merged: &MergedStream) -> Value {
        json!({
            "id": merged.id,
            "object": "text_completion",
            "model": merged.model,
            "choices": [{"index": 0, "text": merged.text, "finish_reason": merged.finish_reason}],
            "usage": merged.usage_value(),
        })
    }
}
