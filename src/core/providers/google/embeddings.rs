//! Gemini embeddings (`:embedContent`, `:batchEmbedContents`)
//!
//! The API does not report usage, so prompt tokens are estimated from the
//! request text.

use crate::core::handlers::{
    ExtractsModelFromRequest, Handler, MatchesResponse, handler_capabilities, model_from_path,
};
use crate::core::types::{ApiRequest, Metrics, ModelType, TokenMetrics};
use crate::utils::estimate_token_count;
use crate::utils::json::{array_at, u64_at};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct GeminiEmbeddingHandler;

impl GeminiEmbeddingHandler {
    pub fn new() -> Self {
        Self
    }
}

fn content_text(content: &Value) -> impl Iterator<Item = &str> {
    array_at(content, "parts")
        .iter()
        .filter_map(|p| p.get("text").and_then(Value::as_str))
}

fn request_text(request: &ApiRequest) -> String {
    let single = request.body.get("content").into_iter();
    let batch = array_at(&request.body, "requests")
        .iter()
        .filter_map(|r| r.get("content"));
    single
        .chain(batch)
        .flat_map(content_text)
        .collect::<Vec<_>>()
        .join(" ")
}

impl Handler for GeminiEmbeddingHandler {
    handler_capabilities!(request_model, shape_matcher);

    fn name(&self) -> &'static str {
        "gemini_embedding"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Embedding
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &[
            "/v1beta/models/{model}:embedContent",
            "/v1beta/models/{model}:batchEmbedContents",
        ]
    }

    fn extract_metrics(&self, request: &ApiRequest, response: &Value) -> Metrics {
        let prompt = u64_at(response, "usageMetadata.promptTokenCount").unwrap_or_else(|| {
            let text = request_text(request);
            estimate_token_count(&text)
        });
        if prompt == 0 {
            return Metrics::empty();
        }
        Metrics::from_tokens(TokenMetrics::new(prompt, 0))
    }

    fn extract_model(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_text(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_id(&self, _response: &Value) -> Option<String> {
        None
    }
}

impl ExtractsModelFromRequest for GeminiEmbeddingHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_path(request)
    }
}

impl MatchesResponse for GeminiEmbeddingHandler {
    fn matches_response(&self, response: &Value) -> bool {
        response.get("embedding").is_some() || response.get("embeddings").is_some()
    }
}
