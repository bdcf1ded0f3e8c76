//! Embeddings (`/v1/embeddings`)

use crate::core::handlers::{
    ExtractsModelFromRequest, Handler, MatchesResponse, handler_capabilities, model_from_request_body,
};
use crate::core::types::{ApiRequest, Metrics, ModelType, TokenMetrics};
use crate::utils::json::{first_u64, str_at, string_at};
use serde_json::Value;

/// Embedding handler. Embeddings bill input tokens only.
#[derive(Debug, Clone)]
pub struct EmbeddingHandler {
    endpoints: &'static [&'static str],
}

impl EmbeddingHandler {
    pub const OPENAI_ENDPOINTS: &'static [&'static str] = &["/v1/embeddings"];

    pub fn new(endpoints: &'static [&'static str]) -> Self {
        Self { endpoints }
    }

    pub fn openai() -> Self {
        Self::new(Self::OPENAI_ENDPOINTS)
    }
}

impl Handler for EmbeddingHandler {
    handler_capabilities!(request_model, shape_matcher);

    fn name(&self) -> &'static str {
        "embedding"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Embedding
    }

    fn endpoints(&self) -> &'static [&'static str] {
        self.endpoints
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        let prompt = first_u64(response, &["usage.prompt_tokens", "usage.total_tokens"]);
        Metrics::empty().with_tokens(prompt.map(|p| TokenMetrics::new(p, 0)))
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        string_at(response, "model")
    }

    fn extract_response_text(&self, _response: &Value) -> Option<String> {
        None
    }
}

impl ExtractsModelFromRequest for EmbeddingHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

impl MatchesResponse for EmbeddingHandler {
    fn matches_response(&self, response: &Value) -> bool {
        str_at(response, "data.0.object") == Some("embedding")
    }
}
