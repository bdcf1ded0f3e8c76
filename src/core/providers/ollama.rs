//! Ollama
//!
//! The native API streams newline-delimited JSON and reports usage as
//! `prompt_eval_count` / `eval_count` on the final (`done: true`) object.
//! The OpenAI-compatible `/v1` paths reuse the OpenAI handlers.

use super::openai::{ChatCompletionHandler, CompletionHandler, EmbeddingHandler};
use super::provider::Provider;
use crate::core::handlers::{
    ExtractsFinishReason, ExtractsModelFromRequest, Handler, handler_capabilities,
    model_from_request_body,
};
use crate::core::streaming::{MergedStream, StreamFraming, StreamIdentity, StreamMerger, UsageMap};
use crate::core::types::{ApiRequest, Metrics, ModelType, TokenMetrics};
use crate::utils::json::{array_at, get_path, str_at, string_at, u64_at};
use serde_json::{Map, Value, json};

pub const SLUG: &str = "ollama";
pub const HOSTS: &[&str] = &["localhost:11434", "127.0.0.1:11434"];

const USAGE_FIELDS: &[&str] = &["prompt_eval_count", "eval_count"];

fn token_metrics(body: &Value) -> Option<TokenMetrics> {
    let prompt = u64_at(body, "prompt_eval_count");
    let completion = u64_at(body, "eval_count");
    if prompt.is_none() && completion.is_none() {
        return None;
    }
    Some(TokenMetrics::new(prompt.unwrap_or(0), completion.unwrap_or(0)))
}

/// Where the generated text lives in a native response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeApi {
    /// `/api/chat`: `message.content`
    Chat,
    /// `/api/generate`: `response`
    Generate,
}

/// Native text generation handler
#[derive(Debug, Clone)]
pub struct OllamaHandler {
    api: NativeApi,
}

impl OllamaHandler {
    pub fn chat() -> Self {
        Self {
            api: NativeApi::Chat,
        }
    }

    pub fn generate() -> Self {
        Self {
            api: NativeApi::Generate,
        }
    }

    fn text_path(&self) -> &'static str {
        match self.api {
            NativeApi::Chat => "message.content",
            NativeApi::Generate => "response",
        }
    }
}

impl Handler for OllamaHandler {
    handler_capabilities!(finish_reason, request_model, stream_merger);

    fn name(&self) -> &'static str {
        match self.api {
            NativeApi::Chat => "ollama_chat",
            NativeApi::Generate => "ollama_generate",
        }
    }

    fn model_type(&self) -> ModelType {
        ModelType::Text
    }

    fn endpoints(&self) -> &'static [&'static str] {
        match self.api {
            NativeApi::Chat => &["/api/chat"],
            NativeApi::Generate => &["/api/generate"],
        }
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        Metrics::empty().with_tokens(token_metrics(response))
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        string_at(response, "model")
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        string_at(response, self.text_path()).filter(|t| !t.is_empty())
    }

    fn extract_response_id(&self, _response: &Value) -> Option<String> {
        None
    }

    fn has_tool_calls(&self, response: &Value) -> bool {
        !array_at(response, "message.tool_calls").is_empty()
    }
}

impl ExtractsFinishReason for OllamaHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        string_at(response, "done_reason")
    }
}

impl ExtractsModelFromRequest for OllamaHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

impl StreamMerger for OllamaHandler {
    fn framing(&self) -> StreamFraming {
        StreamFraming::Ndjson
    }

    fn text(&self, chunk: &Value) -> Option<String> {
        string_at(chunk, self.text_path())
    }

    fn usage(&self, chunk: &Value, mut current: UsageMap) -> UsageMap {
        for field in USAGE_FIELDS {
            if let Some(value) = chunk.get(*field).filter(|v| !v.is_null()) {
                current.insert((*field).to_string(), value.clone());
            }
        }
        current
    }

    fn finish_reason(&self, chunk: &Value) -> Option<String> {
        if chunk.get("done").and_then(Value::as_bool) == Some(true) {
            string_at(chunk, "done_reason")
        } else {
            None
        }
    }

    fn model(&self, chunk: &Value) -> Option<StreamIdentity> {
        StreamIdentity::new(string_at(chunk, "model"), None)
    }

    fn signals_tool_call(&self, chunk: &Value) -> bool {
        get_path(chunk, "message.tool_calls").is_some()
    }

    fn assemble(&self, merged: &MergedStream) -> Value {
        let mut body = Map::new();
        body.insert("model".into(), json!(merged.model));
        match self.api {
            NativeApi::Chat => {
                body.insert(
                    "message".into(),
                    json!({"role": "assistant", "content": merged.text}),
                );
            }
            NativeApi::Generate => {
                body.insert("response".into(), json!(merged.text));
            }
        }
        body.insert("done".into(), json!(true));
        body.insert("done_reason".into(), json!(merged.finish_reason));
        for (key, value) in &merged.usage {
            body.insert(key.clone(), value.clone());
        }
        Value::Object(body)
    }
}

/// Native embeddings (`/api/embed`, legacy `/api/embeddings`)
#[derive(Debug, Clone, Default)]
pub struct OllamaEmbedHandler;

impl Handler for OllamaEmbedHandler {
    handler_capabilities!(request_model);

    fn name(&self) -> &'static str {
        "ollama_embed"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Embedding
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/api/embed", "/api/embeddings"]
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        let prompt = u64_at(response, "prompt_eval_count");
        Metrics::empty().with_tokens(prompt.map(|p| TokenMetrics::new(p, 0)))
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        str_at(response, "model").map(str::to_string)
    }

    fn extract_response_text(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_id(&self, _response: &Value) -> Option<String> {
        None
    }
}

impl ExtractsModelFromRequest for OllamaEmbedHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

pub fn provider() -> Provider {
    Provider::builder(SLUG, "Ollama")
        .hosts(HOSTS.iter().copied())
        .handler(OllamaHandler::chat())
        .handler(OllamaHandler::generate())
        .handler(OllamaEmbedHandler)
        .handler(ChatCompletionHandler::openai())
        .handler(CompletionHandler::openai())
        .handler(EmbeddingHandler::openai())
        .build()
}
