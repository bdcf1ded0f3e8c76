//! Speech synthesis and transcription

use super::usage::token_metrics;
use crate::core::handlers::{
    ExtractsModelFromRequest, Handler, MatchesResponse, handler_capabilities,
    model_from_request_body,
};
use crate::core::types::{ApiRequest, AudioMetrics, Metrics, ModelType};
use crate::utils::json::{f64_at, str_at, string_at};
use serde_json::Value;

/// Text to speech. The response is raw audio, so usage is the character
/// count of the request's `input`.
#[derive(Debug, Clone)]
pub struct SpeechHandler {
    endpoints: &'static [&'static str],
}

impl SpeechHandler {
    pub const OPENAI_ENDPOINTS: &'static [&'static str] = &["/v1/audio/speech"];

    pub fn new(endpoints: &'static [&'static str]) -> Self {
        Self { endpoints }
    }

    pub fn openai() -> Self {
        Self::new(Self::OPENAI_ENDPOINTS)
    }
}

impl Handler for SpeechHandler {
    handler_capabilities!(request_model);

    fn name(&self) -> &'static str {
        "speech"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Tts
    }

    fn endpoints(&self) -> &'static [&'static str] {
        self.endpoints
    }

    fn extract_metrics(&self, request: &ApiRequest, _response: &Value) -> Metrics {
        let characters = request.body_str("input").map(|s| s.chars().count() as u64);
        Metrics::empty().with_audio(AudioMetrics {
            duration_seconds: None,
            input_characters: characters,
        })
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

impl ExtractsModelFromRequest for SpeechHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

/// Speech to text (transcriptions and translations).
///
/// Duration comes from `verbose_json` output or a duration-typed `usage`;
/// token-billed models report `usage.type == "tokens"` instead.
#[derive(Debug, Clone)]
pub struct TranscriptionHandler {
    endpoints: &'static [&'static str],
}

impl TranscriptionHandler {
    pub const OPENAI_ENDPOINTS: &'static [&'static str] =
        &["/v1/audio/transcriptions", "/v1/audio/translations"];

    pub fn new(endpoints: &'static [&'static str]) -> Self {
        Self { endpoints }
    }

    pub fn openai() -> Self {
        Self::new(Self::OPENAI_ENDPOINTS)
    }
}

impl Handler for TranscriptionHandler {
    handler_capabilities!(request_model, shape_matcher);

    fn name(&self) -> &'static str {
        "transcription"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Stt
    }

    fn endpoints(&self) -> &'static [&'static str] {
        self.endpoints
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        let usage = response.get("usage");
        let usage_kind = usage.and_then(|u| str_at(u, "type"));

        let duration = f64_at(response, "duration").or_else(|| match usage_kind {
            Some("duration") => usage.and_then(|u| f64_at(u, "seconds")),
            _ => None,
        });
        let tokens = match usage_kind {
            Some("tokens") | None => usage.and_then(token_metrics),
            _ => None,
        };

        let mut metrics = Metrics::empty().with_tokens(tokens);
        if duration.is_some() {
            metrics = metrics.with_audio(AudioMetrics {
                duration_seconds: duration,
                input_characters: None,
            });
        }
        metrics
    }

    fn extract_model(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        match response {
            // response_format=text|srt|vtt
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            _ => string_at(response, "text"),
        }
    }

    fn extract_response_id(&self, _response: &Value) -> Option<String> {
        None
    }
}

impl ExtractsModelFromRequest for TranscriptionHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request)
    }
}

impl MatchesResponse for TranscriptionHandler {
    fn matches_response(&self, response: &Value) -> bool {
        response.get("text").is_some() && response.get("segments").is_some()
    }
}
