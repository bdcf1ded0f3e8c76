//! Gemini `generateContent` / `streamGenerateContent`
//!
//! One endpoint serves text, native image output and speech output. The text
//! handler is the default; the image and speech specialists take over when the
//! returned parts carry inline data of their media type.

use crate::core::handlers::{
    ExtractsFinishReason, ExtractsModelFromRequest, Handler, HasMedia, MatchesResponse,
    MediaPayload, handler_capabilities, model_from_path,
};
use crate::core::streaming::{MergedStream, StreamIdentity, StreamMerger, UsageMap};
use crate::core::types::{ApiRequest, AudioMetrics, Metrics, ModelType, TokenMetrics};
use crate::utils::json::{array_at, join_text, overlay_value, str_at, string_at, u64_at};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Value, json};

pub(crate) const ENDPOINTS: &[&str] = &[
    "/v1beta/models/{model}:generateContent",
    "/v1beta/models/{model}:streamGenerateContent",
    "/v1/models/{model}:generateContent",
    "/v1/models/{model}:streamGenerateContent",
];

/// Parse `usageMetadata`. Thinking tokens are billed as output.
pub fn token_metrics(usage: &Value) -> Option<TokenMetrics> {
    if !usage.is_object() {
        return None;
    }
    let prompt = u64_at(usage, "promptTokenCount");
    let candidates = u64_at(usage, "candidatesTokenCount");
    let thoughts = u64_at(usage, "thoughtsTokenCount").unwrap_or(0);
    if prompt.is_none() && candidates.is_none() && thoughts == 0 {
        return None;
    }
    let tool_prompt = u64_at(usage, "toolUsePromptTokenCount").unwrap_or(0);
    let cached = u64_at(usage, "cachedContentTokenCount").unwrap_or(0);

    Some(
        TokenMetrics::new(
            prompt.unwrap_or(0) + tool_prompt,
            candidates.unwrap_or(0) + thoughts,
        )
        .with_cached(cached)
        .with_reasoning(thoughts),
    )
}

/// Every part of every candidate
pub(crate) fn parts(response: &Value) -> impl Iterator<Item = &Value> {
    array_at(response, "candidates")
        .iter()
        .flat_map(|c| array_at(c, "content.parts").iter())
}

/// `(mime_type, base64 data)` of an inline data part
pub(crate) fn inline_data(part: &Value) -> Option<(&str, &str)> {
    let inline = part.get("inlineData").or_else(|| part.get("inline_data"))?;
    let mime = str_at(inline, "mimeType").or_else(|| str_at(inline, "mime_type"))?;
    let data = str_at(inline, "data").unwrap_or("");
    Some((mime, data))
}

fn inline_parts<'a>(response: &'a Value, prefix: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
    parts(response)
        .filter_map(inline_data)
        .filter(move |(mime, _)| mime.starts_with(prefix))
}

fn is_thought(part: &Value) -> bool {
    part.get("thought").and_then(Value::as_bool).unwrap_or(false)
}

fn text_parts(response: &Value) -> impl Iterator<Item = &str> {
    parts(response)
        .filter(|p| !is_thought(p))
        .filter_map(|p| str_at(p, "text"))
}

fn response_tokens(response: &Value) -> Option<TokenMetrics> {
    response.get("usageMetadata").and_then(token_metrics)
}

fn model_version(response: &Value) -> Option<String> {
    string_at(response, "modelVersion")
}

fn candidate_finish_reason(response: &Value) -> Option<String> {
    string_at(response, "candidates.0.finishReason")
}

fn inline_media(response: &Value, prefix: &str) -> Vec<MediaPayload> {
    inline_parts(response, prefix)
        .map(|(mime, data)| MediaPayload::inline(mime, data))
        .collect()
}

/// Gemini text generation
#[derive(Debug, Clone, Default)]
pub struct GenerateContentHandler;

impl GenerateContentHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Handler for GenerateContentHandler {
    handler_capabilities!(finish_reason, request_model, stream_merger);

    fn name(&self) -> &'static str {
        "generate_content"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Text
    }

    fn endpoints(&self) -> &'static [&'static str] {
        ENDPOINTS
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        Metrics::empty().with_tokens(response_tokens(response))
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        model_version(response)
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        join_text(text_parts(response))
    }

    fn extract_response_id(&self, response: &Value) -> Option<String> {
        string_at(response, "responseId")
    }

    fn has_tool_calls(&self, response: &Value) -> bool {
        parts(response).any(|p| p.get("functionCall").is_some())
    }
}

impl ExtractsFinishReason for GenerateContentHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        candidate_finish_reason(response)
    }
}

impl ExtractsModelFromRequest for GenerateContentHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_path(request)
    }
}

impl StreamMerger for GenerateContentHandler {
    fn text(&self, chunk: &Value) -> Option<String> {
        let text: String = text_parts(chunk).collect();
        if text.is_empty() { None } else { Some(text) }
    }

    fn usage(&self, chunk: &Value, mut current: UsageMap) -> UsageMap {
        overlay_value(&mut current, chunk.get("usageMetadata"));
        current
    }

    fn finish_reason(&self, chunk: &Value) -> Option<String> {
        candidate_finish_reason(chunk)
    }

    fn model(&self, chunk: &Value) -> Option<StreamIdentity> {
        StreamIdentity::new(model_version(chunk), string_at(chunk, "responseId"))
    }

    fn signals_tool_call(&self, chunk: &Value) -> bool {
        parts(chunk).any(|p| p.get("functionCall").is_some())
    }

    fn assemble(&self, merged: &MergedStream) -> Value {
        json!({
            "responseId": merged.id,
            "modelVersion": merged.model,
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": merged.text}]},
                "finishReason": merged.finish_reason,
            }],
            "usageMetadata": merged.usage_value(),
        })
    }
}

/// Native image output (`gemini-*-image` models)
#[derive(Debug, Clone, Default)]
pub struct GenerateImageHandler;

impl GenerateImageHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Handler for GenerateImageHandler {
    handler_capabilities!(finish_reason, request_model, shape_matcher, media);

    fn name(&self) -> &'static str {
        "generate_content_image"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Image
    }

    fn endpoints(&self) -> &'static [&'static str] {
        ENDPOINTS
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        let count = inline_parts(response, "image/").count() as u32;
        Metrics::empty()
            .with_tokens(response_tokens(response))
            .with_image(count)
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        model_version(response)
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        join_text(text_parts(response))
    }

    fn extract_response_id(&self, response: &Value) -> Option<String> {
        string_at(response, "responseId")
    }
}

impl ExtractsFinishReason for GenerateImageHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        candidate_finish_reason(response)
    }
}

impl ExtractsModelFromRequest for GenerateImageHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_path(request)
    }
}

impl MatchesResponse for GenerateImageHandler {
    fn matches_response(&self, response: &Value) -> bool {
        inline_parts(response, "image/").next().is_some()
    }
}

impl HasMedia for GenerateImageHandler {
    fn collect_media(&self, _request: &ApiRequest, response: &Value) -> Vec<MediaPayload> {
        inline_media(response, "image/")
    }
}

/// Native speech output (`gemini-*-tts` models), returned as base64 PCM
#[derive(Debug, Clone, Default)]
pub struct GenerateSpeechHandler;

impl GenerateSpeechHandler {
    pub fn new() -> Self {
        Self
    }
}

/// Sample rate from a mime type such as `audio/L16;codec=pcm;rate=24000`
fn pcm_rate(mime: &str) -> Option<u32> {
    mime.split(';')
        .filter_map(|p| p.trim().strip_prefix("rate="))
        .find_map(|r| r.parse().ok())
}

/// Seconds of 16-bit mono PCM audio encoded in a base64 payload
fn pcm_duration(mime: &str, data: &str) -> Option<f64> {
    let rate = pcm_rate(mime)?;
    let bytes = STANDARD.decode(data).ok()?.len();
    Some(bytes as f64 / (f64::from(rate) * 2.0))
}

impl Handler for GenerateSpeechHandler {
    handler_capabilities!(finish_reason, request_model, shape_matcher, media);

    fn name(&self) -> &'static str {
        "generate_content_speech"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Tts
    }

    fn endpoints(&self) -> &'static [&'static str] {
        ENDPOINTS
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        let durations: Vec<f64> = inline_parts(response, "audio/")
            .filter_map(|(mime, data)| pcm_duration(mime, data))
            .collect();
        let duration = if durations.is_empty() {
            None
        } else {
            Some(durations.iter().sum())
        };
        Metrics::empty()
            .with_tokens(response_tokens(response))
            .with_audio(AudioMetrics {
                duration_seconds: duration,
                input_characters: None,
            })
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        model_version(response)
    }

    fn extract_response_text(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_id(&self, response: &Value) -> Option<String> {
        string_at(response, "responseId")
    }
}

impl ExtractsFinishReason for GenerateSpeechHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        candidate_finish_reason(response)
    }
}

impl ExtractsModelFromRequest for GenerateSpeechHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_path(request)
    }
}

impl MatchesResponse for GenerateSpeechHandler {
    fn matches_response(&self, response: &Value) -> bool {
        inline_parts(response, "audio/").next().is_some()
    }
}

impl HasMedia for GenerateSpeechHandler {
    fn collect_media(&self, _request: &ApiRequest, response: &Value) -> Vec<MediaPayload> {
        inline_media(response, "audio/")
    }
}
