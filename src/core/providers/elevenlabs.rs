//! ElevenLabs: speech synthesis billed by characters, transcription by duration

use super::provider::Provider;
use crate::core::handlers::{
    ExtractsModelFromRequest, Handler, MatchesResponse, handler_capabilities,
};
use crate::core::types::{ApiRequest, AudioMetrics, Metrics, ModelType};
use crate::utils::json::{array_at, f64_at, string_at};
use serde_json::Value;

pub const SLUG: &str = "elevenlabs";
pub const HOSTS: &[&str] = &["api.elevenlabs.io"];

const DEFAULT_TTS_MODEL: &str = "eleven_multilingual_v2";
const DEFAULT_STT_MODEL: &str = "scribe_v1";

fn model_id(request: &ApiRequest, default: &str) -> String {
    request
        .body_str("model_id")
        .unwrap_or(default)
        .to_string()
}

#[derive(Debug, Clone, Default)]
pub struct ElevenLabsSpeechHandler;

impl Handler for ElevenLabsSpeechHandler {
    handler_capabilities!(request_model);

    fn name(&self) -> &'static str {
        "elevenlabs_speech"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Tts
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &[
            "/v1/text-to-speech/{voice_id}",
            "/v1/text-to-speech/{voice_id}/stream",
            "/v1/text-to-speech/{voice_id}/with-timestamps",
        ]
    }

    fn extract_metrics(&self, request: &ApiRequest, _response: &Value) -> Metrics {
        let characters = request.body_str("text").map(|t| t.chars().count() as u64);
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

impl ExtractsModelFromRequest for ElevenLabsSpeechHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        Some(model_id(request, DEFAULT_TTS_MODEL))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ElevenLabsTranscriptionHandler;

impl Handler for ElevenLabsTranscriptionHandler {
    handler_capabilities!(request_model, shape_matcher);

    fn name(&self) -> &'static str {
        "elevenlabs_transcription"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Stt
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v1/speech-to-text"]
    }

    /// Duration is the end time of the last recognised word.
    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        let duration = array_at(response, "words")
            .iter()
            .filter_map(|w| f64_at(w, "end"))
            .fold(None, |max: Option<f64>, end| Some(max.map_or(end, |m| m.max(end))));
        match duration {
            Some(seconds) => Metrics::empty().with_audio(AudioMetrics {
                duration_seconds: Some(seconds),
                input_characters: None,
            }),
            None => Metrics::empty(),
        }
    }

    fn extract_model(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        string_at(response, "text")
    }

    fn extract_response_id(&self, response: &Value) -> Option<String> {
        string_at(response, "transcription_id")
    }
}

impl ExtractsModelFromRequest for ElevenLabsTranscriptionHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        Some(model_id(request, DEFAULT_STT_MODEL))
    }
}

impl MatchesResponse for ElevenLabsTranscriptionHandler {
    fn matches_response(&self, response: &Value) -> bool {
        response.get("language_code").is_some() && response.get("words").is_some()
    }
}

pub fn provider() -> Provider {
    Provider::builder(SLUG, "ElevenLabs")
        .hosts(HOSTS.iter().copied())
        .handler(ElevenLabsSpeechHandler)
        .handler(ElevenLabsTranscriptionHandler)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_speech_characters_and_default_model() {
        let handler = ElevenLabsSpeechHandler;
        let request = ApiRequest::new("POST", "api.elevenlabs.io", "/v1/text-to-speech/abc123/stream")
            .with_body(json!({"text": "Hello world"}));
        let audio = handler.extract_metrics(&request, &Value::Null).audio.unwrap();
        assert_eq!(audio.input_characters, Some(11));
        assert_eq!(
            handler.extract_model_from_request(&request).as_deref(),
            Some(DEFAULT_TTS_MODEL)
        );
    }

    #[test]
    fn test_transcription_duration() {
        let handler = ElevenLabsTranscriptionHandler;
        let request = ApiRequest::new("POST", "api.elevenlabs.io", "/v1/speech-to-text");
        let body = json!({
            "language_code": "en",
            "text": "hi there",
            "words": [{"text": "hi", "start": 0.1, "end": 0.4}, {"text": "there", "start": 0.5, "end": 1.25}]
        });
        let audio = handler.extract_metrics(&request, &body).audio.unwrap();
        assert_eq!(audio.duration_seconds, Some(1.25));
        assert!(handler.matches_response(&body));
        assert!(handler.extract_metrics(&request, &json!({"text": ""})).is_empty());
    }
}
