//! Veo long-running video generation
//!
//! `:predictLongRunning` returns an operation that is polled under
//! `/models/{model}/operations/{id}` until `done`.

use crate::core::handlers::{
    ExtractsModelFromRequest, Handler, HasMedia, MatchesResponse, MediaPayload, SkipsResponse,
    handler_capabilities, model_from_path,
};
use crate::core::types::{ApiRequest, Metrics, ModelType, VideoMetrics};
use crate::utils::json::{array_at, f64_at, get_path, str_at, string_at};
use serde_json::Value;

/// Clip length Veo produces when the request does not set one
pub const DEFAULT_CLIP_SECONDS: f64 = 8.0;

const SAMPLES: &str = "response.generateVideoResponse.generatedSamples";

#[derive(Debug, Clone, Default)]
pub struct VeoHandler;

impl VeoHandler {
    pub fn new() -> Self {
        Self
    }
}

fn is_done(response: &Value) -> bool {
    response.get("done").and_then(Value::as_bool).unwrap_or(false)
}

impl Handler for VeoHandler {
    handler_capabilities!(request_model, response_skipper, shape_matcher, media);

    fn name(&self) -> &'static str {
        "veo"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Video
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &[
            "/v1beta/models/{model}:predictLongRunning",
            "/v1beta/models/{model}/operations/{operation}",
        ]
    }

    fn extract_metrics(&self, request: &ApiRequest, response: &Value) -> Metrics {
        let count = array_at(response, SAMPLES).len() as u32;
        if !is_done(response) || count == 0 {
            return Metrics::empty();
        }
        let seconds = f64_at(&request.body, "parameters.durationSeconds").unwrap_or(DEFAULT_CLIP_SECONDS);
        Metrics::empty().with_video(VideoMetrics {
            count,
            duration_seconds: Some(seconds * f64::from(count)),
        })
    }

    fn extract_model(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_text(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_id(&self, response: &Value) -> Option<String> {
        string_at(response, "name")
    }
}

impl ExtractsModelFromRequest for VeoHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_path(request)
    }
}

impl SkipsResponse for VeoHandler {
    fn should_skip_response(&self, response: &Value) -> bool {
        !is_done(response)
    }
}

impl MatchesResponse for VeoHandler {
    fn matches_response(&self, response: &Value) -> bool {
        get_path(response, "response.generateVideoResponse").is_some()
    }
}

impl HasMedia for VeoHandler {
    fn collect_media(&self, _request: &ApiRequest, response: &Value) -> Vec<MediaPayload> {
        array_at(response, SAMPLES)
            .iter()
            .filter_map(|s| str_at(s, "video.uri"))
            .map(|uri| MediaPayload::url(uri, Some("video/mp4")))
            .collect()
    }
}
