//! Video generation (`/v1/videos`)
//!
//! Jobs are created queued and polled until they finish; only the terminal
//! state is recorded.

use crate::core::handlers::{
    ExtractsFinishReason, ExtractsModelFromRequest, Handler, MatchesResponse, SkipsResponse,
    handler_capabilities, model_from_request_body,
};
use crate::core::types::{ApiRequest, Metrics, ModelType, VideoMetrics};
use crate::utils::json::{f64_at, str_at, string_at};
use serde_json::Value;

const ENDPOINTS: &[&str] = &["/v1/videos", "/v1/videos/{video_id}", "/v1/videos/{video_id}/remix"];

#[derive(Debug, Clone, Default)]
pub struct VideoHandler;

impl VideoHandler {
    pub fn new() -> Self {
        Self
    }
}

impl Handler for VideoHandler {
    handler_capabilities!(finish_reason, request_model, response_skipper, shape_matcher);

    fn name(&self) -> &'static str {
        "video"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Video
    }

    fn endpoints(&self) -> &'static [&'static str] {
        ENDPOINTS
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        if str_at(response, "status") != Some("completed") {
            return Metrics::empty();
        }
        Metrics::empty().with_video(VideoMetrics {
            count: 1,
            duration_seconds: f64_at(response, "seconds"),
        })
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        string_at(response, "model")
    }

    fn extract_response_text(&self, _response: &Value) -> Option<String> {
        None
    }
}

impl ExtractsFinishReason for VideoHandler {
    fn extract_finish_reason(&self, response: &Value) -> Option<String> {
        string_at(response, "status")
    }
}

impl ExtractsModelFromRequest for VideoHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request).or_else(|| Some("sora-2".to_string()))
    }
}

impl SkipsResponse for VideoHandler {
    fn should_skip_response(&self, response: &Value) -> bool {
        // listings carry no billable job
        str_at(response, "object") == Some("list")
            || matches!(str_at(response, "status"), Some("queued" | "in_progress"))
    }
}

impl MatchesResponse for VideoHandler {
    fn matches_response(&self, response: &Value) -> bool {
        str_at(response, "object") == Some("video")
    }
}
