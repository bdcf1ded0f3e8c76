//! Image generation, edits and variations

use super::usage::token_metrics;
use crate::core::handlers::{
    ExtractsModelFromRequest, Handler, HasMedia, MatchesResponse, MediaPayload,
    handler_capabilities, model_from_request_body,
};
use crate::core::types::{ApiRequest, Metrics, ModelType};
use crate::utils::json::{array_at, join_text, str_at, string_at};
use serde_json::Value;

/// Image handler for the OpenAI image family and compatible vendors (xAI).
///
/// The image endpoints do not echo the model, so it is read from the request
/// and falls back to the vendor's documented default.
#[derive(Debug, Clone)]
pub struct ImageHandler {
    endpoints: &'static [&'static str],
    default_model: &'static str,
}

impl ImageHandler {
    pub const OPENAI_ENDPOINTS: &'static [&'static str] = &[
        "/v1/images/generations",
        "/v1/images/edits",
        "/v1/images/variations",
    ];

    pub fn new(endpoints: &'static [&'static str], default_model: &'static str) -> Self {
        Self {
            endpoints,
            default_model,
        }
    }

    pub fn openai() -> Self {
        Self::new(Self::OPENAI_ENDPOINTS, "dall-e-2")
    }
}

impl Handler for ImageHandler {
    handler_capabilities!(request_model, shape_matcher, media);

    fn name(&self) -> &'static str {
        "image_generation"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Image
    }

    fn endpoints(&self) -> &'static [&'static str] {
        self.endpoints
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        let count = array_at(response, "data").len() as u32;
        Metrics::empty()
            .with_tokens(response.get("usage").and_then(token_metrics))
            .with_image(count)
    }

    fn extract_model(&self, response: &Value) -> Option<String> {
        string_at(response, "model")
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        join_text(
            array_at(response, "data")
                .iter()
                .filter_map(|d| str_at(d, "revised_prompt")),
        )
    }

    fn extract_response_id(&self, _response: &Value) -> Option<String> {
        None
    }
}

impl ExtractsModelFromRequest for ImageHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_request_body(request).or_else(|| Some(self.default_model.to_string()))
    }
}

impl MatchesResponse for ImageHandler {
    fn matches_response(&self, response: &Value) -> bool {
        response.get("created").is_some()
            && array_at(response, "data")
                .first()
                .is_some_and(|d| d.get("url").is_some() || d.get("b64_json").is_some())
    }
}

impl HasMedia for ImageHandler {
    fn collect_media(&self, request: &ApiRequest, response: &Value) -> Vec<MediaPayload> {
        let mime = format!("image/{}", request.body_str("output_format").unwrap_or("png"));
        array_at(response, "data")
            .iter()
            .filter_map(|d| {
                if let Some(url) = str_at(d, "url") {
                    Some(MediaPayload::url(url, None))
                } else {
                    str_at(d, "b64_json").map(|data| MediaPayload::inline(mime.clone(), data))
                }
            })
            .collect()
    }
}
