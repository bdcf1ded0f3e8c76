//! Imagen (`:predict`)

use crate::core::handlers::{
    ExtractsModelFromRequest, Handler, HasMedia, MatchesResponse, MediaPayload,
    handler_capabilities, model_from_path,
};
use crate::core::types::{ApiRequest, Metrics, ModelType};
use crate::utils::json::{array_at, join_text, str_at};
use serde_json::Value;

#[derive(Debug, Clone, Default)]
pub struct ImagenHandler;

impl ImagenHandler {
    pub fn new() -> Self {
        Self
    }
}

fn images(response: &Value) -> impl Iterator<Item = &Value> {
    array_at(response, "predictions")
        .iter()
        .filter(|p| p.get("bytesBase64Encoded").is_some())
}

impl Handler for ImagenHandler {
    handler_capabilities!(request_model, shape_matcher, media);

    fn name(&self) -> &'static str {
        "imagen"
    }

    fn model_type(&self) -> ModelType {
        ModelType::Image
    }

    fn endpoints(&self) -> &'static [&'static str] {
        &["/v1beta/models/{model}:predict"]
    }

    fn extract_metrics(&self, _request: &ApiRequest, response: &Value) -> Metrics {
        Metrics::empty().with_image(images(response).count() as u32)
    }

    fn extract_model(&self, _response: &Value) -> Option<String> {
        None
    }

    fn extract_response_text(&self, response: &Value) -> Option<String> {
        join_text(images(response).filter_map(|p| str_at(p, "prompt")))
    }

    fn extract_response_id(&self, _response: &Value) -> Option<String> {
        None
    }
}

impl ExtractsModelFromRequest for ImagenHandler {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String> {
        model_from_path(request)
    }
}

impl MatchesResponse for ImagenHandler {
    fn matches_response(&self, response: &Value) -> bool {
        images(response).next().is_some()
    }
}

impl HasMedia for ImagenHandler {
    fn collect_media(&self, _request: &ApiRequest, response: &Value) -> Vec<MediaPayload> {
        images(response)
            .filter_map(|p| {
                let data = str_at(p, "bytesBase64Encoded")?;
                let mime = str_at(p, "mimeType").unwrap_or("image/png");
                Some(MediaPayload::inline(mime, data))
            })
            .collect()
    }
}
