//! Capability handlers
//!
//! A [`Handler`] covers one AI capability of one vendor (chat, embeddings,
//! image generation, ...). The required methods extract usage from a full
//! response body. Optional behaviour is exposed through capability traits;
//! a handler opts in by returning `Some(self)` from the matching accessor,
//! which the [`handler_capabilities!`] macro writes for it.

pub mod endpoint;
pub mod media;

pub use endpoint::{EndpointPattern, compile_patterns, normalize_endpoint};
pub use media::{InMemoryMediaStore, MediaContext, MediaPayload, MediaStore, StoredMedia};

use crate::core::streaming::StreamMerger;
use crate::core::types::{ApiRequest, Metrics, ModelType};
use serde_json::Value;
use std::fmt;

/// Logic for one AI capability within a provider
pub trait Handler: Send + Sync + fmt::Debug {
    /// Stable handler name, used in logs and records
    fn name(&self) -> &'static str;

    fn model_type(&self) -> ModelType;

    /// Endpoint patterns this handler serves (literal or `{placeholder}`)
    fn endpoints(&self) -> &'static [&'static str];

    fn extract_metrics(&self, request: &ApiRequest, response: &Value) -> Metrics;

    fn extract_model(&self, response: &Value) -> Option<String>;

    /// Human-readable rendering of the generated content. Never used for cost.
    fn extract_response_text(&self, response: &Value) -> Option<String>;

    fn extract_response_id(&self, response: &Value) -> Option<String> {
        response.get("id").and_then(Value::as_str).map(str::to_string)
    }

    fn has_tool_calls(&self, _response: &Value) -> bool {
        false
    }

    fn finish_reason(&self) -> Option<&dyn ExtractsFinishReason> {
        None
    }

    fn request_model(&self) -> Option<&dyn ExtractsModelFromRequest> {
        None
    }

    fn response_skipper(&self) -> Option<&dyn SkipsResponse> {
        None
    }

    fn shape_matcher(&self) -> Option<&dyn MatchesResponse> {
        None
    }

    fn media(&self) -> Option<&dyn HasMedia> {
        None
    }

    fn stream_merger(&self) -> Option<&dyn StreamMerger> {
        None
    }
}

/// Reports why generation stopped
pub trait ExtractsFinishReason {
    fn extract_finish_reason(&self, response: &Value) -> Option<String>;
}

/// Reads the model from the request when the response omits it
pub trait ExtractsModelFromRequest {
    fn extract_model_from_request(&self, request: &ApiRequest) -> Option<String>;
}

/// Suppresses persistence of non-terminal responses (long-running jobs)
pub trait SkipsResponse {
    fn should_skip_response(&self, response: &Value) -> bool;
}

/// Confirms the capability from the response shape
pub trait MatchesResponse {
    fn matches_response(&self, response: &Value) -> bool;
}

/// Enumerates media that should be copied before links expire
pub trait HasMedia {
    fn collect_media(&self, request: &ApiRequest, response: &Value) -> Vec<MediaPayload>;
}

/// Writes the capability accessors of [`Handler`] for a handler that
/// implements the corresponding capability traits.
///
/// ```ignore
/// impl Handler for ChatHandler {
///     handler_capabilities!(finish_reason, stream_merger);
///     // ...
/// }
/// ```
macro_rules! handler_capabilities {
    ($($capability:ident),* $(,)?) => {
        $( handler_capabilities!(@one $capability); )*
    };
    (@one finish_reason) => {
        fn finish_reason(&self) -> Option<&dyn $crate::core::handlers::ExtractsFinishReason> {
            Some(self)
        }
    };
    (@one request_model) => {
        fn request_model(&self) -> Option<&dyn $crate::core::handlers::ExtractsModelFromRequest> {
            Some(self)
        }
    };
    (@one response_skipper) => {
        fn response_skipper(&self) -> Option<&dyn $crate::core::handlers::SkipsResponse> {
            Some(self)
        }
    };
    (@one shape_matcher) => {
        fn shape_matcher(&self) -> Option<&dyn $crate::core::handlers::MatchesResponse> {
            Some(self)
        }
    };
    (@one media) => {
        fn media(&self) -> Option<&dyn $crate::core::handlers::HasMedia> {
            Some(self)
        }
    };
    (@one stream_merger) => {
        fn stream_merger(&self) -> Option<&dyn $crate::core::streaming::StreamMerger> {
            Some(self)
        }
    };
}

pub(crate) use handler_capabilities;

/// Read the `model` field most request bodies carry.
pub fn model_from_request_body(request: &ApiRequest) -> Option<String> {
    request
        .body_str("model")
        .or_else(|| request.body_str("model_id"))
        .map(str::to_string)
}

/// Requested reasoning effort (`reasoning_effort` or `reasoning.effort`).
pub fn reasoning_effort_from_request(request: &ApiRequest) -> Option<String> {
    request
        .body_str("reasoning_effort")
        .or_else(|| {
            request
                .body
                .get("reasoning")
                .and_then(|r| r.get("effort"))
                .and_then(Value::as_str)
        })
        .map(str::to_string)
}

/// Read the model embedded in a `/models/{model}:action` style path.
pub fn model_from_path(request: &ApiRequest) -> Option<String> {
    let path = request.endpoint();
    let start = path.find("/models/")? + "/models/".len();
    let rest = &path[start..];
    let end = rest.find([':', '/']).unwrap_or(rest.len());
    let model = &rest[..end];
    if model.is_empty() { None } else { Some(model.to_string()) }
}
