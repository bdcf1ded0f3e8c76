//! Per-vendor chunk merge strategy

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Usage fields accumulated so far, in the vendor's own key names
pub type UsageMap = Map<String, Value>;

/// How the raw byte stream is framed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFraming {
    /// Server-sent events, one JSON object per `data:` event
    #[default]
    Sse,
    /// Newline-delimited JSON
    Ndjson,
}

/// Model identity reported by a chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamIdentity {
    pub model: Option<String>,
    pub id: Option<String>,
}

impl StreamIdentity {
    pub fn new(model: Option<String>, id: Option<String>) -> Option<Self> {
        if model.is_none() && id.is_none() {
            None
        } else {
            Some(Self { model, id })
        }
    }
}

/// Everything merged from a finished stream
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MergedStream {
    pub text: String,
    pub usage: UsageMap,
    pub finish_reason: Option<String>,
    pub model: Option<String>,
    pub id: Option<String>,
    pub has_tool_calls: bool,
}

impl MergedStream {
    pub fn usage_value(&self) -> Value {
        Value::Object(self.usage.clone())
    }

    pub fn text_value(&self) -> Value {
        Value::String(self.text.clone())
    }
}

/// Chunk-level merge functions supplied by a streaming-capable handler.
///
/// Every function is pure over a single parsed chunk. `usage` must overlay:
/// fields absent from the current chunk keep their previous value.
pub trait StreamMerger: Send + Sync {
    fn framing(&self) -> StreamFraming {
        StreamFraming::Sse
    }

    /// Incremental content fragment carried by this chunk
    fn text(&self, chunk: &Value) -> Option<String>;

    fn usage(&self, chunk: &Value, current: UsageMap) -> UsageMap;

    fn finish_reason(&self, chunk: &Value) -> Option<String>;

    fn model(&self, chunk: &Value) -> Option<StreamIdentity>;

    fn signals_tool_call(&self, _chunk: &Value) -> bool {
        false
    }

    /// Rebuild a body in the vendor's non-streaming shape so the handler's
    /// regular extractors can run on it.
    fn assemble(&self, merged: &MergedStream) -> Value;
}
