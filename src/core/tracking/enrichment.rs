//! Best-effort enrichment
//!
//! When a stream ends without the vendor reporting usage, token counts are
//! filled in by a [`TokenCounter`]. Failures mean "no additional data" and
//! are never propagated.

use crate::core::types::{ApiRequest, TokenMetrics};
use crate::utils::error::Result;
use crate::utils::estimate_token_count;
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Counts tokens for a piece of text, possibly by calling a vendor API
#[async_trait]
pub trait TokenCounter: Send + Sync {
    async fn count_tokens(&self, provider: &str, model: Option<&str>, text: &str) -> Result<u64>;
}

/// About four characters per token
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicTokenCounter;

#[async_trait]
impl TokenCounter for HeuristicTokenCounter {
    async fn count_tokens(&self, _provider: &str, _model: Option<&str>, text: &str) -> Result<u64> {
        Ok(estimate_token_count(text))
    }
}

/// Prompt text found in a request body: chat messages, Gemini contents,
/// system prompts and plain `prompt`/`input` fields.
pub fn request_text(body: &Value) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for key in ["system", "prompt", "input", "instructions"] {
        collect_text(body.get(key), &mut parts);
    }
    if let Some(messages) = body.get("messages").and_then(Value::as_array) {
        for message in messages {
            collect_text(message.get("content"), &mut parts);
        }
    }
    if let Some(contents) = body.get("contents").and_then(Value::as_array) {
        for content in contents {
            collect_text(content.get("parts"), &mut parts);
        }
    }
    collect_text(
        body.get("systemInstruction").and_then(|s| s.get("parts")),
        &mut parts,
    );

    parts.join("\n")
}

fn collect_text<'a>(value: Option<&'a Value>, out: &mut Vec<&'a str>) {
    match value {
        Some(Value::String(text)) => out.push(text),
        Some(Value::Array(items)) => {
            for item in items {
                match item {
                    Value::String(text) => out.push(text),
                    Value::Object(_) => {
                        collect_text(item.get("text"), out);
                        collect_text(item.get("content"), out);
                    }
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

/// Token metrics for a stream that reported none. Returns `None` when
/// counting fails or finds nothing.
pub async fn estimate_stream_tokens(
    counter: &dyn TokenCounter,
    provider: &str,
    model: Option<&str>,
    request: &ApiRequest,
    completion_text: &str,
) -> Option<TokenMetrics> {
    let prompt_text = request_text(&request.body);
    let prompt = match counter.count_tokens(provider, model, &prompt_text).await {
        Ok(count) => count,
        Err(e) => {
            debug!(provider, error = %e, "prompt token counting failed");
            return None;
        }
    };
    let completion = match counter.count_tokens(provider, model, completion_text).await {
        Ok(count) => count,
        Err(e) => {
            debug!(provider, error = %e, "completion token counting failed");
            return None;
        }
    };

    let tokens = TokenMetrics::new(prompt, completion);
    (!tokens.is_empty()).then_some(tokens)
}
