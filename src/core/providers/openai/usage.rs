//! OpenAI-shaped usage objects
//!
//! Shared by every vendor that speaks the OpenAI wire format.

use crate::core::types::TokenMetrics;
use crate::utils::json::{first_u64, get_path};
use serde_json::Value;

/// Parse a `usage` object in either the chat (`prompt_tokens`) or the
/// responses (`input_tokens`) dialect.
pub fn token_metrics(usage: &Value) -> Option<TokenMetrics> {
    if !usage.is_object() {
        return None;
    }
    let prompt = first_u64(usage, &["prompt_tokens", "input_tokens"]);
    let completion = first_u64(usage, &["completion_tokens", "output_tokens"]);
    if prompt.is_none() && completion.is_none() {
        return None;
    }

    let cached = first_u64(
        usage,
        &[
            "prompt_tokens_details.cached_tokens",
            "input_tokens_details.cached_tokens",
            // DeepSeek
            "prompt_cache_hit_tokens",
        ],
    )
    .unwrap_or(0);
    let reasoning = first_u64(
        usage,
        &[
            "completion_tokens_details.reasoning_tokens",
            "output_tokens_details.reasoning_tokens",
        ],
    )
    .unwrap_or(0);

    Some(
        TokenMetrics::new(prompt.unwrap_or(0), completion.unwrap_or(0))
            .with_cached(cached)
            .with_reasoning(reasoning),
    )
}

/// Usage of a full body: top-level `usage`, or Groq's `x_groq.usage`.
pub fn body_token_metrics(body: &Value) -> Option<TokenMetrics> {
    body.get("usage")
        .and_then(token_metrics)
        .or_else(|| get_path(body, "x_groq.usage").and_then(token_metrics))
}
