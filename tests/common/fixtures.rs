//! Vendor fixtures
//!
//! Request bodies, response bodies and raw streaming transcripts shaped like
//! what each vendor actually sends.

use ai_usage_tracker::{ApiRequest, ApiResponse};
use bytes::Bytes;
use futures::Stream;
use serde_json::{Value, json};
use std::convert::Infallible;

pub const OPENAI_HOST: &str = "api.openai.com";
pub const ANTHROPIC_HOST: &str = "api.anthropic.com";
pub const GEMINI_HOST: &str = "generativelanguage.googleapis.com";

/// Turn network reads into a byte stream like an HTTP client would yield
pub fn byte_stream(reads: &'static [&'static str]) -> impl Stream<Item = Result<Bytes, Infallible>> {
    let items: Vec<Result<Bytes, Infallible>> = reads
        .iter()
        .map(|read| Ok(Bytes::from_static(read.as_bytes())))
        .collect();
    futures::stream::iter(items)
}

// ==================== OpenAI ====================

pub fn openai_chat_request(model: &str) -> ApiRequest {
    ApiRequest::new("POST", OPENAI_HOST, "/v1/chat/completions").with_body(json!({
        "model": model,
        "messages": [
            {"role": "system", "content": "You are terse."},
            {"role": "user", "content": "Name a prime number."}
        ]
    }))
}

pub fn openai_chat_response(prompt: u64, completion: u64) -> ApiResponse {
    ApiResponse::ok(json!({
        "id": "chatcmpl-abc123",
        "object": "chat.completion",
        "created": 1_760_000_000,
        "model": "gpt-4o-2024-08-06",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": "Seven."},
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": prompt,
            "completion_tokens": completion,
            "total_tokens": prompt + completion
        }
    }))
}

pub fn openai_stream_request() -> ApiRequest {
    ApiRequest::new("POST", OPENAI_HOST, "/v1/chat/completions").with_body(json!({
        "model": "gpt-4o",
        "stream": true,
        "stream_options": {"include_usage": true},
        "messages": [{"role": "user", "content": "Name a prime number."}]
    }))
}

/// SSE transcript with the final usage chunk `include_usage` produces. One
/// event is split across two reads.
pub const OPENAI_STREAM: &[&str] = &[
    "data: {\"id\":\"chatcmpl-s1\",\"model\":\"gpt-4o-2024-08-06\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\",\"content\":\"\"}}]}\n\n",
    "data: {\"id\":\"chatcmpl-s1\",\"model\":\"gpt-4o-2024-08-06\",\"choices\":[{\"index\":0,\"delta\":{\"content\":\"Sev\"}}]}\n\n",
    "data: {\"id\":\"chatcmpl-s1\",\"model\":\"gpt-4o-2024-08-06\",\"choices\":[{\"index\":0,",
    "\"delta\":{\"content\":\"en.\"}}]}\n\n",
    "data: {\"id\":\"chatcmpl-s1\",\"model\":\"gpt-4o-2024-08-06\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    "data: {\"id\":\"chatcmpl-s1\",\"model\":\"gpt-4o-2024-08-06\",\"choices\":[],\"usage\":{\"prompt_tokens\":14,\"completion_tokens\":3,\"total_tokens\":17}}\n\n",
    "data: [DONE]\n\n",
];

// ==================== Anthropic ====================

pub fn anthropic_request(stream: bool) -> ApiRequest {
    ApiRequest::new("POST", ANTHROPIC_HOST, "/v1/messages").with_body(json!({
        "model": "claude-sonnet-4-20250514",
        "max_tokens": 256,
        "stream": stream,
        "system": "You are terse.",
        "messages": [{"role": "user", "content": "Greet the world."}]
    }))
}

/// Input tokens arrive on `message_start`, output tokens on `message_delta`.
pub const ANTHROPIC_STREAM: &[&str] = &[
    "event: message_start\ndata: {\"type\":\"message_start\",\"message\":{\"id\":\"msg_01XY\",\"type\":\"message\",\"role\":\"assistant\",\"model\":\"claude-sonnet-4-20250514\",\"content\":[],\"stop_reason\":null,\"usage\":{\"input_tokens\":12,\"cache_read_input_tokens\":100,\"output_tokens\":1}}}\n\n",
    "event: content_block_start\ndata: {\"type\":\"content_block_start\",\"index\":0,\"content_block\":{\"type\":\"text\",\"text\":\"\"}}\n\n",
    "event: ping\ndata: {\"type\":\"ping\"}\n\n",
    "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"Hello\"}}\n\n",
    "event: content_block_delta\ndata: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\", world\"}}\n\n",
    "event: content_block_stop\ndata: {\"type\":\"content_block_stop\",\"index\":0}\n\n",
    "event: message_delta\ndata: {\"type\":\"message_delta\",\"delta\":{\"stop_reason\":\"end_turn\",\"stop_sequence\":null},\"usage\":{\"output_tokens\":7}}\n\n",
    "event: message_stop\ndata: {\"type\":\"message_stop\"}\n\n",
];

/// The same message as one non-streamed body
pub fn anthropic_full_response() -> Value {
    json!({
        "id": "msg_01XY",
        "type": "message",
        "role": "assistant",
        "model": "claude-sonnet-4-20250514",
        "content": [{"type": "text", "text": "Hello, world"}],
        "stop_reason": "end_turn",
        "usage": {"input_tokens": 12, "cache_read_input_tokens": 100, "output_tokens": 7}
    })
}

// ==================== Gemini ====================

pub const GEMINI_IMAGE_ENDPOINT: &str = "/v1beta/models/gemini-2.5-flash-image:generateContent";

pub fn gemini_text_response() -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": "A lighthouse stands on a cliff."}]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 9, "candidatesTokenCount": 8, "totalTokenCount": 17},
        "modelVersion": "gemini-2.5-flash",
        "responseId": "resp-text-1"
    })
}

pub fn gemini_image_response() -> Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [
                {"text": "Here is your lighthouse."},
                {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
            ]},
            "finishReason": "STOP"
        }],
        "usageMetadata": {"promptTokenCount": 9, "candidatesTokenCount": 1290, "totalTokenCount": 1299},
        "modelVersion": "gemini-2.5-flash-image",
        "responseId": "resp-img-1"
    })
}

pub fn gemini_image_request() -> ApiRequest {
    ApiRequest::new("POST", GEMINI_HOST, GEMINI_IMAGE_ENDPOINT).with_body(json!({
        "contents": [{"role": "user", "parts": [{"text": "Draw a lighthouse"}]}]
    }))
}

/// `streamGenerateContent?alt=sse` transcript. Usage metadata grows with each
/// chunk; the last one is authoritative.
pub const GEMINI_STREAM: &[&str] = &[
    "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"A light\"}]}}],\"usageMetadata\":{\"promptTokenCount\":9},\"modelVersion\":\"gemini-2.5-flash\",\"responseId\":\"resp-s1\"}\n\n",
    "data: {\"candidates\":[{\"content\":{\"role\":\"model\",\"parts\":[{\"text\":\"house.\"}]},\"finishReason\":\"STOP\"}],\"usageMetadata\":{\"promptTokenCount\":9,\"candidatesTokenCount\":4,\"thoughtsTokenCount\":20,\"totalTokenCount\":33},\"modelVersion\":\"gemini-2.5-flash\",\"responseId\":\"resp-s1\"}\n\n",
];

pub fn gemini_stream_request() -> ApiRequest {
    ApiRequest::from_url(
        "POST",
        "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:streamGenerateContent?alt=sse",
    )
    .expect("valid url")
    .with_body(json!({
        "contents": [{"role": "user", "parts": [{"text": "Describe a lighthouse"}]}]
    }))
}
