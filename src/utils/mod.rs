//! Utility modules
//!
//! - **error**: crate-wide error type
//! - **logging**: subscriber setup and payload redaction
//! - **json**: lenient accessors over vendor payloads

pub mod error;
pub mod json;
pub mod logging;

pub use error::{Result, TrackerError};

use uuid::Uuid;

/// Generate a 32-hex-character trace id
pub fn generate_trace_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Generate a 16-hex-character span id
pub fn generate_span_id() -> String {
    let bytes = Uuid::new_v4().into_bytes();
    hex::encode(&bytes[..8])
}

/// Very rough token estimate: ~4 characters per token
pub fn estimate_token_count(text: &str) -> u64 {
    (text.chars().count() as f64 / 4.0).ceil() as u64
}

/// Truncate string to specified length with ellipsis, respecting char boundaries
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_and_span_ids() {
        let trace = generate_trace_id();
        let span = generate_span_id();
        assert_eq!(trace.len(), 32);
        assert_eq!(span.len(), 16);
        assert!(trace.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(generate_trace_id(), trace);
    }

    #[test]
    fn test_estimate_token_count() {
        assert_eq!(estimate_token_count(""), 0);
        assert_eq!(estimate_token_count("abcd"), 1);
        assert_eq!(estimate_token_count("abcde"), 2);
    }

    #[test]
    fn test_truncate_string() {
        assert_eq!(truncate_string("hello", 10), "hello");
        assert_eq!(truncate_string("hello world", 8), "hello...");
        assert_eq!(truncate_string("héllo wörld", 8), "héllo...");
    }
}
