//! What the tracker records

use super::default_true;
use serde::{Deserialize, Serialize};

/// Tracking switches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Master switch. When off, calls pass through untracked.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Compute costs for finished calls
    #[serde(default = "default_true")]
    pub track_costs: bool,
    /// Keep the (redacted) request body on records
    #[serde(default = "default_true")]
    pub store_request_payloads: bool,
    /// Keep the rendered response text on records
    #[serde(default = "default_true")]
    pub store_response_text: bool,
    /// Hand failed calls to the persistence sink too
    #[serde(default = "default_true")]
    pub persist_failures: bool,
    /// Mask credentials in stored payloads
    #[serde(default = "default_true")]
    pub redact_payloads: bool,
    /// Response text longer than this is truncated on the record
    pub max_response_text_chars: Option<usize>,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            track_costs: true,
            store_request_payloads: true,
            store_response_text: true,
            persist_failures: true,
            redact_payloads: true,
            max_response_text_chars: None,
        }
    }
}
