//! Subscriber setup and payload redaction

use crate::config::LoggingConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

/// Environment variable that overrides the configured filter
pub const LOG_ENV_VAR: &str = "AI_TRACKER_LOG";

const REDACTED: &str = "[REDACTED]";

/// Keys whose values are always masked in stored payloads
const SENSITIVE_KEYS: &[&str] = &[
    "api_key",
    "apikey",
    "x-api-key",
    "authorization",
    "password",
    "secret",
    "access_token",
    "refresh_token",
];

static SECRET_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"sk-[A-Za-z0-9_\-]{16,}",
        r"(?i)bearer\s+[A-Za-z0-9_\-\.=]{16,}",
        r"AIza[0-9A-Za-z_\-]{30,}",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

/// Install the global tracing subscriber.
///
/// Calling this more than once is harmless; later calls leave the first
/// subscriber in place.
pub fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let result = if config.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("tracing subscriber already installed");
    }
}

/// Mask credentials in a request/response payload before it is stored.
pub fn redact_payload(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    if is_sensitive_key(k) {
                        (k.clone(), Value::String(REDACTED.to_string()))
                    } else {
                        (k.clone(), redact_payload(v))
                    }
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(redact_payload).collect()),
        Value::String(s) => Value::String(redact_str(s)),
        other => other.clone(),
    }
}

/// Mask credential-looking substrings in free text.
pub fn redact_str(input: &str) -> String {
    let mut result = input.to_string();
    for re in SECRET_PATTERNS.iter() {
        if re.is_match(&result) {
            result = re.replace_all(&result, REDACTED).into_owned();
        }
    }
    result
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|k| key == *k)
}
