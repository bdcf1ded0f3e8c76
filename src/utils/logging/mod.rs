//! Logging utilities

pub mod logging;

pub use logging::{LOG_ENV_VAR, init_logging, redact_payload, redact_str};
