//! Environment overrides
//!
//! Every `AI_TRACKER_*` variable overrides the matching setting. A `.env`
//! file in the working directory is read first.

use super::TrackerConfig;
use crate::core::types::PricingTier;
use crate::utils::error::{Result, TrackerError};
use std::env;
use std::str::FromStr;
use tracing::debug;

/// Points at a YAML file to load before applying overrides
pub const CONFIG_PATH_VAR: &str = "AI_TRACKER_CONFIG";

fn parse<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| TrackerError::config(format!("Invalid {}: {}", key, e)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(TrackerError::config(format!(
            "Invalid {}: expected a boolean, got '{}'",
            key, other
        ))),
    }
}

impl TrackerConfig {
    /// Load from the environment: `.env`, then an optional YAML file named by
    /// `AI_TRACKER_CONFIG`, then `AI_TRACKER_*` overrides.
    pub async fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            debug!("Loaded environment from {:?}", path);
        }

        let mut config = match env::var(CONFIG_PATH_VAR) {
            Ok(path) => Self::read_file(path).await?,
            Err(_) => Self::default(),
        };
        config.apply_env_with(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `AI_TRACKER_*` overrides read through `lookup`.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |suffix: &str| {
            let key = format!("AI_TRACKER_{}", suffix);
            lookup(&key).map(|value| (key, value))
        };

        if let Some((key, value)) = var("ENABLED") {
            self.tracking.enabled = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = var("TRACK_COSTS") {
            self.tracking.track_costs = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = var("STORE_REQUEST_PAYLOADS") {
            self.tracking.store_request_payloads = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = var("STORE_RESPONSE_TEXT") {
            self.tracking.store_response_text = parse_bool(&key, &value)?;
        }
        if let Some((key, value)) = var("PERSIST_FAILURES") {
            self.tracking.persist_failures = parse_bool(&key, &value)?;
        }

        if let Some((key, value)) = var("BUDGET_ENABLED") {
            self.budget.enabled = parse_bool(&key, &value)?;
        }
        if let Some((_, value)) = var("BUDGET_DEFAULT_PROVIDER") {
            self.budget.default_provider = Some(value.trim().to_string());
        }
        if let Some((_, value)) = var("BUDGET_DEFAULT_MODEL") {
            self.budget.default_model = Some(value.trim().to_string());
        }
        if let Some((key, value)) = var("WARNING_THRESHOLD") {
            self.budget.warning_threshold = parse(&key, &value)?;
        }
        if let Some((key, value)) = var("CRITICAL_THRESHOLD") {
            self.budget.critical_threshold = parse(&key, &value)?;
        }

        for provider in ["openai", "anthropic"] {
            let suffix = format!("{}_TIER", provider.to_ascii_uppercase());
            if let Some((key, value)) = var(&suffix) {
                let tier: PricingTier = parse(&key, &value)?;
                self.pricing.default_tiers.insert(provider.to_string(), tier);
            }
        }

        if let Some((_, value)) = var("DISABLED_PROVIDERS") {
            self.providers.disabled = value
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Some((_, value)) = var("LOG_LEVEL") {
            self.logging.level = value.trim().to_string();
        }
        if let Some((key, value)) = var("LOG_JSON") {
            self.logging.json = parse_bool(&key, &value)?;
        }
        Ok(())
    }
}
