//! Section validators

use super::trait_def::Validate;
use crate::config::TrackerConfig;
use crate::config::models::*;
use crate::core::budget::BudgetConfig;
use std::collections::HashSet;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

const TIERED_PROVIDERS: &[&str] = &["openai", "anthropic"];

impl Validate for TrackerConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating tracker configuration");

        self.tracking
            .validate()
            .map_err(|e| format!("tracking: {}", e))?;
        self.pricing.validate().map_err(|e| format!("pricing: {}", e))?;
        self.budget.validate().map_err(|e| format!("budget: {}", e))?;
        self.providers
            .validate()
            .map_err(|e| format!("providers: {}", e))?;
        self.logging.validate().map_err(|e| format!("logging: {}", e))?;

        if !self.tracking.track_costs && self.budget.enabled && !self.budget.budgets.is_empty() {
            warn!("cost tracking is disabled, cost limits will never be reached");
        }
        Ok(())
    }
}

impl Validate for TrackingConfig {
    fn validate(&self) -> Result<(), String> {
        if self.max_response_text_chars == Some(0) {
            return Err("max_response_text_chars must be greater than 0".to_string());
        }
        Ok(())
    }
}

impl Validate for PricingSettings {
    fn validate(&self) -> Result<(), String> {
        for provider in self.default_tiers.keys() {
            if !TIERED_PROVIDERS.contains(&provider.as_str()) {
                warn!(
                    provider = %provider,
                    "default tier ignored, only openai and anthropic use configured tiers"
                );
            }
        }

        for (provider, models) in &self.overrides {
            if provider.trim().is_empty() {
                return Err("override provider cannot be empty".to_string());
            }
            for (model, pricing) in models {
                if model.trim().is_empty() {
                    return Err(format!("override for {} has an empty model name", provider));
                }
                for (tier, entry) in pricing.entries() {
                    if entry.has_negative_price() {
                        return Err(format!(
                            "negative price for {}/{} at tier {}",
                            provider, model, tier
                        ));
                    }
                    if entry.per_unit.is_some() != entry.unit.is_some() {
                        return Err(format!(
                            "{}/{} at tier {} must set per_unit and unit together",
                            provider, model, tier
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

fn validate_thresholds(warning: f64, critical: f64) -> Result<(), String> {
    for (name, value) in [("warning_threshold", warning), ("critical_threshold", critical)] {
        if !(value > 0.0 && value <= 100.0) {
            return Err(format!("{} must be in (0, 100], got {}", name, value));
        }
    }
    if warning > critical {
        return Err(format!(
            "warning_threshold ({}) cannot exceed critical_threshold ({})",
            warning, critical
        ));
    }
    Ok(())
}

impl Validate for BudgetSettings {
    fn validate(&self) -> Result<(), String> {
        validate_thresholds(self.warning_threshold, self.critical_threshold)?;

        if self.default_model.is_some() && self.default_provider.is_none() {
            return Err("default_model requires default_provider".to_string());
        }

        let mut subjects = HashSet::new();
        for budget in &self.budgets {
            budget.validate()?;
            let key = (budget.trackable_type.as_str(), budget.trackable_id.as_deref());
            if budget.enabled && !subjects.insert(key) {
                return Err(format!(
                    "duplicate budget for {}:{}",
                    budget.trackable_type,
                    budget.trackable_id.as_deref().unwrap_or("*")
                ));
            }
        }
        Ok(())
    }
}

impl Validate for BudgetConfig {
    fn validate(&self) -> Result<(), String> {
        if self.trackable_type.trim().is_empty() {
            return Err("budget trackable_type cannot be empty".to_string());
        }
        let name = format!(
            "{}:{}",
            self.trackable_type,
            self.trackable_id.as_deref().unwrap_or("*")
        );

        let cost_limits = [
            self.limits.daily_limit,
            self.limits.weekly_limit,
            self.limits.monthly_limit,
            self.limits.total_limit,
        ];
        if cost_limits.into_iter().flatten().any(|l| l < 0.0) {
            return Err(format!("budget {} has a negative cost limit", name));
        }

        if self.warning_threshold.is_some() || self.critical_threshold.is_some() {
            validate_thresholds(
                self.warning_threshold.unwrap_or(crate::core::budget::DEFAULT_WARNING_THRESHOLD),
                self.critical_threshold
                    .unwrap_or(crate::core::budget::DEFAULT_CRITICAL_THRESHOLD),
            )
            .map_err(|e| format!("budget {}: {}", name, e))?;
        }

        if self.limits.is_empty()
            && self.allowed_providers.is_empty()
            && self.allowed_models.is_empty()
        {
            warn!(budget = %name, "budget has no limits or allow-lists");
        }
        Ok(())
    }
}

impl Validate for ProvidersConfig {
    fn validate(&self) -> Result<(), String> {
        for (slug, hosts) in &self.extra_hosts {
            if slug.trim().is_empty() {
                return Err("extra_hosts has an empty provider slug".to_string());
            }
            for host in hosts {
                if host.trim().is_empty() {
                    return Err(format!("extra host for {} cannot be empty", slug));
                }
                if host.contains("://") || host.contains('/') {
                    return Err(format!(
                        "extra host '{}' for {} must be a bare host, not a URL",
                        host, slug
                    ));
                }
            }
            if self.disabled.contains(slug) {
                warn!(provider = %slug, "extra hosts configured for a disabled provider");
            }
        }
        Ok(())
    }
}

impl Validate for LoggingConfig {
    fn validate(&self) -> Result<(), String> {
        EnvFilter::try_new(&self.level)
            .map(|_| ())
            .map_err(|e| format!("invalid level '{}': {}", self.level, e))
    }
}
