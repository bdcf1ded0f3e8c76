//! Pricing configuration

use crate::core::cost::PricingOverrides;
use crate::core::types::PricingTier;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default tiers and custom prices merged over the built-in tables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Provider slug → tier used when a call names none. Only OpenAI and
    /// Anthropic honour this.
    pub default_tiers: HashMap<String, PricingTier>,
    /// Provider → model → tier → price entry
    pub overrides: PricingOverrides,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            default_tiers: [
                ("openai".to_string(), PricingTier::Standard),
                ("anthropic".to_string(), PricingTier::Standard),
            ]
            .into_iter()
            .collect(),
            overrides: HashMap::new(),
        }
    }
}
