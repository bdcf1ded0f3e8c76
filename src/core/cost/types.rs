//! Pricing and cost types
//!
//! All prices are in cents. Token prices are per million tokens; unit prices
//! are per [`BillingUnit`].

use crate::core::types::{CostFields, PricingTier};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a flat unit price is charged against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingUnit {
    /// Audio duration in minutes
    Minute,
    /// Audio or video duration in seconds
    Second,
    /// Input characters, priced per million like tokens
    Characters,
    /// Generated images
    Image,
    /// Generated videos
    Video,
}

/// Price of one model at one tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingEntry {
    /// Cents per 1M regular input tokens
    #[serde(default)]
    pub input: f64,
    /// Cents per 1M output tokens
    #[serde(default)]
    pub output: f64,
    /// Cents per 1M cache-read tokens. Falls back to `input`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_input: Option<f64>,
    /// Cents per 1M tokens written to a 5-minute cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write_5m: Option<f64>,
    /// Cents per 1M tokens written to a 1-hour cache
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_write_1h: Option<f64>,
    /// Cents per unit for duration, character or count billing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_unit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<BillingUnit>,
}

impl PricingEntry {
    pub const fn tokens(input: f64, output: f64) -> Self {
        Self {
            input,
            output,
            cached_input: None,
            cache_write_5m: None,
            cache_write_1h: None,
            per_unit: None,
            unit: None,
        }
    }

    pub const fn with_cache(input: f64, output: f64, cached: f64) -> Self {
        let mut entry = Self::tokens(input, output);
        entry.cached_input = Some(cached);
        entry
    }

    pub const fn per_unit(unit: BillingUnit, price: f64) -> Self {
        let mut entry = Self::tokens(0.0, 0.0);
        entry.per_unit = Some(price);
        entry.unit = Some(unit);
        entry
    }

    pub const fn cache_writes(mut self, five_minute: f64, one_hour: f64) -> Self {
        self.cache_write_5m = Some(five_minute);
        self.cache_write_1h = Some(one_hour);
        self
    }

    /// Same entry at `factor` of the price, e.g. batch discounts
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            input: self.input * factor,
            output: self.output * factor,
            cached_input: self.cached_input.map(|p| p * factor),
            cache_write_5m: self.cache_write_5m.map(|p| p * factor),
            cache_write_1h: self.cache_write_1h.map(|p| p * factor),
            per_unit: self.per_unit.map(|p| p * factor),
            unit: self.unit,
        }
    }

    pub fn cached_input_price(&self) -> f64 {
        self.cached_input.unwrap_or(self.input)
    }

    /// Any price below zero
    pub fn has_negative_price(&self) -> bool {
        [
            Some(self.input),
            Some(self.output),
            self.cached_input,
            self.cache_write_5m,
            self.cache_write_1h,
            self.per_unit,
        ]
        .into_iter()
        .flatten()
        .any(|p| p < 0.0)
    }
}

/// Per-tier prices of one model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelPricing {
    tiers: HashMap<PricingTier, PricingEntry>,
}

impl ModelPricing {
    pub fn standard(entry: PricingEntry) -> Self {
        Self::default().tier(PricingTier::Standard, entry)
    }

    pub fn tier(mut self, tier: PricingTier, entry: PricingEntry) -> Self {
        self.tiers.insert(tier, entry);
        self
    }

    /// Standard entry plus a batch tier at half price
    pub fn with_batch_discount(self) -> Self {
        match self.tiers.get(&PricingTier::Standard).copied() {
            Some(standard) => self.tier(PricingTier::Batch, standard.scaled(0.5)),
            None => self,
        }
    }

    /// Entry for `tier`, falling back to standard.
    pub fn entry(&self, tier: PricingTier) -> Option<&PricingEntry> {
        self.tiers
            .get(&tier)
            .or_else(|| self.tiers.get(&PricingTier::Standard))
    }

    pub fn has_tier(&self, tier: PricingTier) -> bool {
        self.tiers.contains_key(&tier)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&PricingTier, &PricingEntry)> {
        self.tiers.iter()
    }

    /// Merge `other` over this pricing, tier by tier.
    pub fn merge(&mut self, other: &ModelPricing) {
        for (tier, entry) in &other.tiers {
            self.tiers.insert(*tier, *entry);
        }
    }
}

/// One vendor's price table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProviderPricing {
    pub provider: String,
    /// Used when no model matches
    pub default_pricing: Option<ModelPricing>,
    pub model_pricing: HashMap<String, ModelPricing>,
}

impl ProviderPricing {
    pub fn new(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            default_pricing: None,
            model_pricing: HashMap::new(),
        }
    }

    pub fn model(mut self, name: &str, pricing: ModelPricing) -> Self {
        self.model_pricing.insert(name.to_string(), pricing);
        self
    }

    /// Register several models sharing the same price
    pub fn models(mut self, names: &[&str], pricing: ModelPricing) -> Self {
        for name in names {
            self.model_pricing.insert((*name).to_string(), pricing.clone());
        }
        self
    }

    pub fn default_pricing(mut self, pricing: ModelPricing) -> Self {
        self.default_pricing = Some(pricing);
        self
    }
}

/// Cost of one call, in cents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub provider: String,
    /// Model as requested
    pub model: String,
    /// Price table key the model resolved to
    pub pricing_model: Option<String>,
    pub tier: PricingTier,
    /// Regular, cached and cache-write input tokens
    pub prompt_cost: f64,
    pub completion_cost: f64,
    /// Duration, character and count billing
    pub unit_cost: f64,
    pub total_cost: f64,
}

impl CostBreakdown {
    pub fn zero(provider: &str, model: &str, tier: PricingTier) -> Self {
        Self {
            provider: provider.to_string(),
            model: model.to_string(),
            pricing_model: None,
            tier,
            prompt_cost: 0.0,
            completion_cost: 0.0,
            unit_cost: 0.0,
            total_cost: 0.0,
        }
    }

    pub fn calculate_total(&mut self) {
        self.total_cost = self.prompt_cost + self.completion_cost + self.unit_cost;
    }

    /// Whether pricing was found for the model
    pub fn is_priced(&self) -> bool {
        self.pricing_model.is_some()
    }
}

impl From<&CostBreakdown> for CostFields {
    /// Unit billing counts as output: the generated speech, image or video.
    fn from(breakdown: &CostBreakdown) -> Self {
        CostFields::new(
            breakdown.prompt_cost,
            breakdown.completion_cost + breakdown.unit_cost,
        )
    }
}
