//! Cost calculator
//!
//! Turns extracted metrics into cents. Unknown models cost zero: pricing gaps
//! are logged, never raised.

use super::lookup::{PricingLookup, PricingOverrides};
use super::types::{BillingUnit, CostBreakdown, PricingEntry};
use crate::core::types::{Metrics, PricingTier, TokenMetrics};
use crate::utils::estimate_token_count;
use std::collections::HashMap;
use tracing::debug;

const PER_MILLION: f64 = 1_000_000.0;

/// Providers whose unspecified tier follows the configured default
const TIERED_PROVIDERS: &[&str] = &["openai", "anthropic"];

/// A rough pre-call cost range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimate {
    /// Input only
    pub min_cost: f64,
    /// Input plus the full output allowance
    pub max_cost: f64,
}

#[derive(Debug, Clone)]
pub struct CostCalculator {
    lookup: PricingLookup,
    default_tiers: HashMap<String, PricingTier>,
}

impl Default for CostCalculator {
    fn default() -> Self {
        Self::new(PricingLookup::builtin())
    }
}

impl CostCalculator {
    pub fn new(lookup: PricingLookup) -> Self {
        Self {
            lookup,
            default_tiers: HashMap::new(),
        }
    }

    /// Built-in tables with configured overrides and default tiers
    pub fn with_overrides(
        overrides: &PricingOverrides,
        default_tiers: &HashMap<String, PricingTier>,
    ) -> Self {
        let mut lookup = PricingLookup::builtin();
        lookup.apply_overrides(overrides);
        let mut calculator = Self::new(lookup);
        for (provider, tier) in default_tiers {
            calculator = calculator.with_default_tier(provider, *tier);
        }
        calculator
    }

    pub fn with_default_tier(mut self, provider: &str, tier: PricingTier) -> Self {
        self.default_tiers.insert(provider.to_string(), tier);
        self
    }

    pub fn lookup(&self) -> &PricingLookup {
        &self.lookup
    }

    /// Tier to price a call at. An explicit tier always wins; otherwise
    /// OpenAI and Anthropic use their configured default and everyone else
    /// uses standard.
    pub fn resolve_tier(&self, provider: &str, requested: Option<PricingTier>) -> PricingTier {
        if let Some(tier) = requested {
            return tier;
        }
        if TIERED_PROVIDERS.contains(&provider) {
            return self.default_tiers.get(provider).copied().unwrap_or_default();
        }
        PricingTier::Standard
    }

    /// Token cost. Regular prompt tokens are `prompt - cached`.
    pub fn calculate(
        &self,
        provider: &str,
        model: &str,
        prompt_tokens: u64,
        completion_tokens: u64,
        cached_tokens: u64,
        tier: Option<PricingTier>,
    ) -> CostBreakdown {
        let tokens = TokenMetrics::new(prompt_tokens, completion_tokens).with_cached(cached_tokens);
        self.calculate_metrics(provider, model, &Metrics::from_tokens(tokens), tier)
    }

    /// Cost of everything in `metrics`: tokens, cache writes and unit billing.
    pub fn calculate_metrics(
        &self,
        provider: &str,
        model: &str,
        metrics: &Metrics,
        tier: Option<PricingTier>,
    ) -> CostBreakdown {
        let tier = self.resolve_tier(provider, tier);
        let mut breakdown = CostBreakdown::zero(provider, model, tier);

        let Some(resolved) = self.lookup.resolve(provider, model) else {
            debug!(provider, model, "no pricing for model, cost is zero");
            return breakdown;
        };
        let Some(entry) = resolved.pricing.entry(tier) else {
            debug!(provider, model, tier = %tier, "no pricing for tier, cost is zero");
            return breakdown;
        };

        breakdown.pricing_model = Some(resolved.model.unwrap_or("default").to_string());
        if let Some(tokens) = &metrics.tokens {
            breakdown.prompt_cost = prompt_cost(entry, tokens);
            breakdown.completion_cost = tokens.completion_tokens as f64 * entry.output / PER_MILLION;
        }
        breakdown.unit_cost = unit_cost(entry, metrics);
        breakdown.calculate_total();
        breakdown
    }

    /// Estimate a call before it is made from its prompt text.
    pub fn estimate(
        &self,
        provider: &str,
        model: &str,
        prompt: &str,
        max_output_tokens: Option<u64>,
        tier: Option<PricingTier>,
    ) -> CostEstimate {
        let prompt_tokens = estimate_token_count(prompt);
        let input = self.calculate(provider, model, prompt_tokens, 0, 0, tier);
        let full = self.calculate(
            provider,
            model,
            prompt_tokens,
            max_output_tokens.unwrap_or(0),
            0,
            tier,
        );
        CostEstimate {
            min_cost: input.total_cost,
            max_cost: full.total_cost,
        }
    }
}

/// Regular, cache-read and cache-write input. Cache writes without a
/// dedicated rate cost the regular input rate.
fn prompt_cost(entry: &PricingEntry, tokens: &TokenMetrics) -> f64 {
    let regular = tokens.regular_prompt_tokens() as f64 * entry.input;
    let cached = tokens.cached_tokens as f64 * entry.cached_input_price();
    let one_hour = tokens.cache_creation_1h_tokens.min(tokens.cache_creation_tokens);
    let five_minute = tokens.cache_creation_tokens - one_hour;
    let writes = five_minute as f64 * entry.cache_write_5m.unwrap_or(entry.input)
        + one_hour as f64 * entry.cache_write_1h.unwrap_or(entry.input);
    (regular + cached + writes) / PER_MILLION
}

fn unit_cost(entry: &PricingEntry, metrics: &Metrics) -> f64 {
    let (Some(unit), Some(price)) = (entry.unit, entry.per_unit) else {
        return 0.0;
    };
    let audio_seconds = metrics.audio.and_then(|a| a.duration_seconds);
    let video_seconds = metrics.video.and_then(|v| v.duration_seconds);
    let units = match unit {
        BillingUnit::Characters => metrics
            .audio
            .and_then(|a| a.input_characters)
            .map(|c| c as f64 / PER_MILLION),
        BillingUnit::Minute => audio_seconds.or(video_seconds).map(|s| s / 60.0),
        BillingUnit::Second => video_seconds.or(audio_seconds),
        BillingUnit::Image => metrics.image.map(|i| f64::from(i.count)),
        BillingUnit::Video => metrics.video.map(|v| f64::from(v.count)),
    };
    units.map(|u| u.max(0.0) * price).unwrap_or(0.0)
}
