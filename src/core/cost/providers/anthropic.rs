//! Anthropic list prices
//!
//! Cache writes cost 1.25x input for the 5-minute cache and 2x for the
//! 1-hour cache. Cache reads cost 0.1x. Batch is half price throughout.

use crate::core::cost::types::{ModelPricing, PricingEntry, ProviderPricing};

fn claude(input: f64, output: f64) -> ModelPricing {
    ModelPricing::standard(
        PricingEntry::with_cache(input, output, input / 10.0).cache_writes(input * 1.25, input * 2.0),
    )
    .with_batch_discount()
}

pub fn pricing() -> ProviderPricing {
    ProviderPricing::new("anthropic")
        .models(
            &["claude-opus-4", "claude-opus-4-0", "claude-opus-4-1", "claude-3-opus"],
            claude(1500.0, 7500.0),
        )
        .model("claude-opus-4-5", claude(500.0, 2500.0))
        .models(
            &[
                "claude-sonnet-4",
                "claude-sonnet-4-0",
                "claude-sonnet-4-5",
                "claude-3-7-sonnet",
                "claude-3-5-sonnet",
            ],
            claude(300.0, 1500.0),
        )
        .model("claude-haiku-4-5", claude(100.0, 500.0))
        .model("claude-3-5-haiku", claude(80.0, 400.0))
        .model(
            "claude-3-haiku",
            ModelPricing::standard(PricingEntry::with_cache(25.0, 125.0, 3.0).cache_writes(30.0, 50.0))
                .with_batch_discount(),
        )
}
