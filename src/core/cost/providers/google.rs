//! Gemini API list prices (prompts up to 200k tokens)

use crate::core::cost::types::{BillingUnit, ModelPricing, PricingEntry, ProviderPricing};

fn gemini(input: f64, output: f64, cached: f64) -> ModelPricing {
    ModelPricing::standard(PricingEntry::with_cache(input, output, cached)).with_batch_discount()
}

pub fn pricing() -> ProviderPricing {
    ProviderPricing::new("google")
        .model("gemini-2.5-pro", gemini(125.0, 1000.0, 31.25))
        .model("gemini-2.5-flash", gemini(30.0, 250.0, 7.5))
        .model("gemini-2.5-flash-lite", gemini(10.0, 40.0, 2.5))
        .models(
            &["gemini-2.5-flash-image", "gemini-2.5-flash-image-preview"],
            ModelPricing::standard(PricingEntry::tokens(30.0, 3000.0)).with_batch_discount(),
        )
        .model(
            "gemini-2.5-flash-preview-tts",
            ModelPricing::standard(PricingEntry::tokens(50.0, 1000.0)),
        )
        .model(
            "gemini-2.5-pro-preview-tts",
            ModelPricing::standard(PricingEntry::tokens(100.0, 2000.0)),
        )
        .model("gemini-2.0-flash", gemini(10.0, 40.0, 2.5))
        .model(
            "gemini-2.0-flash-lite",
            ModelPricing::standard(PricingEntry::tokens(7.5, 30.0)).with_batch_discount(),
        )
        .model(
            "gemini-1.5-pro",
            ModelPricing::standard(PricingEntry::tokens(125.0, 500.0)),
        )
        .model(
            "gemini-1.5-flash",
            ModelPricing::standard(PricingEntry::tokens(7.5, 30.0)),
        )
        .model(
            "gemini-embedding-001",
            ModelPricing::standard(PricingEntry::tokens(15.0, 0.0)).with_batch_discount(),
        )
        .model(
            "text-embedding-004",
            ModelPricing::standard(PricingEntry::tokens(0.0, 0.0)),
        )
        .model(
            "imagen-4.0-generate",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Image, 4.0)),
        )
        .model(
            "imagen-4.0-fast-generate",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Image, 2.0)),
        )
        .model(
            "imagen-4.0-ultra-generate",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Image, 6.0)),
        )
        .model(
            "imagen-3.0-generate",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Image, 3.0)),
        )
        .model(
            "veo-3.0-generate",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Second, 40.0)),
        )
        .model(
            "veo-3.0-fast-generate",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Second, 15.0)),
        )
        .model(
            "veo-2.0-generate",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Second, 35.0)),
        )
}
