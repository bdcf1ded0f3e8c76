//! Built-in price tables, one per vendor
//!
//! OpenRouter has no table of its own: its `vendor/model` names are priced
//! from the named vendor's table.

pub mod anthropic;
pub mod google;
pub mod openai;

use super::types::{BillingUnit, ModelPricing, PricingEntry, ProviderPricing};

pub fn mistral() -> ProviderPricing {
    ProviderPricing::new("mistral")
        .model("mistral-large", ModelPricing::standard(PricingEntry::tokens(200.0, 600.0)))
        .model("mistral-medium", ModelPricing::standard(PricingEntry::tokens(40.0, 200.0)))
        .model("mistral-small", ModelPricing::standard(PricingEntry::tokens(10.0, 30.0)))
        .model("magistral-medium", ModelPricing::standard(PricingEntry::tokens(200.0, 500.0)))
        .model("codestral", ModelPricing::standard(PricingEntry::tokens(30.0, 90.0)))
        .model("ministral-8b", ModelPricing::standard(PricingEntry::tokens(10.0, 10.0)))
        .model("open-mistral-nemo", ModelPricing::standard(PricingEntry::tokens(15.0, 15.0)))
        .model("mistral-embed", ModelPricing::standard(PricingEntry::tokens(10.0, 0.0)))
}

pub fn groq() -> ProviderPricing {
    ProviderPricing::new("groq")
        .model(
            "llama-3.3-70b-versatile",
            ModelPricing::standard(PricingEntry::tokens(59.0, 79.0)),
        )
        .model(
            "llama-3.1-8b-instant",
            ModelPricing::standard(PricingEntry::tokens(5.0, 8.0)),
        )
        .model("gpt-oss-120b", ModelPricing::standard(PricingEntry::tokens(15.0, 75.0)))
        .model("gpt-oss-20b", ModelPricing::standard(PricingEntry::tokens(10.0, 50.0)))
        .model(
            "whisper-large-v3",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Minute, 0.185)),
        )
        .model(
            "whisper-large-v3-turbo",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Minute, 0.0667)),
        )
}

pub fn xai() -> ProviderPricing {
    ProviderPricing::new("xai")
        .models(
            &["grok-4", "grok-3"],
            ModelPricing::standard(PricingEntry::with_cache(300.0, 1500.0, 75.0)),
        )
        .model(
            "grok-4-fast",
            ModelPricing::standard(PricingEntry::with_cache(20.0, 50.0, 5.0)),
        )
        .model(
            "grok-3-mini",
            ModelPricing::standard(PricingEntry::with_cache(30.0, 50.0, 7.5)),
        )
        .model(
            "grok-code-fast-1",
            ModelPricing::standard(PricingEntry::with_cache(20.0, 150.0, 2.0)),
        )
        .model(
            "grok-2-image",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Image, 7.0)),
        )
}

pub fn deepseek() -> ProviderPricing {
    ProviderPricing::new("deepseek").models(
        &["deepseek-chat", "deepseek-reasoner"],
        ModelPricing::standard(PricingEntry::with_cache(28.0, 42.0, 2.8)),
    )
}

pub fn cohere() -> ProviderPricing {
    ProviderPricing::new("cohere")
        .models(
            &["command-a", "command-r-plus"],
            ModelPricing::standard(PricingEntry::tokens(250.0, 1000.0)),
        )
        .model("command-r7b", ModelPricing::standard(PricingEntry::tokens(3.75, 15.0)))
        .model("command-r", ModelPricing::standard(PricingEntry::tokens(15.0, 60.0)))
        .model("embed-v4.0", ModelPricing::standard(PricingEntry::tokens(12.0, 0.0)))
        .models(
            &["embed-english-v3.0", "embed-multilingual-v3.0"],
            ModelPricing::standard(PricingEntry::tokens(10.0, 0.0)),
        )
}

pub fn elevenlabs() -> ProviderPricing {
    ProviderPricing::new("elevenlabs")
        .models(
            &["eleven_multilingual_v2", "eleven_v3"],
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Characters, 20_000.0)),
        )
        .models(
            &["eleven_flash_v2_5", "eleven_turbo_v2_5"],
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Characters, 10_000.0)),
        )
        .model(
            "scribe_v1",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Minute, 0.67)),
        )
}

/// Local models cost nothing
pub fn ollama() -> ProviderPricing {
    ProviderPricing::new("ollama").default_pricing(ModelPricing::standard(PricingEntry::tokens(0.0, 0.0)))
}

/// Every built-in table
pub fn builtin_pricing() -> Vec<ProviderPricing> {
    vec![
        openai::pricing(),
        anthropic::pricing(),
        google::pricing(),
        mistral(),
        groq(),
        xai(),
        deepseek(),
        cohere(),
        elevenlabs(),
        ollama(),
    ]
}
