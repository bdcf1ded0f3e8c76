//! OpenAI list prices

use crate::core::cost::types::{BillingUnit, ModelPricing, PricingEntry, ProviderPricing};
use crate::core::types::PricingTier;

fn tiered(standard: PricingEntry, batch: PricingEntry) -> ModelPricing {
    ModelPricing::standard(standard).tier(PricingTier::Batch, batch)
}

pub fn pricing() -> ProviderPricing {
    ProviderPricing::new("openai")
        // GPT-5 family
        .model(
            "gpt-5",
            tiered(
                PricingEntry::with_cache(125.0, 1000.0, 12.5),
                PricingEntry::with_cache(62.5, 500.0, 6.25),
            )
            .tier(PricingTier::Flex, PricingEntry::with_cache(62.5, 500.0, 6.25))
            .tier(PricingTier::Priority, PricingEntry::with_cache(250.0, 2000.0, 25.0)),
        )
        .model(
            "gpt-5-mini",
            tiered(
                PricingEntry::with_cache(25.0, 200.0, 2.5),
                PricingEntry::with_cache(12.5, 100.0, 1.25),
            )
            .tier(PricingTier::Flex, PricingEntry::with_cache(12.5, 100.0, 1.25))
            .tier(PricingTier::Priority, PricingEntry::with_cache(45.0, 360.0, 4.5)),
        )
        .model(
            "gpt-5-nano",
            tiered(
                PricingEntry::with_cache(5.0, 40.0, 0.5),
                PricingEntry::with_cache(2.5, 20.0, 0.25),
            )
            .tier(PricingTier::Flex, PricingEntry::with_cache(2.5, 20.0, 0.25)),
        )
        // GPT-4.1 family
        .model(
            "gpt-4.1",
            tiered(
                PricingEntry::with_cache(200.0, 800.0, 50.0),
                PricingEntry::tokens(100.0, 400.0),
            )
            .tier(PricingTier::Priority, PricingEntry::with_cache(350.0, 1400.0, 87.5)),
        )
        .model(
            "gpt-4.1-mini",
            tiered(
                PricingEntry::with_cache(40.0, 160.0, 10.0),
                PricingEntry::tokens(20.0, 80.0),
            )
            .tier(PricingTier::Priority, PricingEntry::with_cache(70.0, 280.0, 17.5)),
        )
        .model(
            "gpt-4.1-nano",
            tiered(
                PricingEntry::with_cache(10.0, 40.0, 2.5),
                PricingEntry::tokens(5.0, 20.0),
            ),
        )
        // GPT-4o family
        .model(
            "gpt-4o",
            tiered(
                PricingEntry::with_cache(250.0, 1000.0, 125.0),
                PricingEntry::tokens(125.0, 500.0),
            )
            .tier(PricingTier::Priority, PricingEntry::with_cache(425.0, 1700.0, 212.5)),
        )
        .model(
            "gpt-4o-mini",
            tiered(
                PricingEntry::with_cache(15.0, 60.0, 7.5),
                PricingEntry::tokens(7.5, 30.0),
            )
            .tier(PricingTier::Priority, PricingEntry::with_cache(25.0, 100.0, 12.5)),
        )
        .model(
            "gpt-4-turbo",
            tiered(
                PricingEntry::tokens(1000.0, 3000.0),
                PricingEntry::tokens(500.0, 1500.0),
            ),
        )
        .model("gpt-4", ModelPricing::standard(PricingEntry::tokens(3000.0, 6000.0)))
        .model(
            "gpt-3.5-turbo",
            tiered(
                PricingEntry::tokens(50.0, 150.0),
                PricingEntry::tokens(25.0, 75.0),
            ),
        )
        .model(
            "gpt-3.5-turbo-instruct",
            ModelPricing::standard(PricingEntry::tokens(150.0, 200.0)),
        )
        // Reasoning models
        .model(
            "o1",
            tiered(
                PricingEntry::with_cache(1500.0, 6000.0, 750.0),
                PricingEntry::tokens(750.0, 3000.0),
            ),
        )
        .model(
            "o3",
            tiered(
                PricingEntry::with_cache(200.0, 800.0, 50.0),
                PricingEntry::tokens(100.0, 400.0),
            )
            .tier(PricingTier::Flex, PricingEntry::with_cache(100.0, 400.0, 25.0))
            .tier(PricingTier::Priority, PricingEntry::with_cache(350.0, 1400.0, 87.5)),
        )
        .models(
            &["o3-mini", "o1-mini"],
            tiered(
                PricingEntry::with_cache(110.0, 440.0, 55.0),
                PricingEntry::tokens(55.0, 220.0),
            ),
        )
        .model(
            "o4-mini",
            tiered(
                PricingEntry::with_cache(110.0, 440.0, 27.5),
                PricingEntry::tokens(55.0, 220.0),
            )
            .tier(PricingTier::Flex, PricingEntry::with_cache(55.0, 220.0, 13.75))
            .tier(PricingTier::Priority, PricingEntry::with_cache(200.0, 800.0, 50.0)),
        )
        // Embeddings
        .model(
            "text-embedding-3-small",
            tiered(PricingEntry::tokens(2.0, 0.0), PricingEntry::tokens(1.0, 0.0)),
        )
        .model(
            "text-embedding-3-large",
            tiered(PricingEntry::tokens(13.0, 0.0), PricingEntry::tokens(6.5, 0.0)),
        )
        .model(
            "text-embedding-ada-002",
            tiered(PricingEntry::tokens(10.0, 0.0), PricingEntry::tokens(5.0, 0.0)),
        )
        // Images
        .model(
            "gpt-image-1",
            ModelPricing::standard(PricingEntry::with_cache(500.0, 4000.0, 125.0)),
        )
        .model(
            "gpt-image-1-mini",
            ModelPricing::standard(PricingEntry::with_cache(200.0, 800.0, 20.0)),
        )
        .model(
            "dall-e-3",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Image, 4.0)),
        )
        .model(
            "dall-e-2",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Image, 2.0)),
        )
        // Audio
        .model(
            "tts-1",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Characters, 1500.0)),
        )
        .model(
            "tts-1-hd",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Characters, 3000.0)),
        )
        .models(
            &["whisper-1", "gpt-4o-transcribe"],
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Minute, 0.6)),
        )
        .model(
            "gpt-4o-mini-transcribe",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Minute, 0.3)),
        )
        // Video
        .model(
            "sora-2",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Second, 10.0)),
        )
        .model(
            "sora-2-pro",
            ModelPricing::standard(PricingEntry::per_unit(BillingUnit::Second, 30.0)),
        )
}
