//! Cost calculation integration tests
//!
//! Built-in price tables, tier resolution and configured overrides.

#[cfg(test)]
mod tests {
    use crate::common::assertions::assert_cents_eq;
    use ai_usage_tracker::core::types::{AudioMetrics, VideoMetrics};
    use ai_usage_tracker::{CostCalculator, Metrics, PricingTier, TokenMetrics, TrackerConfig};
    use std::collections::HashMap;

    // ==================== Token Pricing Tests ====================

    /// Test one million prompt and completion tokens at standard gpt-4o prices
    #[test]
    fn test_gpt_4o_standard_million_tokens() {
        let calculator = CostCalculator::default();
        let cost = calculator.calculate(
            "openai",
            "gpt-4o",
            1_000_000,
            1_000_000,
            0,
            Some(PricingTier::Standard),
        );
        assert_cents_eq(cost.prompt_cost, 250.0);
        assert_cents_eq(cost.completion_cost, 1000.0);
        assert_cents_eq(cost.total_cost, 1250.0);
        assert_eq!(cost.tier, PricingTier::Standard);
    }

    /// Test that the batch tier halves the same call
    #[test]
    fn test_gpt_4o_batch_million_tokens() {
        let calculator = CostCalculator::default();
        let standard = calculator.calculate(
            "openai",
            "gpt-4o",
            1_000_000,
            1_000_000,
            0,
            Some(PricingTier::Standard),
        );
        let batch = calculator.calculate(
            "openai",
            "gpt-4o",
            1_000_000,
            1_000_000,
            0,
            Some(PricingTier::Batch),
        );
        assert_cents_eq(batch.total_cost, 625.0);
        assert!(batch.total_cost < standard.total_cost);
    }

    /// Test that dated snapshots price as their base model
    #[test]
    fn test_snapshot_priced_as_base_model() {
        let calculator = CostCalculator::default();
        let base = calculator.calculate("openai", "gpt-4o", 1000, 1000, 0, None);
        let snapshot = calculator.calculate("openai", "gpt-4o-2024-08-06", 1000, 1000, 0, None);
        assert_cents_eq(snapshot.total_cost, base.total_cost);
    }

    /// Test cache read discount on prompt tokens
    #[test]
    fn test_cached_prompt_tokens_discounted() {
        let calculator = CostCalculator::default();
        let uncached = calculator.calculate("openai", "gpt-4o", 1_000_000, 0, 0, None);
        let cached = calculator.calculate("openai", "gpt-4o", 1_000_000, 0, 1_000_000, None);
        assert_cents_eq(uncached.total_cost, 250.0);
        assert_cents_eq(cached.total_cost, 125.0);
    }

    // ==================== Fallback Tests ====================

    /// Test that a tier missing for a known model falls back to standard
    #[test]
    fn test_missing_tier_falls_back_to_standard() {
        let calculator = CostCalculator::default();
        let standard = calculator.calculate(
            "anthropic",
            "claude-sonnet-4",
            1000,
            1000,
            0,
            Some(PricingTier::Standard),
        );
        let priority = calculator.calculate(
            "anthropic",
            "claude-sonnet-4",
            1000,
            1000,
            0,
            Some(PricingTier::Priority),
        );
        assert!(priority.total_cost > 0.0);
        assert_cents_eq(priority.total_cost, standard.total_cost);
    }

    /// Test that unknown models and providers cost nothing
    #[test]
    fn test_unknown_model_costs_zero() {
        let calculator = CostCalculator::default();
        assert_eq!(
            calculator
                .calculate("openai", "gpt-unreleased", 10_000, 10_000, 0, None)
                .total_cost,
            0.0
        );
        assert_eq!(
            calculator
                .calculate("nowhere", "model", 10_000, 10_000, 0, None)
                .total_cost,
            0.0
        );
    }

    /// Test that a longer sibling of a known model is unknown, not a snapshot
    #[test]
    fn test_sibling_model_costs_zero() {
        let calculator = CostCalculator::default();
        for model in ["o1-pro", "o3-pro", "gpt-5-pro", "gpt-4-32k"] {
            let cost = calculator.calculate(
                "openai",
                model,
                1_000_000,
                1_000_000,
                0,
                Some(PricingTier::Standard),
            );
            assert_eq!(cost.total_cost, 0.0, "{}", model);
        }

        let snapshot = calculator.calculate(
            "openai",
            "gpt-4o-2024-08-06",
            1_000_000,
            1_000_000,
            0,
            Some(PricingTier::Standard),
        );
        assert_cents_eq(snapshot.total_cost, 1250.0);
    }

    // ==================== Monotonicity Tests ====================

    /// Test that cost never decreases as any usage input grows
    #[test]
    fn test_cost_is_monotonic() {
        let calculator = CostCalculator::default();
        let steps = [0u64, 1, 10, 1_000, 250_000, 1_000_000];

        for model in ["gpt-4o", "gpt-4o-mini", "o3"] {
            let mut previous = -1.0;
            for prompt in steps {
                let cost = calculator.calculate("openai", model, prompt, 500, 0, None).total_cost;
                assert!(cost >= previous, "{} prompt {}", model, prompt);
                previous = cost;
            }
            let mut previous = -1.0;
            for completion in steps {
                let cost = calculator
                    .calculate("openai", model, 500, completion, 0, None)
                    .total_cost;
                assert!(cost >= previous, "{} completion {}", model, completion);
                previous = cost;
            }
        }

        let mut previous = -1.0;
        for characters in steps {
            let metrics = Metrics::empty().with_audio(AudioMetrics {
                duration_seconds: None,
                input_characters: Some(characters),
            });
            let cost = calculator
                .calculate_metrics("openai", "tts-1", &metrics, None)
                .total_cost;
            assert!(cost >= previous, "tts characters {}", characters);
            previous = cost;
        }
    }

    // ==================== Unit Billing Tests ====================

    /// Test per-unit billing for media capabilities
    #[test]
    fn test_unit_billed_capabilities() {
        let calculator = CostCalculator::default();

        let images = Metrics::empty().with_image(3);
        assert_cents_eq(
            calculator
                .calculate_metrics("openai", "dall-e-3", &images, None)
                .total_cost,
            12.0,
        );

        // 1,000,000 characters at 1500 cents per million
        let speech = Metrics::empty().with_audio(AudioMetrics {
            duration_seconds: None,
            input_characters: Some(1_000_000),
        });
        assert_cents_eq(
            calculator
                .calculate_metrics("openai", "tts-1", &speech, None)
                .total_cost,
            1500.0,
        );

        // Two minutes at 0.6 cents per minute
        let transcription = Metrics::empty().with_audio(AudioMetrics {
            duration_seconds: Some(120.0),
            input_characters: None,
        });
        assert_cents_eq(
            calculator
                .calculate_metrics("openai", "whisper-1", &transcription, None)
                .total_cost,
            1.2,
        );

        let video = Metrics::empty().with_video(VideoMetrics {
            count: 1,
            duration_seconds: Some(8.0),
        });
        assert!(
            calculator
                .calculate_metrics("google", "veo-3.0-generate-001", &video, None)
                .total_cost
                > 0.0
        );
    }

    // ==================== Configuration Tests ====================

    /// Test that the configured default tier applies to tiered providers only
    #[test]
    fn test_configured_default_tier() {
        let tiers: HashMap<String, PricingTier> = [
            ("openai".to_string(), PricingTier::Flex),
            ("google".to_string(), PricingTier::Batch),
        ]
        .into_iter()
        .collect();
        let calculator = CostCalculator::with_overrides(&Default::default(), &tiers);

        assert_eq!(calculator.resolve_tier("openai", None), PricingTier::Flex);
        assert_eq!(
            calculator.resolve_tier("openai", Some(PricingTier::Priority)),
            PricingTier::Priority
        );
        assert_eq!(calculator.resolve_tier("google", None), PricingTier::Standard);

        let flex = calculator.calculate("openai", "o3", 1_000_000, 0, 0, None);
        let standard = calculator.calculate(
            "openai",
            "o3",
            1_000_000,
            0,
            0,
            Some(PricingTier::Standard),
        );
        assert!(flex.total_cost < standard.total_cost);
    }

    /// Test that a configured override prices a fine-tuned model
    #[test]
    fn test_configured_override() {
        let config = TrackerConfig::from_yaml_str(
            r#"
pricing:
  overrides:
    openai:
      ft:gpt-4o-mini:acme:
        standard:
          input: 30
          output: 120
"#,
        )
        .unwrap();
        let calculator = CostCalculator::with_overrides(
            &config.pricing.overrides,
            &config.pricing.default_tiers,
        );
        let cost = calculator.calculate("openai", "ft:gpt-4o-mini:acme", 1_000_000, 1_000_000, 0, None);
        assert_cents_eq(cost.total_cost, 150.0);
    }

    /// Test the token metrics path used by the tracker
    #[test]
    fn test_calculate_metrics_with_reasoning_tokens() {
        let calculator = CostCalculator::default();
        let tokens = TokenMetrics::new(1000, 2000).with_reasoning(1500);
        let with_reasoning =
            calculator.calculate_metrics("openai", "o3", &Metrics::from_tokens(tokens), None);
        let plain = calculator.calculate("openai", "o3", 1000, 2000, 0, None);
        // Reasoning tokens are already part of completion tokens
        assert_cents_eq(with_reasoning.total_cost, plain.total_cost);
    }
}
