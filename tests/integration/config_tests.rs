//! Configuration integration tests
//!
//! YAML loading, environment overrides, validation errors and wiring a
//! tracker from configuration.

#[cfg(test)]
mod tests {
    use crate::common::assertions::assert_cents_eq;
    use crate::common::fixtures::{openai_chat_request, openai_chat_response};
    use ai_usage_tracker::{
        ApiRequest, BudgetError, InMemoryUsageStore, PricingTier, Trackable, TrackerConfig,
        TrackerError, UsageTracker,
    };
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    const TRACKER_YAML: &str = r#"
tracking:
  persist_failures: false
  max_response_text_chars: 4

pricing:
  default_tiers:
    openai: priority

budget:
  default_provider: anthropic
  default_model: claude-sonnet-4
  budgets:
    - trackable_type: user
      allowed_providers: [anthropic]

providers:
  extra_hosts:
    openai: [llm-proxy.internal:8443]
  disabled: [mistral]

logging:
  level: "ai_usage_tracker=debug,warn"
"#;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    // ==================== Loading Tests ====================

    /// Test loading every section from a YAML file
    #[tokio::test]
    async fn test_load_yaml_file() {
        let file = write_config(TRACKER_YAML);
        let config = TrackerConfig::from_file(file.path()).await.unwrap();

        assert!(config.tracking.enabled);
        assert!(!config.tracking.persist_failures);
        assert_eq!(config.tracking.max_response_text_chars, Some(4));
        assert_eq!(config.pricing.default_tiers["openai"], PricingTier::Priority);
        assert_eq!(config.budget.default_model.as_deref(), Some("claude-sonnet-4"));
        assert_eq!(config.budget.budgets[0].allowed_providers, vec!["anthropic"]);
        assert_eq!(config.providers.disabled, vec!["mistral"]);
        assert_eq!(config.logging.level, "ai_usage_tracker=debug,warn");
    }

    /// Test that serialized configuration loads back unchanged
    #[test]
    fn test_yaml_serialization_reloads() {
        let config = TrackerConfig::from_yaml_str(TRACKER_YAML).unwrap();
        let yaml = config.to_yaml().unwrap();
        assert_eq!(TrackerConfig::from_yaml_str(&yaml).unwrap(), config);
    }

    // ==================== Validation Tests ====================

    /// Test that invalid configurations are rejected with the section named
    #[test]
    fn test_invalid_configurations() {
        let cases = [
            ("budget:\n  warning_threshold: 120\n", "budget"),
            (
                "budget:\n  warning_threshold: 90\n  critical_threshold: 80\n",
                "cannot exceed",
            ),
            ("budget:\n  default_model: gpt-4o\n", "default_provider"),
            (
                "budget:\n  budgets:\n    - trackable_type: team\n      daily_limit: -5\n",
                "negative",
            ),
            (
                "budget:\n  budgets:\n    - trackable_type: team\n    - trackable_type: team\n",
                "duplicate",
            ),
            (
                "pricing:\n  overrides:\n    openai:\n      custom:\n        standard:\n          input: -1\n",
                "negative price",
            ),
            (
                "providers:\n  extra_hosts:\n    openai: [\"https://proxy.internal/v1\"]\n",
                "bare host",
            ),
            ("tracking:\n  max_response_text_chars: 0\n", "max_response_text_chars"),
        ];

        for (yaml, expected) in cases {
            match TrackerConfig::from_yaml_str(yaml) {
                Err(TrackerError::Config(message)) => {
                    assert!(message.contains(expected), "{}: {}", expected, message)
                }
                other => panic!("expected config error for {:?}, got {:?}", yaml, other),
            }
        }
    }

    /// Test that malformed YAML is a config error
    #[test]
    fn test_malformed_yaml() {
        let err = TrackerConfig::from_yaml_str("tracking: 5").unwrap_err();
        assert!(matches!(err, TrackerError::Config(_)));
    }

    // ==================== Environment Tests ====================

    /// Test environment overrides on top of a file
    #[test]
    fn test_environment_overrides_file() {
        let mut config = TrackerConfig::from_yaml_str(TRACKER_YAML).unwrap();
        let vars: HashMap<&str, &str> = [
            ("AI_TRACKER_OPENAI_TIER", "flex"),
            ("AI_TRACKER_PERSIST_FAILURES", "yes"),
            ("AI_TRACKER_DISABLED_PROVIDERS", "groq, xai"),
        ]
        .into_iter()
        .collect();

        config
            .apply_env_with(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.pricing.default_tiers["openai"], PricingTier::Flex);
        assert!(config.tracking.persist_failures);
        assert_eq!(config.providers.disabled, vec!["groq", "xai"]);
    }

    /// Test that unparseable overrides are reported
    #[test]
    fn test_invalid_environment_value() {
        let mut config = TrackerConfig::default();
        let err = config
            .apply_env_with(|key| (key == "AI_TRACKER_ENABLED").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains("AI_TRACKER_ENABLED"));
    }

    // ==================== Wiring Tests ====================

    /// Test a tracker built from configuration honours every section
    #[tokio::test]
    async fn test_tracker_from_config() {
        let config = TrackerConfig::from_yaml_str(TRACKER_YAML).unwrap();
        let tracker = UsageTracker::from_config(&config, Arc::new(InMemoryUsageStore::new()));

        // Extra host resolves, disabled provider does not
        let proxied = ApiRequest::new("POST", "llm-proxy.internal:8443", "/v1/chat/completions")
            .with_body(openai_chat_request("gpt-4o").body);
        assert!(tracker.begin(&proxied, None).await.unwrap().is_some());
        let mistral = ApiRequest::new("POST", "api.mistral.ai", "/v1/chat/completions");
        assert!(tracker.begin(&mistral, None).await.unwrap().is_none());

        // Configured default tier prices the call
        let ctx = tracker.begin(&proxied, None).await.unwrap().unwrap();
        let record = tracker
            .complete(ctx, &proxied, &openai_chat_response(1000, 500))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.pricing_tier, PricingTier::Priority);
        // 1000 at 425 plus 500 at 1700 cents per million
        assert_cents_eq(record.cost.total_cost, 1.275);
        assert_eq!(record.response_text.as_deref(), Some("S..."));

        // An `auto` tier leaves the configured default in charge
        let mut auto = proxied.clone();
        auto.body["service_tier"] = serde_json::json!("auto");
        let ctx = tracker.begin(&auto, None).await.unwrap().unwrap();
        assert_eq!(ctx.pricing_tier, None);
        let record = tracker
            .complete(ctx, &auto, &openai_chat_response(1000, 500))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.pricing_tier, PricingTier::Priority);

        // Configured allow-list rejects
        let err = tracker
            .begin(&proxied, Some(Trackable::new("user", "42")))
            .await
            .unwrap_err();
        assert!(err.is_budget_violation());
        assert!(matches!(
            err,
            TrackerError::Budget(BudgetError::ProviderNotAllowed { .. })
        ));
        let user = Trackable::new("user", "42");
        assert!(!tracker.budget_status(&user, Some("openai"), None).await.allowed);
        assert!(tracker.budget_status(&user, Some("anthropic"), None).await.allowed);

        // Budget defaults feed estimates
        let estimate = tracker
            .estimate_cost(&"x".repeat(4_000_000), None, None, Some(1_000_000))
            .unwrap();
        assert_cents_eq(estimate.min_cost, 300.0);
        assert_cents_eq(estimate.max_cost, 1800.0);
    }
}
