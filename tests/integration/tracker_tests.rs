//! End-to-end tracker tests
//!
//! A call goes from `begin` through `complete` or `fail` into the sink, the
//! exporter, the usage store and the media store.

#[cfg(test)]
mod tests {
    use crate::common::TrackerHarness;
    use crate::common::assertions::assert_cents_eq;
    use crate::common::fixtures::{
        ANTHROPIC_HOST, GEMINI_HOST, anthropic_request, gemini_image_request,
        gemini_image_response, openai_chat_request, openai_chat_response,
    };
    use ai_usage_tracker::core::budget::ThresholdStage;
    use ai_usage_tracker::core::tracking::{AttributeValue, StatusCode};
    use ai_usage_tracker::{
        ApiRequest, ApiResponse, BudgetConfig, BudgetError, BudgetLimits, ModelType, PricingTier,
        Trackable, TrackerError, UsageStore,
    };
    use chrono::{Duration, Utc};
    use serde_json::json;

    fn team() -> Trackable {
        Trackable::new("team", "core")
    }

    // ==================== Completion Tests ====================

    /// Test a priced OpenAI chat call reaching every collaborator
    #[tokio::test]
    async fn test_openai_chat_call() {
        let harness = TrackerHarness::new();
        let request = openai_chat_request("gpt-4o");

        let ctx = harness
            .tracker
            .begin(&request, Some(team()))
            .await
            .unwrap()
            .unwrap()
            .with_tag("eval");
        assert_eq!(ctx.provider, "openai");
        assert_eq!(ctx.model.as_deref(), Some("gpt-4o"));
        assert_eq!(ctx.operation, "POST");

        let record = harness
            .tracker
            .complete(ctx, &request, &openai_chat_response(1000, 500))
            .await
            .unwrap()
            .unwrap();

        assert!(record.success);
        assert_eq!(record.handler.as_deref(), Some("chat_completion"));
        assert_eq!(record.model_type, Some(ModelType::Text));
        assert_eq!(record.model.as_deref(), Some("gpt-4o"));
        assert_eq!(record.snapshot.as_deref(), Some("gpt-4o-2024-08-06"));
        assert_eq!(record.pricing_tier, PricingTier::Standard);
        assert_eq!(record.total_tokens, 1500);
        assert_cents_eq(record.cost.input_cost, 0.25);
        assert_cents_eq(record.cost.output_cost, 0.5);
        assert_cents_eq(record.cost.total_cost, 0.75);
        assert_eq!(record.finish_reason.as_deref(), Some("stop"));
        assert_eq!(record.response_text.as_deref(), Some("Seven."));
        assert_eq!(record.response_id.as_deref(), Some("chatcmpl-abc123"));
        assert_eq!(record.tags, vec!["eval"]);

        assert_eq!(harness.sink.last().unwrap().id, record.id);

        let spans = harness.exporter.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].trace_id, record.trace_id);
        assert_eq!(spans[0].status.code, StatusCode::Ok);
        assert_eq!(
            spans[0].attribute("ai_tracker.tags"),
            Some(&AttributeValue::StringArray(vec!["eval".to_string()]))
        );

        let since = Utc::now() - Duration::hours(1);
        let totals = harness.store.usage_since(&team(), since).await.unwrap();
        assert_eq!(totals.requests, 1);
        assert_eq!(totals.tokens, 1500);
        assert_cents_eq(totals.cost, 0.75);
    }

    /// Test that a request-level service tier prices the call
    #[tokio::test]
    async fn test_service_tier_from_request() {
        let harness = TrackerHarness::new();
        let mut request = openai_chat_request("gpt-4o");
        request.body["service_tier"] = json!("flex");

        let ctx = harness.tracker.begin(&request, None).await.unwrap().unwrap();
        assert_eq!(ctx.pricing_tier, Some(PricingTier::Flex));
    }

    /// Test Gemini inline image output being stored and billed as image output
    #[tokio::test]
    async fn test_gemini_image_media_stored() {
        let harness = TrackerHarness::new();
        let request = gemini_image_request();
        assert_eq!(request.host, GEMINI_HOST);

        let ctx = harness.tracker.begin(&request, None).await.unwrap().unwrap();
        assert_eq!(ctx.model.as_deref(), Some("gemini-2.5-flash-image"));

        let record = harness
            .tracker
            .complete(ctx, &request, &ApiResponse::ok(gemini_image_response()))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(record.handler.as_deref(), Some("generate_content_image"));
        assert_eq!(record.model_type, Some(ModelType::Image));
        assert_eq!(record.image_count, Some(1));
        // 9 input at 30 plus 1290 image output at 3000 cents per million
        assert_cents_eq(record.cost.total_cost, 3.87027);

        assert_eq!(record.media.len(), 1);
        assert_eq!(record.media[0].mime_type.as_deref(), Some("image/png"));
        assert_eq!(record.media[0].size_bytes, Some(8));
        assert_eq!(harness.media.len(), 1);
        let bytes = harness.media.get_bytes(&record.media[0].location).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    /// Test that untracked hosts pass straight through
    #[tokio::test]
    async fn test_untracked_host() {
        let harness = TrackerHarness::new();
        let request = ApiRequest::new("GET", "api.github.com", "/repos");
        assert!(harness.tracker.begin(&request, None).await.unwrap().is_none());
        assert!(harness.sink.is_empty());
        assert!(harness.exporter.is_empty());
    }

    // ==================== Failure Tests ====================

    /// Test an HTTP error response recorded as a failure
    #[tokio::test]
    async fn test_http_error_recorded() {
        let harness = TrackerHarness::new();
        let request = anthropic_request(false);
        assert_eq!(request.host, ANTHROPIC_HOST);

        let ctx = harness
            .tracker
            .begin(&request, Some(team()))
            .await
            .unwrap()
            .unwrap();
        let response = ApiResponse::new(
            529,
            json!({"type": "error", "error": {"type": "overloaded_error", "message": "Overloaded"}}),
        );
        let record = harness
            .tracker
            .complete(ctx, &request, &response)
            .await
            .unwrap()
            .unwrap();

        assert!(!record.success);
        assert_eq!(record.http_status, Some(529));
        assert_eq!(record.error_kind.as_deref(), Some("http_error"));
        assert_eq!(record.error_message.as_deref(), Some("Overloaded"));
        assert_eq!(record.cost.total_cost, 0.0);

        let span = &harness.exporter.spans()[0];
        assert_eq!(span.status.code, StatusCode::Error);
        assert_eq!(span.status.message.as_deref(), Some("Overloaded"));

        // Failures never count against budgets
        let since = Utc::now() - Duration::hours(1);
        let totals = harness.store.usage_since(&team(), since).await.unwrap();
        assert_eq!(totals.requests, 0);
    }

    /// Test a transport failure with no HTTP status and a credential in the message
    #[tokio::test]
    async fn test_transport_failure_redacted() {
        let harness = TrackerHarness::new();
        let request = openai_chat_request("gpt-4o");
        let ctx = harness.tracker.begin(&request, None).await.unwrap().unwrap();

        let record = harness
            .tracker
            .fail(
                ctx,
                "timeout",
                "request with key sk-proj-abcdefghijklmnopqrstuvwx timed out",
                None,
            )
            .await
            .unwrap();

        assert!(!record.success);
        assert_eq!(record.http_status, None);
        assert_eq!(record.error_kind.as_deref(), Some("timeout"));
        let message = record.error_message.unwrap();
        assert!(!message.contains("abcdefghijklmnopqrstuvwx"), "{}", message);
        assert_eq!(harness.sink.len(), 1);
    }

    // ==================== Budget Tests ====================

    /// Test that spend recorded by the tracker eventually blocks a hard budget
    #[tokio::test]
    async fn test_hard_budget_blocks_after_spend() {
        let mut harness = TrackerHarness::with_budgets(vec![
            BudgetConfig::for_subject(&team())
                .with_limits(BudgetLimits {
                    daily_limit: Some(2.0),
                    ..Default::default()
                })
                .hard(),
        ]);
        let request = openai_chat_request("gpt-4o");

        // 0.75 cents per call
        for _ in 0..3 {
            let ctx = harness
                .tracker
                .begin(&request, Some(team()))
                .await
                .unwrap()
                .unwrap();
            harness
                .tracker
                .complete(ctx, &request, &openai_chat_response(1000, 500))
                .await
                .unwrap();
        }

        let err = harness
            .tracker
            .begin(&request, Some(team()))
            .await
            .unwrap_err();
        assert!(err.is_budget_violation());
        match err {
            TrackerError::Budget(BudgetError::LimitExceeded { usage, limit, .. }) => {
                assert_cents_eq(usage, 2.25);
                assert_eq!(limit, 2.0);
            }
            other => panic!("unexpected error: {}", other),
        }

        let stages: Vec<ThresholdStage> =
            harness.drain_events().into_iter().map(|e| e.stage).collect();
        assert_eq!(stages, vec![ThresholdStage::Exceeded]);

        let status = harness.tracker.budget_status(&team(), None, None).await;
        assert!(!status.allowed);
        assert_eq!(status.usage.daily.requests, 3);

        // Calls without a subject are never budgeted
        assert!(harness.tracker.begin(&request, None).await.unwrap().is_some());
    }

    // ==================== Estimate Tests ====================

    /// Test pre-call estimates with an explicit provider and model
    #[tokio::test]
    async fn test_estimate_cost() {
        let harness = TrackerHarness::new();
        let prompt = "x".repeat(4_000_000);

        let estimate = harness
            .tracker
            .estimate_cost(&prompt, Some("openai"), Some("gpt-4o-mini"), Some(1_000_000))
            .unwrap();
        assert_cents_eq(estimate.min_cost, 15.0);
        assert_cents_eq(estimate.max_cost, 75.0);

        // No budget defaults configured
        assert!(harness.tracker.estimate_cost(&prompt, None, None, None).is_none());
    }
}
