//! Streaming aggregation integration tests
//!
//! Raw wire transcripts go through the tracker's stream tap and must yield
//! the same usage as the equivalent non-streamed response.

#[cfg(test)]
mod tests {
    use crate::common::TrackerHarness;
    use crate::common::fixtures::{
        ANTHROPIC_STREAM, GEMINI_STREAM, OPENAI_STREAM, anthropic_full_response,
        anthropic_request, byte_stream, gemini_stream_request, openai_stream_request,
    };
    use ai_usage_tracker::{ApiRequest, StreamOutcome, TokenMetrics};
    use bytes::Bytes;
    use futures::StreamExt;

    /// Run a transcript through the tracker tap, returning the forwarded
    /// bytes and the aggregated outcome
    async fn tap(
        harness: &TrackerHarness,
        request: &ApiRequest,
        reads: &'static [&'static str],
    ) -> (Vec<Bytes>, StreamOutcome) {
        let ctx = harness
            .tracker
            .begin(request, None)
            .await
            .unwrap()
            .expect("tracked host");
        let (stream, outcome_rx) = harness
            .tracker
            .wrap_stream(&ctx, request, byte_stream(reads))
            .expect("streaming handler");
        let forwarded: Vec<Bytes> = stream.map(|read| read.unwrap()).collect().await;
        (forwarded, outcome_rx.await.unwrap())
    }

    // ==================== Pass-through Tests ====================

    /// Test that the tap forwards every read unchanged and in order
    #[tokio::test]
    async fn test_bytes_pass_through_unchanged() {
        let harness = TrackerHarness::new();
        let (forwarded, _) = tap(&harness, &openai_stream_request(), OPENAI_STREAM).await;

        assert_eq!(forwarded.len(), OPENAI_STREAM.len());
        for (read, original) in forwarded.iter().zip(OPENAI_STREAM) {
            assert_eq!(read.as_ref(), original.as_bytes());
        }
    }

    // ==================== Vendor Format Tests ====================

    /// Test OpenAI chat chunks with the trailing usage chunk
    #[tokio::test]
    async fn test_openai_stream_outcome() {
        let harness = TrackerHarness::new();
        let (_, outcome) = tap(&harness, &openai_stream_request(), OPENAI_STREAM).await;

        assert_eq!(outcome.text, "Seven.");
        assert_eq!(outcome.finish_reason.as_deref(), Some("stop"));
        assert_eq!(outcome.model.as_deref(), Some("gpt-4o-2024-08-06"));
        assert_eq!(outcome.response_id.as_deref(), Some("chatcmpl-s1"));
        assert_eq!(outcome.metrics.tokens, Some(TokenMetrics::new(14, 3)));
        assert_eq!(outcome.dropped_chunks, 0);
    }

    /// Test that Anthropic usage split across `message_start` and
    /// `message_delta` matches the non-streamed body exactly
    #[tokio::test]
    async fn test_anthropic_split_usage_matches_full_response() {
        let harness = TrackerHarness::new();
        let request = anthropic_request(true);
        let (_, outcome) = tap(&harness, &request, ANTHROPIC_STREAM).await;

        let handler = harness
            .tracker
            .registry()
            .get("anthropic")
            .unwrap()
            .resolve_handler("/v1/messages", &anthropic_full_response())
            .unwrap();
        let full = anthropic_full_response();
        let direct = handler.extract_metrics(&anthropic_request(false), &full);

        assert_eq!(outcome.metrics.tokens, direct.tokens);
        assert_eq!(outcome.metrics.prompt_tokens(), 112);
        assert_eq!(outcome.metrics.cached_tokens(), 100);
        assert_eq!(outcome.metrics.completion_tokens(), 7);
        assert_eq!(
            outcome.finish_reason,
            handler
                .finish_reason()
                .and_then(|f| f.extract_finish_reason(&full))
        );
        assert_eq!(outcome.text, handler.extract_response_text(&full).unwrap());
        assert_eq!(outcome.model, handler.extract_model(&full));
    }

    /// Test Gemini SSE where each chunk carries cumulative usage
    #[tokio::test]
    async fn test_gemini_cumulative_usage() {
        let harness = TrackerHarness::new();
        let request = gemini_stream_request();
        assert!(request.is_streaming());
        let (_, outcome) = tap(&harness, &request, GEMINI_STREAM).await;

        assert_eq!(outcome.text, "A lighthouse.");
        assert_eq!(outcome.finish_reason.as_deref(), Some("STOP"));
        assert_eq!(outcome.model.as_deref(), Some("gemini-2.5-flash"));
        assert_eq!(outcome.metrics.prompt_tokens(), 9);
        assert_eq!(outcome.metrics.completion_tokens(), 24);
        assert_eq!(outcome.metrics.reasoning_tokens(), 20);
    }

    // ==================== Tracker Completion Tests ====================

    /// Test that a streamed call completes into a priced record
    #[tokio::test]
    async fn test_complete_stream_builds_record() {
        let harness = TrackerHarness::new();
        let request = anthropic_request(true);
        let ctx = harness.tracker.begin(&request, None).await.unwrap().unwrap();
        assert!(ctx.is_streaming);

        let (stream, outcome_rx) = harness
            .tracker
            .wrap_stream(&ctx, &request, byte_stream(ANTHROPIC_STREAM))
            .unwrap();
        let _: Vec<_> = stream.collect().await;
        let outcome = outcome_rx.await.unwrap();

        let record = harness
            .tracker
            .complete_stream(ctx, &request, outcome)
            .await
            .unwrap();

        assert!(record.is_streaming);
        assert!(record.success);
        assert_eq!(record.handler.as_deref(), Some("messages"));
        assert_eq!(record.snapshot.as_deref(), Some("claude-sonnet-4-20250514"));
        assert_eq!(record.finish_reason.as_deref(), Some("end_turn"));
        assert_eq!(record.response_text.as_deref(), Some("Hello, world"));
        assert!(record.time_to_first_token_ms.is_some());
        // 12 regular at 300, 100 cache reads at 30, 7 output at 1500 (cents per million)
        crate::common::assertions::assert_cents_eq(record.cost.total_cost, 0.0171);
        assert!(!record.metadata.contains_key("tokens_estimated"));
        assert_eq!(harness.sink.len(), 1);
    }

    /// Test that a stream dropped before completion still yields an outcome
    #[tokio::test]
    async fn test_partial_stream_still_reports() {
        let harness = TrackerHarness::new();
        let request = openai_stream_request();
        let ctx = harness.tracker.begin(&request, None).await.unwrap().unwrap();
        let (stream, outcome_rx) = harness
            .tracker
            .wrap_stream(&ctx, &request, byte_stream(&OPENAI_STREAM[..2]))
            .unwrap();
        let _: Vec<_> = stream.collect().await;

        let outcome = outcome_rx.await.unwrap();
        assert_eq!(outcome.text, "Sev");
        assert!(!outcome.has_usage());
        assert!(outcome.finish_reason.is_none());
    }
}
