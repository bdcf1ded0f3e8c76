//! Handler resolution integration tests
//!
//! Host to provider, endpoint plus response shape to handler.

#[cfg(test)]
mod tests {
    use crate::common::fixtures::{
        GEMINI_IMAGE_ENDPOINT, gemini_image_request, gemini_image_response, gemini_text_response,
    };
    use ai_usage_tracker::core::handlers::MatchesResponse;
    use ai_usage_tracker::core::providers::default_providers;
    use ai_usage_tracker::{ApiRequest, Handler, Metrics, ModelType, Provider, ProviderRegistry};
    use serde_json::{Value, json};

    /// A general handler owning a shared endpoint
    #[derive(Debug)]
    struct GeneralHandler;

    impl Handler for GeneralHandler {
        fn name(&self) -> &'static str {
            "general"
        }

        fn model_type(&self) -> ModelType {
            ModelType::Text
        }

        fn endpoints(&self) -> &'static [&'static str] {
            &["/v1/run/{model}"]
        }

        fn extract_metrics(&self, _request: &ApiRequest, _response: &Value) -> Metrics {
            Metrics::empty()
        }

        fn extract_model(&self, _response: &Value) -> Option<String> {
            None
        }

        fn extract_response_text(&self, _response: &Value) -> Option<String> {
            None
        }
    }

    /// A narrower handler for the same endpoint, confirmed by `kind`
    #[derive(Debug)]
    struct SpecialistHandler {
        name: &'static str,
        kind: &'static str,
    }

    impl Handler for SpecialistHandler {
        fn name(&self) -> &'static str {
            self.name
        }

        fn model_type(&self) -> ModelType {
            ModelType::Image
        }

        fn endpoints(&self) -> &'static [&'static str] {
            &["/v1/run/{model}"]
        }

        fn extract_metrics(&self, _request: &ApiRequest, _response: &Value) -> Metrics {
            Metrics::empty().with_image(1)
        }

        fn extract_model(&self, _response: &Value) -> Option<String> {
            None
        }

        fn extract_response_text(&self, _response: &Value) -> Option<String> {
            None
        }

        fn shape_matcher(&self) -> Option<&dyn MatchesResponse> {
            Some(self)
        }
    }

    impl MatchesResponse for SpecialistHandler {
        fn matches_response(&self, response: &Value) -> bool {
            response.get("kind").and_then(Value::as_str) == Some(self.kind)
        }
    }

    fn custom_provider() -> Provider {
        Provider::builder("acme", "Acme AI")
            .host("api.acme.ai")
            .handler(GeneralHandler)
            .handler(SpecialistHandler {
                name: "image",
                kind: "image",
            })
            .handler(SpecialistHandler {
                name: "sticker",
                kind: "sticker",
            })
            .build()
    }

    // ==================== Host Resolution Tests ====================

    /// Test that hosts resolve to their vendor regardless of case and port
    #[test]
    fn test_registry_resolves_hosts() {
        let registry = ProviderRegistry::with_defaults();
        assert_eq!(registry.resolve("api.openai.com").unwrap().slug(), "openai");
        assert_eq!(registry.resolve("API.ANTHROPIC.COM:443").unwrap().slug(), "anthropic");
        assert_eq!(registry.resolve("api.mistral.ai").unwrap().slug(), "mistral");
        assert!(registry.resolve("api.github.com").is_none());
    }

    /// Test that a custom provider plugs into the registry
    #[test]
    fn test_custom_provider_registration() {
        let registry = ProviderRegistry::builder()
            .providers(default_providers())
            .provider(custom_provider())
            .build();
        let request = ApiRequest::new("POST", "api.acme.ai", "/v1/run/fast");
        let (provider, handler) = registry
            .resolve_request(&request, &json!({"kind": "image"}))
            .unwrap();
        assert_eq!(provider.slug(), "acme");
        assert_eq!(handler.name(), "image");
    }

    // ==================== Specialist Precedence Tests ====================

    /// Test that a specialist confirming the shape wins the shared endpoint
    #[test]
    fn test_specialist_wins_when_shape_matches() {
        let provider = custom_provider();
        let handler = provider
            .resolve_handler("/v1/run/fast", &json!({"kind": "image"}))
            .unwrap();
        assert_eq!(handler.name(), "image");
        assert_eq!(handler.model_type(), ModelType::Image);
    }

    /// Test that the default keeps the endpoint when no specialist confirms
    #[test]
    fn test_default_wins_when_shape_does_not_match() {
        let provider = custom_provider();
        for body in [json!({"kind": "text"}), json!({}), Value::Null] {
            let handler = provider.resolve_handler("/v1/run/fast", &body).unwrap();
            assert_eq!(handler.name(), "general", "{}", body);
        }
    }

    /// Test that the latest registered specialist is checked first
    #[test]
    fn test_latest_specialist_first() {
        let provider = Provider::builder("acme", "Acme AI")
            .handler(GeneralHandler)
            .handler(SpecialistHandler {
                name: "first",
                kind: "image",
            })
            .handler(SpecialistHandler {
                name: "second",
                kind: "image",
            })
            .build();
        let handler = provider
            .resolve_handler("/v1/run/fast", &json!({"kind": "image"}))
            .unwrap();
        assert_eq!(handler.name(), "second");
    }

    /// Test shape fallback when no endpoint pattern matches
    #[test]
    fn test_shape_fallback_for_unknown_endpoint() {
        let provider = custom_provider();
        let handler = provider
            .resolve_handler("/v2/legacy", &json!({"kind": "sticker"}))
            .unwrap();
        assert_eq!(handler.name(), "sticker");
        assert!(provider.resolve_handler("/v2/legacy", &json!({"kind": "x"})).is_none());
        assert!(provider.resolve_handler("/v2/legacy", &Value::Null).is_none());
    }

    /// Test that placeholders never match across slashes
    #[test]
    fn test_placeholder_is_single_segment() {
        let provider = custom_provider();
        assert!(provider.resolve_handler("/v1/run/a/b", &Value::Null).is_none());
        assert!(provider.resolve_handler("/v1/run/", &Value::Null).is_none());
    }

    // ==================== Gemini Image Tests ====================

    /// Test that inline image output on generateContent resolves to the image
    /// handler even though the text handler owns the same endpoint
    #[test]
    fn test_gemini_inline_image_resolves_to_image_handler() {
        let registry = ProviderRegistry::with_defaults();
        let request = gemini_image_request();
        let response = gemini_image_response();

        let (provider, handler) = registry.resolve_request(&request, &response).unwrap();
        assert_eq!(provider.slug(), "google");
        assert_eq!(handler.name(), "generate_content_image");
        assert_eq!(handler.model_type(), ModelType::Image);

        let metrics = handler.extract_metrics(&request, &response);
        assert_eq!(metrics.image.map(|i| i.count), Some(1));
        assert_eq!(metrics.prompt_tokens(), 9);
        assert_eq!(metrics.completion_tokens(), 1290);

        let media = handler.media().map(|m| m.collect_media(&request, &response));
        assert_eq!(media.map(|m| m.len()), Some(1));
    }

    /// Test that a text-only body on the same endpoint stays on the text handler
    #[test]
    fn test_gemini_text_stays_on_default() {
        let registry = ProviderRegistry::with_defaults();
        let request = ApiRequest::new(
            "POST",
            "generativelanguage.googleapis.com",
            GEMINI_IMAGE_ENDPOINT,
        );
        let (_, handler) = registry
            .resolve_request(&request, &gemini_text_response())
            .unwrap();
        assert_eq!(handler.name(), "generate_content");
        assert_eq!(handler.model_type(), ModelType::Text);
    }

    // ==================== Determinism Tests ====================

    /// Test that repeated resolution yields the same handler
    #[test]
    fn test_resolution_is_deterministic() {
        let registry = ProviderRegistry::with_defaults();
        let cases: Vec<(ApiRequest, Value)> = vec![
            (gemini_image_request(), gemini_image_response()),
            (
                ApiRequest::new("POST", "api.openai.com", "/v1/responses"),
                json!({"output": [{"type": "image_generation_call", "result": "aGk="}]}),
            ),
            (
                ApiRequest::new("POST", "api.openai.com", "/v1/responses"),
                json!({"output": [{"type": "message", "content": []}]}),
            ),
            (
                ApiRequest::new("POST", "api.elevenlabs.io", "/v1/text-to-speech/voice-1"),
                Value::Null,
            ),
        ];

        for (request, body) in &cases {
            let first = registry.resolve_request(request, body).unwrap().1.name();
            for _ in 0..10 {
                assert_eq!(registry.resolve_request(request, body).unwrap().1.name(), first);
            }
        }
    }

    /// Test the capability each vendor endpoint maps to
    #[test]
    fn test_endpoint_capabilities() {
        let registry = ProviderRegistry::with_defaults();
        let cases = [
            ("api.openai.com", "/v1/chat/completions", ModelType::Text),
            ("api.openai.com", "/v1/embeddings", ModelType::Embedding),
            ("api.openai.com", "/v1/images/generations", ModelType::Image),
            ("api.openai.com", "/v1/audio/speech", ModelType::Tts),
            ("api.openai.com", "/v1/audio/transcriptions", ModelType::Stt),
            ("api.anthropic.com", "/v1/messages", ModelType::Text),
            ("api.cohere.com", "/v2/embed", ModelType::Embedding),
            ("api.elevenlabs.io", "/v1/speech-to-text", ModelType::Stt),
            ("localhost:11434", "/api/chat", ModelType::Text),
        ];
        for (host, path, expected) in cases {
            let request = ApiRequest::new("POST", host, path);
            let (_, handler) = registry
                .resolve_request(&request, &Value::Null)
                .unwrap_or_else(|| panic!("no handler for {}{}", host, path));
            assert_eq!(handler.model_type(), expected, "{}{}", host, path);
        }
    }
}
