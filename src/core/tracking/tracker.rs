//! The tracker façade
//!
//! A call goes through [`UsageTracker::begin`] before it is sent and through
//! exactly one of [`complete`](UsageTracker::complete),
//! [`complete_stream`](UsageTracker::complete_stream) or
//! [`fail`](UsageTracker::fail) afterwards. Only budget violations raised by
//! `begin` are meant to reach the host; everything else degrades to logging.

use super::enrichment::{HeuristicTokenCounter, TokenCounter, estimate_stream_tokens};
use super::export::{ExporterSink, GenAiSpanBuilder, SpanBuilder};
use super::sink::PersistenceSink;
use crate::config::{TrackerConfig, TrackingConfig};
use crate::core::budget::{BudgetEnforcer, BudgetStatus, UsageStore};
use crate::core::cost::{CostCalculator, CostEstimate};
use crate::core::handlers::{
    Handler, MediaContext, MediaStore, StoredMedia, model_from_path, model_from_request_body,
    reasoning_effort_from_request,
};
use crate::core::providers::ProviderRegistry;
use crate::core::streaming::{AggregatingStream, StreamOutcome};
use crate::core::types::{
    ApiRequest, ApiResponse, ContextState, CostFields, Metrics, PricingTier, RequestContext,
    RequestRecord, Trackable, record::tokens_per_second,
};
use crate::utils::error::Result;
use crate::utils::json::{str_at, string_at};
use crate::utils::logging::{redact_payload, redact_str};
use crate::utils::truncate_string;
use chrono::Utc;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// What the handler (or the stream) says about a response beyond metrics
#[derive(Debug, Default)]
struct ResponseDetails {
    snapshot: Option<String>,
    request_model: Option<String>,
    finish_reason: Option<String>,
    has_tool_calls: bool,
    response_text: Option<String>,
    response_id: Option<String>,
}

impl ResponseDetails {
    fn from_body(handler: &dyn Handler, request: &ApiRequest, body: &Value) -> Self {
        Self {
            snapshot: handler.extract_model(body),
            request_model: handler
                .request_model()
                .and_then(|r| r.extract_model_from_request(request)),
            finish_reason: handler
                .finish_reason()
                .and_then(|f| f.extract_finish_reason(body)),
            has_tool_calls: handler.has_tool_calls(body),
            response_text: handler.extract_response_text(body),
            response_id: handler.extract_response_id(body),
        }
    }

    fn from_stream(handler: Option<&dyn Handler>, request: &ApiRequest, outcome: &StreamOutcome) -> Self {
        Self {
            snapshot: outcome.model.clone(),
            request_model: handler
                .and_then(|h| h.request_model())
                .and_then(|r| r.extract_model_from_request(request)),
            finish_reason: outcome.finish_reason.clone(),
            has_tool_calls: outcome.has_tool_calls,
            response_text: (!outcome.text.is_empty()).then(|| outcome.text.clone()),
            response_id: outcome.response_id.clone(),
        }
    }
}

/// Best human-readable error in a vendor error body
fn error_message(body: &Value) -> Option<String> {
    str_at(body, "error.message")
        .or_else(|| str_at(body, "error"))
        .or_else(|| str_at(body, "message"))
        .or_else(|| str_at(body, "detail.message"))
        .or_else(|| str_at(body, "detail"))
        .map(str::to_string)
}

pub struct UsageTracker {
    config: TrackingConfig,
    registry: Arc<ProviderRegistry>,
    calculator: Arc<CostCalculator>,
    budget: Option<Arc<BudgetEnforcer>>,
    default_provider: Option<String>,
    default_model: Option<String>,
    sinks: Vec<Arc<dyn PersistenceSink>>,
    exporters: Vec<Arc<dyn ExporterSink>>,
    span_builder: Arc<dyn SpanBuilder>,
    media_store: Option<Arc<dyn MediaStore>>,
    token_counter: Option<Arc<dyn TokenCounter>>,
}

impl fmt::Debug for UsageTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsageTracker")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .field("budget", &self.budget)
            .field("sinks", &self.sinks.len())
            .field("exporters", &self.exporters.len())
            .field("media_store", &self.media_store.is_some())
            .field("token_counter", &self.token_counter.is_some())
            .finish()
    }
}

impl UsageTracker {
    pub fn builder() -> UsageTrackerBuilder {
        UsageTrackerBuilder::default()
    }

    /// Tracker wired from configuration. Sinks, exporters and the media
    /// store are added by the host through [`builder`](Self::builder).
    pub fn from_config(config: &TrackerConfig, store: Arc<dyn UsageStore>) -> Self {
        Self::builder_from_config(config, store).build()
    }

    /// Builder preloaded from configuration
    pub fn builder_from_config(
        config: &TrackerConfig,
        store: Arc<dyn UsageStore>,
    ) -> UsageTrackerBuilder {
        Self::builder()
            .config(config.tracking.clone())
            .registry(ProviderRegistry::from_config(&config.providers))
            .calculator(CostCalculator::with_overrides(
                &config.pricing.overrides,
                &config.pricing.default_tiers,
            ))
            .budget(BudgetEnforcer::from_settings(&config.budget, store))
            .budget_defaults(
                config.budget.default_provider.clone(),
                config.budget.default_model.clone(),
            )
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn calculator(&self) -> &CostCalculator {
        &self.calculator
    }

    pub fn budget(&self) -> Option<&BudgetEnforcer> {
        self.budget.as_deref()
    }

    /// Start tracking a call. Returns `None` for calls that are not tracked
    /// (tracking disabled or an unknown host). Fails only when a budget
    /// rejects the call.
    pub async fn begin(
        &self,
        request: &ApiRequest,
        trackable: Option<Trackable>,
    ) -> Result<Option<RequestContext>> {
        if !self.config.enabled {
            return Ok(None);
        }
        let Some(provider) = self.registry.resolve(&request.host) else {
            debug!(host = %request.host, "host is not an AI provider, not tracking");
            return Ok(None);
        };

        let mut ctx = RequestContext::new(provider.slug(), request.endpoint(), &request.method)
            .streaming(request.is_streaming());

        let model = model_from_request_body(request).or_else(|| model_from_path(request));
        if let Some(model) = &model {
            ctx = ctx.with_model(model.clone());
        }
        if let Some(tier) = request
            .body_str("service_tier")
            .and_then(PricingTier::from_service_tier)
        {
            ctx = ctx.with_pricing_tier(tier);
        }
        if self.config.store_request_payloads && !request.body.is_null() {
            ctx = ctx.with_request_payload(self.stored_payload(&request.body));
        }

        if let Some(subject) = trackable {
            if let Some(budget) = &self.budget {
                budget
                    .check(&subject, Some(provider.slug()), model.as_deref())
                    .await?;
            }
            ctx = ctx.with_trackable(subject);
        }

        debug!(
            id = %ctx.id,
            provider = %ctx.provider,
            endpoint = %ctx.endpoint,
            model = ctx.model.as_deref().unwrap_or("unknown"),
            "tracking call"
        );
        Ok(Some(ctx))
    }

    /// Finish a non-streamed call. Failed HTTP statuses take the failure
    /// path. Returns `None` when the handler asks to skip a non-terminal
    /// response, e.g. a video job that is still running.
    pub async fn complete(
        &self,
        mut ctx: RequestContext,
        request: &ApiRequest,
        response: &ApiResponse,
    ) -> Result<Option<RequestRecord>> {
        if response.is_failure() {
            let message = error_message(&response.body)
                .unwrap_or_else(|| format!("HTTP {}", response.status));
            let record = self
                .fail(ctx, "http_error", message, Some(response.status))
                .await?;
            return Ok(Some(record));
        }

        let handler = self.resolve_handler(&ctx, &response.body);
        if let Some(handler) = &handler {
            if handler
                .response_skipper()
                .is_some_and(|s| s.should_skip_response(&response.body))
            {
                debug!(id = %ctx.id, handler = handler.name(), "skipping non-terminal response");
                return Ok(None);
            }
        }

        let (metrics, details) = match &handler {
            Some(handler) => (
                handler.extract_metrics(request, &response.body),
                ResponseDetails::from_body(&**handler, request, &response.body),
            ),
            None => (Metrics::empty(), ResponseDetails::default()),
        };

        ctx.http_status = Some(response.status);
        ctx.complete(response.body.clone(), metrics)?;

        let media = self
            .store_media(&ctx, handler.as_deref(), request, &response.body, &details)
            .await;
        let record = self.build_record(&ctx, handler.as_deref(), details, media);
        self.dispatch(&record).await;
        Ok(Some(record))
    }

    /// Tap a streamed response body. The returned stream yields the body
    /// unchanged; the receiver gets the aggregated outcome once it ends.
    pub fn wrap_stream<S>(
        &self,
        ctx: &RequestContext,
        request: &ApiRequest,
        stream: S,
    ) -> Option<(AggregatingStream<S>, oneshot::Receiver<StreamOutcome>)> {
        let handler = self.resolve_handler(ctx, &Value::Null)?;
        AggregatingStream::new(stream, handler, request.clone())
    }

    /// Finish a streamed call from its aggregated outcome.
    pub async fn complete_stream(
        &self,
        mut ctx: RequestContext,
        request: &ApiRequest,
        outcome: StreamOutcome,
    ) -> Result<RequestRecord> {
        let handler = self.resolve_handler(&ctx, &outcome.assembled);
        let details = ResponseDetails::from_stream(handler.as_deref(), request, &outcome);

        let mut metrics = outcome.metrics.clone();
        if !outcome.has_usage() {
            if let Some(counter) = &self.token_counter {
                let model = details.snapshot.as_deref().or(ctx.model.as_deref());
                if let Some(tokens) = estimate_stream_tokens(
                    counter.as_ref(),
                    &ctx.provider,
                    model,
                    request,
                    &outcome.text,
                )
                .await
                {
                    metrics = metrics.with_tokens(Some(tokens));
                    ctx.metadata
                        .insert("tokens_estimated".to_string(), Value::Bool(true));
                }
            }
        }

        ctx.is_streaming = true;
        if ctx.time_to_first_token.is_none() {
            ctx.time_to_first_token = outcome.time_to_first_token;
        }
        if outcome.dropped_chunks > 0 {
            debug!(
                id = %ctx.id,
                dropped = outcome.dropped_chunks,
                "stream had malformed chunks"
            );
        }
        ctx.complete(outcome.assembled.clone(), metrics)?;

        let record = self.build_record(&ctx, handler.as_deref(), details, Vec::new());
        self.dispatch(&record).await;
        Ok(record)
    }

    /// Finish a call that failed, either with an HTTP error or a transport
    /// error (`http_status` is `None`).
    pub async fn fail(
        &self,
        mut ctx: RequestContext,
        kind: impl Into<String>,
        message: impl Into<String>,
        http_status: Option<u16>,
    ) -> Result<RequestRecord> {
        let message = redact_str(&message.into());
        ctx.fail(kind, message, http_status)?;

        let handler = self.resolve_handler(&ctx, &Value::Null);
        let record = self.build_record(&ctx, handler.as_deref(), ResponseDetails::default(), Vec::new());
        debug!(
            id = %record.id,
            provider = %record.provider,
            status = ?record.http_status,
            error = record.error_message.as_deref().unwrap_or(""),
            "tracked call failed"
        );
        self.dispatch(&record).await;
        Ok(record)
    }

    /// Pre-call cost range. Provider and model fall back to the configured
    /// budget defaults.
    pub fn estimate_cost(
        &self,
        prompt: &str,
        provider: Option<&str>,
        model: Option<&str>,
        max_output_tokens: Option<u64>,
    ) -> Option<CostEstimate> {
        let provider = provider.or(self.default_provider.as_deref())?;
        let model = model.or(self.default_model.as_deref())?;
        Some(
            self.calculator
                .estimate(provider, model, prompt, max_output_tokens, None),
        )
    }

    /// Current budget position of `subject`, including the allow-lists
    /// when a provider or model is named
    pub async fn budget_status(
        &self,
        subject: &Trackable,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> BudgetStatus {
        match &self.budget {
            Some(budget) => budget.status(subject, provider, model).await,
            None => BudgetStatus::unlimited(subject.clone()),
        }
    }

    fn resolve_handler(&self, ctx: &RequestContext, body: &Value) -> Option<Arc<dyn Handler>> {
        let provider = self.registry.get(&ctx.provider)?;
        let handler = provider.resolve_handler(&ctx.endpoint, body);
        if handler.is_none() {
            debug!(
                provider = %ctx.provider,
                endpoint = %ctx.endpoint,
                "no handler for endpoint, metrics are empty"
            );
        }
        handler
    }

    fn stored_payload(&self, body: &Value) -> Value {
        if self.config.redact_payloads {
            redact_payload(body)
        } else {
            body.clone()
        }
    }

    async fn store_media(
        &self,
        ctx: &RequestContext,
        handler: Option<&dyn Handler>,
        request: &ApiRequest,
        body: &Value,
        details: &ResponseDetails,
    ) -> Vec<StoredMedia> {
        let (Some(store), Some(media)) = (&self.media_store, handler.and_then(|h| h.media()))
        else {
            return Vec::new();
        };
        let context = MediaContext {
            request_id: ctx.id,
            provider: ctx.provider.clone(),
            model: details.snapshot.clone().or_else(|| ctx.model.clone()),
        };

        let mut stored = Vec::new();
        for payload in media.collect_media(request, body) {
            match store.store(&payload, &context).await {
                Ok(item) => stored.push(item),
                Err(e) => warn!(id = %ctx.id, error = %e, "failed to store media"),
            }
        }
        stored
    }

    fn build_record(
        &self,
        ctx: &RequestContext,
        handler: Option<&dyn Handler>,
        details: ResponseDetails,
        media: Vec<StoredMedia>,
    ) -> RequestRecord {
        let success = ctx.state() == ContextState::Completed;
        let metrics = &ctx.metrics;
        let tokens = metrics.tokens.unwrap_or_default();

        let model = ctx
            .model
            .clone()
            .or(details.request_model)
            .or_else(|| details.snapshot.clone());
        let priced_model = details.snapshot.as_deref().or(model.as_deref());

        let tier_hint = ctx
            .response_payload
            .as_ref()
            .and_then(|body| string_at(body, "service_tier"))
            .and_then(|tier| PricingTier::from_service_tier(&tier))
            .or(ctx.pricing_tier);

        let (cost, pricing_tier) = match priced_model {
            Some(priced) if success && self.config.track_costs => {
                let breakdown =
                    self.calculator
                        .calculate_metrics(&ctx.provider, priced, metrics, tier_hint);
                (CostFields::from(&breakdown), breakdown.tier)
            }
            _ => (
                CostFields::default(),
                self.calculator.resolve_tier(&ctx.provider, tier_hint),
            ),
        };

        let latency_ms = ctx.elapsed().as_millis() as u64;
        let time_to_first_token_ms = ctx.time_to_first_token.map(|d| d.as_millis() as u64);
        let reasoning_effort = ctx
            .request_payload
            .is_object()
            .then(|| {
                reasoning_effort_from_request(
                    &ApiRequest::new(&ctx.operation, "", &ctx.endpoint)
                        .with_body(ctx.request_payload.clone()),
                )
            })
            .flatten();

        let response_text = if self.config.store_response_text {
            details.response_text.map(|text| match self.config.max_response_text_chars {
                Some(max) => truncate_string(&text, max),
                None => text,
            })
        } else {
            None
        };

        RequestRecord {
            id: ctx.id,
            trace_id: ctx.trace_id.clone(),
            provider: ctx.provider.clone(),
            model,
            snapshot: details.snapshot,
            model_type: handler.map(|h| h.model_type()),
            handler: handler.map(|h| h.name().to_string()),
            endpoint: ctx.endpoint.clone(),
            operation: ctx.operation.clone(),

            prompt_tokens: tokens.prompt_tokens,
            completion_tokens: tokens.completion_tokens,
            cached_tokens: tokens.cached_tokens,
            reasoning_tokens: tokens.reasoning_tokens,
            cache_creation_tokens: tokens.cache_creation_tokens,
            total_tokens: tokens.total_tokens(),
            duration_seconds: metrics
                .audio
                .and_then(|a| a.duration_seconds)
                .or_else(|| metrics.video.and_then(|v| v.duration_seconds)),
            input_characters: metrics.audio.and_then(|a| a.input_characters),
            image_count: metrics.image.map(|i| i.count),
            video_count: metrics.video.map(|v| v.count),

            pricing_tier,
            cost,

            latency_ms,
            time_to_first_token_ms,
            tokens_per_second: tokens_per_second(
                tokens.completion_tokens,
                latency_ms,
                time_to_first_token_ms,
            ),

            is_reasoning: tokens.reasoning_tokens > 0 || reasoning_effort.is_some(),
            reasoning_effort,
            is_streaming: ctx.is_streaming,
            finish_reason: details.finish_reason,
            has_tool_calls: details.has_tool_calls,

            http_status: ctx.http_status,
            success,
            error_kind: ctx.failure.as_ref().map(|f| f.kind.clone()),
            error_message: ctx.failure.as_ref().map(|f| f.message.clone()),

            trackable: ctx.trackable.clone(),
            tags: ctx.tags().to_vec(),
            metadata: ctx.metadata.clone(),
            request_payload: (self.config.store_request_payloads && !ctx.request_payload.is_null())
                .then(|| ctx.request_payload.clone()),
            response_text,
            response_id: details.response_id,
            media,

            started_at: ctx.started_at,
            completed_at: ctx.completed_at.unwrap_or_else(Utc::now),
        }
    }

    async fn dispatch(&self, record: &RequestRecord) {
        if record.success || self.config.persist_failures {
            for sink in &self.sinks {
                if let Err(e) = sink.persist(record).await {
                    warn!(id = %record.id, error = %e, "persistence sink failed");
                }
            }
        }

        if !self.exporters.is_empty() {
            let span = self.span_builder.build(record);
            for exporter in &self.exporters {
                if let Err(e) = exporter.export(&span).await {
                    warn!(id = %record.id, error = %e, "exporter sink failed");
                }
            }
        }

        if record.success {
            if let Some(budget) = &self.budget {
                budget.record_usage(record).await;
            }
        }
    }
}

pub struct UsageTrackerBuilder {
    config: TrackingConfig,
    registry: Option<ProviderRegistry>,
    calculator: Option<CostCalculator>,
    budget: Option<Arc<BudgetEnforcer>>,
    default_provider: Option<String>,
    default_model: Option<String>,
    sinks: Vec<Arc<dyn PersistenceSink>>,
    exporters: Vec<Arc<dyn ExporterSink>>,
    span_builder: Arc<dyn SpanBuilder>,
    media_store: Option<Arc<dyn MediaStore>>,
    token_counter: Option<Arc<dyn TokenCounter>>,
}

impl Default for UsageTrackerBuilder {
    fn default() -> Self {
        Self {
            config: TrackingConfig::default(),
            registry: None,
            calculator: None,
            budget: None,
            default_provider: None,
            default_model: None,
            sinks: Vec::new(),
            exporters: Vec::new(),
            span_builder: Arc::new(GenAiSpanBuilder),
            media_store: None,
            token_counter: Some(Arc::new(HeuristicTokenCounter)),
        }
    }
}

impl UsageTrackerBuilder {
    pub fn config(mut self, config: TrackingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn registry(mut self, registry: ProviderRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn calculator(mut self, calculator: CostCalculator) -> Self {
        self.calculator = Some(calculator);
        self
    }

    pub fn budget(self, budget: BudgetEnforcer) -> Self {
        self.shared_budget(Arc::new(budget))
    }

    /// Share one enforcer between several trackers
    pub fn shared_budget(mut self, budget: Arc<BudgetEnforcer>) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Provider and model used by [`UsageTracker::estimate_cost`] when the
    /// caller names none
    pub fn budget_defaults(mut self, provider: Option<String>, model: Option<String>) -> Self {
        self.default_provider = provider;
        self.default_model = model;
        self
    }

    pub fn sink(mut self, sink: Arc<dyn PersistenceSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn exporter(mut self, exporter: Arc<dyn ExporterSink>) -> Self {
        self.exporters.push(exporter);
        self
    }

    pub fn span_builder(mut self, builder: Arc<dyn SpanBuilder>) -> Self {
        self.span_builder = builder;
        self
    }

    pub fn media_store(mut self, store: Arc<dyn MediaStore>) -> Self {
        self.media_store = Some(store);
        self
    }

    /// `None` disables token estimation for streams without usage
    pub fn token_counter(mut self, counter: Option<Arc<dyn TokenCounter>>) -> Self {
        self.token_counter = counter;
        self
    }

    pub fn build(self) -> UsageTracker {
        UsageTracker {
            config: self.config,
            registry: Arc::new(
                self.registry
                    .unwrap_or_else(ProviderRegistry::with_defaults),
            ),
            calculator: Arc::new(self.calculator.unwrap_or_default()),
            budget: self.budget,
            default_provider: self.default_provider,
            default_model: self.default_model,
            sinks: self.sinks,
            exporters: self.exporters,
            span_builder: self.span_builder,
            media_store: self.media_store,
            token_counter: self.token_counter,
        }
    }
}
