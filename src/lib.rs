//! # ai-usage-tracker
//!
//! Usage, cost and budget tracking for outbound calls to AI provider APIs.
//!
//! The host application keeps making its own HTTP calls. For each one it asks
//! the tracker to classify the call, extract usage from the vendor-specific
//! response, price it, and enforce per-subject budgets.
//!
//! ## Features
//!
//! - **Provider detection**: hosts map to vendors, endpoints to handlers
//! - **Metrics extraction**: tokens, cache reads and writes, reasoning,
//!   images, audio seconds, TTS characters and video seconds
//! - **Streaming**: SSE and NDJSON bodies aggregated on the fly, passed through
//!   unchanged
//! - **Tiered pricing**: batch, flex, standard and priority tables per model
//!   with longest-prefix fallback
//! - **Budgets**: daily, weekly, monthly and lifetime limits on cost, tokens
//!   and requests, with warning, critical and exceeded notifications
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_usage_tracker::{
//!     ApiRequest, ApiResponse, InMemoryUsageStore, TrackerConfig, Trackable, UsageTracker,
//! };
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TrackerConfig::from_env().await?;
//!     ai_usage_tracker::init_logging(&config.logging);
//!     let tracker = UsageTracker::from_config(&config, Arc::new(InMemoryUsageStore::new()));
//!
//!     let request = ApiRequest::new("POST", "api.openai.com", "/v1/chat/completions")
//!         .with_body(json!({"model": "gpt-4o", "messages": []}));
//!
//!     // Budget violations surface here, before the call is sent
//!     let ctx = tracker.begin(&request, Some(Trackable::new("user", "42"))).await?;
//!
//!     // ... send the request with your own HTTP client ...
//!     let response = ApiResponse::ok(json!({"model": "gpt-4o-2024-08-06", "choices": []}));
//!
//!     if let Some(ctx) = ctx {
//!         if let Some(record) = tracker.complete(ctx, &request, &response).await? {
//!             println!("cost: {} cents", record.cost.total_cost);
//!         }
//!     }
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod core;
pub mod utils;

pub use config::{TrackerConfig, Validate};
pub use utils::error::{Result, TrackerError};
pub use utils::logging::init_logging;

pub use core::budget::{
    BudgetConfig, BudgetEnforcer, BudgetError, BudgetEvent, BudgetLimits, BudgetStatus,
    InMemoryUsageStore, LimitType, NotificationSink, UsageStore,
};
pub use core::cost::{CostBreakdown, CostCalculator, CostEstimate};
pub use core::handlers::{Handler, InMemoryMediaStore, MediaStore};
pub use core::providers::{Provider, ProviderRegistry};
pub use core::streaming::{AggregatingStream, StreamOutcome};
pub use core::tracking::{
    ExporterSink, InMemoryExporter, InMemorySink, PersistenceSink, UsageTracker,
};
pub use core::types::{
    ApiRequest, ApiResponse, Metrics, ModelType, PricingTier, RequestContext, RequestRecord,
    TokenMetrics, Trackable,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Package name
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Package description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
