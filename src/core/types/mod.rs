//! Core type definitions
//!
//! Value objects shared by handlers, the cost engine, the budget engine and
//! the tracker.

pub mod context;
pub mod metrics;
pub mod model;
pub mod record;
pub mod request;
pub mod trackable;

pub use context::{ContextState, FailureInfo, RequestContext};
pub use metrics::{AudioMetrics, ImageMetrics, Metrics, TokenMetrics, VideoMetrics};
pub use model::{ModelType, PricingTier};
pub use record::{CostFields, RequestRecord};
pub use request::{ApiRequest, ApiResponse, MultipartField};
pub use trackable::Trackable;
