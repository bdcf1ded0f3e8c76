//! Cost calculation
//!
//! Static per-provider, per-model, per-tier price tables and the arithmetic
//! that turns metrics into cents.

pub mod calculator;
pub mod lookup;
pub mod providers;
pub mod types;
pub mod utils;

pub use calculator::{CostCalculator, CostEstimate};
pub use lookup::{PricingLookup, PricingOverrides, ResolvedPricing};
pub use types::{BillingUnit, CostBreakdown, ModelPricing, PricingEntry, ProviderPricing};
pub use utils::{cents_to_dollars, format_cents};
