//! Budgets per trackable subject
//!
//! Limits are checked against aggregates queried from a [`UsageStore`],
//! thresholds are announced once per window through [`NotificationSink`]s,
//! and hard limits reject calls with a [`BudgetError`].

mod enforcer;
mod error;
mod notify;
mod provider;
mod store;
mod types;

pub use enforcer::{
    BudgetEnforcer, BudgetEnforcerBuilder, Clock, DEFAULT_CRITICAL_THRESHOLD,
    DEFAULT_WARNING_THRESHOLD,
};
pub use error::BudgetError;
pub use notify::{BudgetEvent, ChannelNotifier, NotificationSink, TracingNotifier};
pub use provider::{BudgetProvider, StaticBudgetProvider};
pub use store::{InMemoryUsageStore, UsageStore};
pub use types::{
    BudgetConfig, BudgetLimits, BudgetStatus, BudgetUsage, LimitMetric, LimitStatus, LimitType,
    Period, ThresholdStage, UsageTotals,
};

#[cfg(test)]
pub(crate) use store::MockUsageStore;

pub use crate::core::types::Trackable;
