//! Budget value types

use super::error::BudgetError;
use crate::core::types::Trackable;
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Budget window. Windows start at UTC midnight; weeks start on Monday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Total,
}

impl Period {
    pub const ALL: [Period; 4] = [Period::Daily, Period::Weekly, Period::Monthly, Period::Total];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
            Period::Monthly => "monthly",
            Period::Total => "total",
        }
    }

    /// Start of the window containing `now`
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let midnight = |date: chrono::NaiveDate| {
            Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0).unwrap_or_default())
        };
        let today = now.date_naive();
        match self {
            Period::Daily => midnight(today),
            Period::Weekly => {
                let days = i64::from(today.weekday().num_days_from_monday());
                midnight(today - Duration::days(days))
            }
            Period::Monthly => midnight(today.with_day(1).unwrap_or(today)),
            Period::Total => DateTime::<Utc>::UNIX_EPOCH,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a limit measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LimitMetric {
    /// Spend in cents
    Cost,
    Tokens,
    Requests,
}

impl LimitMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            LimitMetric::Cost => "cost",
            LimitMetric::Tokens => "tokens",
            LimitMetric::Requests => "requests",
        }
    }
}

/// A limit's window and measure, e.g. `daily_cost`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LimitType {
    pub period: Period,
    pub metric: LimitMetric,
}

impl LimitType {
    pub const fn new(period: Period, metric: LimitMetric) -> Self {
        Self { period, metric }
    }

    pub const fn daily_cost() -> Self {
        Self::new(Period::Daily, LimitMetric::Cost)
    }

    pub const fn weekly_cost() -> Self {
        Self::new(Period::Weekly, LimitMetric::Cost)
    }

    pub const fn monthly_cost() -> Self {
        Self::new(Period::Monthly, LimitMetric::Cost)
    }

    pub const fn total_cost() -> Self {
        Self::new(Period::Total, LimitMetric::Cost)
    }
}

impl fmt::Display for LimitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.period.as_str(), self.metric.as_str())
    }
}

/// Threshold stages, in escalation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdStage {
    Warning,
    Critical,
    Exceeded,
}

impl ThresholdStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThresholdStage::Warning => "warning",
            ThresholdStage::Critical => "critical",
            ThresholdStage::Exceeded => "exceeded",
        }
    }

    /// Stages below this one
    pub fn lower(&self) -> &'static [ThresholdStage] {
        match self {
            ThresholdStage::Warning => &[],
            ThresholdStage::Critical => &[ThresholdStage::Warning],
            ThresholdStage::Exceeded => &[ThresholdStage::Warning, ThresholdStage::Critical],
        }
    }
}

impl fmt::Display for ThresholdStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured limits. Cost limits are in cents. Unset or zero limits are
/// not enforced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetLimits {
    pub daily_limit: Option<f64>,
    pub weekly_limit: Option<f64>,
    pub monthly_limit: Option<f64>,
    pub total_limit: Option<f64>,
    pub daily_token_limit: Option<u64>,
    pub weekly_token_limit: Option<u64>,
    pub monthly_token_limit: Option<u64>,
    pub total_token_limit: Option<u64>,
    pub daily_request_limit: Option<u64>,
    pub weekly_request_limit: Option<u64>,
    pub monthly_request_limit: Option<u64>,
    pub total_request_limit: Option<u64>,
}

impl BudgetLimits {
    pub fn get(&self, limit_type: LimitType) -> Option<f64> {
        let (cost, tokens, requests) = match limit_type.period {
            Period::Daily => (self.daily_limit, self.daily_token_limit, self.daily_request_limit),
            Period::Weekly => (self.weekly_limit, self.weekly_token_limit, self.weekly_request_limit),
            Period::Monthly => (
                self.monthly_limit,
                self.monthly_token_limit,
                self.monthly_request_limit,
            ),
            Period::Total => (self.total_limit, self.total_token_limit, self.total_request_limit),
        };
        match limit_type.metric {
            LimitMetric::Cost => cost,
            LimitMetric::Tokens => tokens.map(|t| t as f64),
            LimitMetric::Requests => requests.map(|r| r as f64),
        }
    }

    /// Limits that are set and positive
    pub fn configured(&self) -> Vec<(LimitType, f64)> {
        let mut limits = Vec::new();
        for period in Period::ALL {
            for metric in [LimitMetric::Cost, LimitMetric::Tokens, LimitMetric::Requests] {
                let limit_type = LimitType::new(period, metric);
                if let Some(limit) = self.get(limit_type).filter(|l| *l > 0.0) {
                    limits.push((limit_type, limit));
                }
            }
        }
        limits
    }

    pub fn is_empty(&self) -> bool {
        self.configured().is_empty()
    }
}

fn default_true() -> bool {
    true
}

/// One budget: limits, thresholds and allow-lists for a subject. A budget
/// without `trackable_id` applies to every subject of its type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    pub trackable_type: String,
    #[serde(default)]
    pub trackable_id: Option<String>,
    #[serde(flatten)]
    pub limits: BudgetLimits,
    /// Reject calls once a limit is reached
    #[serde(default)]
    pub hard_limit: bool,
    /// Percentage of a limit, defaults to the global setting
    #[serde(default)]
    pub warning_threshold: Option<f64>,
    #[serde(default)]
    pub critical_threshold: Option<f64>,
    /// Empty means any provider
    #[serde(default)]
    pub allowed_providers: Vec<String>,
    /// Empty means any model. A trailing `*` matches a prefix.
    #[serde(default)]
    pub allowed_models: Vec<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl BudgetConfig {
    pub fn for_type(trackable_type: impl Into<String>) -> Self {
        Self {
            trackable_type: trackable_type.into(),
            trackable_id: None,
            limits: BudgetLimits::default(),
            hard_limit: false,
            warning_threshold: None,
            critical_threshold: None,
            allowed_providers: Vec::new(),
            allowed_models: Vec::new(),
            enabled: true,
        }
    }

    pub fn for_subject(subject: &Trackable) -> Self {
        let mut budget = Self::for_type(subject.kind.clone());
        budget.trackable_id = Some(subject.id.clone());
        budget
    }

    pub fn with_limits(mut self, limits: BudgetLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn hard(mut self) -> Self {
        self.hard_limit = true;
        self
    }

    pub fn with_thresholds(mut self, warning: f64, critical: f64) -> Self {
        self.warning_threshold = Some(warning);
        self.critical_threshold = Some(critical);
        self
    }

    pub fn allow_providers<I, S>(mut self, providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_providers = providers.into_iter().map(Into::into).collect();
        self
    }

    pub fn allow_models<I, S>(mut self, models: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_models = models.into_iter().map(Into::into).collect();
        self
    }

    /// Whether this budget covers `subject`
    pub fn applies_to(&self, subject: &Trackable) -> bool {
        self.trackable_type == subject.kind
            && self.trackable_id.as_ref().is_none_or(|id| *id == subject.id)
    }

    pub fn allows_provider(&self, provider: &str) -> bool {
        self.allowed_providers.is_empty()
            || self
                .allowed_providers
                .iter()
                .any(|p| p.eq_ignore_ascii_case(provider))
    }

    /// Model ids compare case-insensitively, like provider slugs.
    /// A trailing `*` makes the pattern a prefix.
    pub fn allows_model(&self, model: &str) -> bool {
        let model = model.to_ascii_lowercase();
        self.allowed_models.is_empty()
            || self.allowed_models.iter().any(|pattern| {
                let pattern = pattern.to_ascii_lowercase();
                match pattern.strip_suffix('*') {
                    Some(prefix) => model.starts_with(prefix),
                    None => pattern == model,
                }
            })
    }
}

/// Aggregated usage over one window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageTotals {
    /// Cents
    pub cost: f64,
    pub tokens: u64,
    pub requests: u64,
}

impl UsageTotals {
    pub fn value(&self, metric: LimitMetric) -> f64 {
        match metric {
            LimitMetric::Cost => self.cost,
            LimitMetric::Tokens => self.tokens as f64,
            LimitMetric::Requests => self.requests as f64,
        }
    }
}

/// Usage snapshot for one subject across every window
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetUsage {
    pub daily: UsageTotals,
    pub weekly: UsageTotals,
    pub monthly: UsageTotals,
    pub total: UsageTotals,
}

impl BudgetUsage {
    pub fn period(&self, period: Period) -> &UsageTotals {
        match period {
            Period::Daily => &self.daily,
            Period::Weekly => &self.weekly,
            Period::Monthly => &self.monthly,
            Period::Total => &self.total,
        }
    }

    pub fn period_mut(&mut self, period: Period) -> &mut UsageTotals {
        match period {
            Period::Daily => &mut self.daily,
            Period::Weekly => &mut self.weekly,
            Period::Monthly => &mut self.monthly,
            Period::Total => &mut self.total,
        }
    }

    pub fn value(&self, limit_type: LimitType) -> f64 {
        self.period(limit_type.period).value(limit_type.metric)
    }
}

/// One limit compared against usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitStatus {
    pub limit_type: LimitType,
    pub limit: f64,
    pub usage: f64,
    pub percentage: f64,
    pub stage: Option<ThresholdStage>,
    pub window_start: DateTime<Utc>,
}

impl LimitStatus {
    pub fn is_exceeded(&self) -> bool {
        self.stage == Some(ThresholdStage::Exceeded)
    }

    pub fn overage(&self) -> f64 {
        (self.usage - self.limit).max(0.0)
    }
}

/// Limits combined with usage for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetStatus {
    pub subject: Trackable,
    pub allowed: bool,
    pub hard_limit: bool,
    /// Highest utilisation across limits, in percent
    pub max_utilization: f64,
    pub usage: BudgetUsage,
    pub limits: Vec<LimitStatus>,
    /// Why the call is not allowed
    #[serde(skip)]
    pub violation: Option<BudgetError>,
}

impl BudgetStatus {
    /// Status of a subject without a budget
    pub fn unlimited(subject: Trackable) -> Self {
        Self {
            subject,
            allowed: true,
            hard_limit: false,
            max_utilization: 0.0,
            usage: BudgetUsage::default(),
            limits: Vec::new(),
            violation: None,
        }
    }

    pub fn limit(&self, limit_type: LimitType) -> Option<&LimitStatus> {
        self.limits.iter().find(|l| l.limit_type == limit_type)
    }

    /// The most utilised exceeded limit
    pub fn worst_exceeded(&self) -> Option<&LimitStatus> {
        self.limits
            .iter()
            .filter(|l| l.is_exceeded())
            .max_by(|a, b| a.percentage.total_cmp(&b.percentage))
    }
}
