//! Budget enforcement
//!
//! Per (subject, limit type, window) the stages escalate
//! `below warning → warning → critical → exceeded`. Each stage is announced
//! at most once per window: the dedupe key includes the window start, so
//! notifications re-arm when a new day, week or month begins. When usage
//! skips a stage, only the highest stage is announced and the skipped ones
//! are marked as fired.
//!
//! Hard budgets reject every call while a limit is exceeded. Soft budgets
//! only notify. Provider and model allow-lists always reject.

use super::error::BudgetError;
use super::notify::{BudgetEvent, NotificationSink, TracingNotifier};
use super::provider::{BudgetProvider, StaticBudgetProvider};
use super::store::UsageStore;
use super::types::{
    BudgetConfig, BudgetStatus, BudgetUsage, LimitStatus, LimitType, Period, ThresholdStage,
};
use crate::config::BudgetSettings;
use crate::core::types::{RequestRecord, Trackable};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Source of the current time
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

pub const DEFAULT_WARNING_THRESHOLD: f64 = 80.0;
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 95.0;

/// Fired-stage maps larger than this are pruned of past windows
const PRUNE_THRESHOLD: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FiredKey {
    subject: String,
    limit_type: LimitType,
    stage: ThresholdStage,
    window_start: DateTime<Utc>,
}

impl fmt::Display for FiredKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}",
            self.subject,
            self.limit_type,
            self.stage,
            self.window_start.timestamp()
        )
    }
}

pub struct BudgetEnforcer {
    enabled: bool,
    budgets: Arc<dyn BudgetProvider>,
    store: Arc<dyn UsageStore>,
    notifiers: Vec<Arc<dyn NotificationSink>>,
    warning_threshold: f64,
    critical_threshold: f64,
    fired: DashMap<FiredKey, DateTime<Utc>>,
    clock: Clock,
}

impl fmt::Debug for BudgetEnforcer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BudgetEnforcer")
            .field("enabled", &self.enabled)
            .field("warning_threshold", &self.warning_threshold)
            .field("critical_threshold", &self.critical_threshold)
            .field("notifiers", &self.notifiers.len())
            .field("fired", &self.fired.len())
            .finish()
    }
}

impl BudgetEnforcer {
    pub fn builder(
        budgets: Arc<dyn BudgetProvider>,
        store: Arc<dyn UsageStore>,
    ) -> BudgetEnforcerBuilder {
        BudgetEnforcerBuilder {
            enabled: true,
            budgets,
            store,
            notifiers: Vec::new(),
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
            clock: Arc::new(Utc::now),
        }
    }

    /// Enforcer over the configured budgets, logging events via `tracing`
    pub fn from_settings(settings: &BudgetSettings, store: Arc<dyn UsageStore>) -> Self {
        Self::builder(
            Arc::new(StaticBudgetProvider::new(settings.budgets.clone())),
            store,
        )
        .enabled(settings.enabled)
        .thresholds(settings.warning_threshold, settings.critical_threshold)
        .notifier(Arc::new(TracingNotifier))
        .build()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn store(&self) -> &Arc<dyn UsageStore> {
        &self.store
    }

    /// Number of stages announced and not yet pruned
    pub fn fired_count(&self) -> usize {
        self.fired.len()
    }

    /// Current status without notifications. With a provider or model the
    /// allow-lists are applied too and reported as the violation.
    pub async fn status(
        &self,
        subject: &Trackable,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> BudgetStatus {
        if !self.enabled {
            return BudgetStatus::unlimited(subject.clone());
        }
        let Some(budget) = self.load_budget(subject).await else {
            return BudgetStatus::unlimited(subject.clone());
        };

        let mut status = self.evaluate(subject, &budget, (self.clock)()).await;
        if let Some(violation) = allow_list_violation(subject, &budget, provider, model) {
            status.violation = Some(violation);
            status.allowed = false;
        }
        status
    }

    /// Pre-call check. Announces newly reached stages and rejects the call
    /// when a hard limit is exceeded or an allow-list excludes it.
    pub async fn check(
        &self,
        subject: &Trackable,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Result<BudgetStatus, BudgetError> {
        if !self.enabled {
            return Ok(BudgetStatus::unlimited(subject.clone()));
        }
        let Some(budget) = self.load_budget(subject).await else {
            return Ok(BudgetStatus::unlimited(subject.clone()));
        };

        if let Some(violation) = allow_list_violation(subject, &budget, provider, model) {
            return Err(violation);
        }

        let now = (self.clock)();
        let status = self.evaluate(subject, &budget, now).await;
        self.dispatch(&status, now).await;

        match &status.violation {
            Some(violation) => {
                debug!(subject = %subject, error = %violation, "call rejected by budget");
                Err(violation.clone())
            }
            None => Ok(status),
        }
    }

    /// Post-call bookkeeping: add the record to the aggregates and announce
    /// any stage the call pushed usage into. Never rejects.
    pub async fn record_usage(&self, record: &RequestRecord) {
        let Some(subject) = &record.trackable else {
            return;
        };
        if let Err(e) = self.store.record(record).await {
            warn!(subject = %subject, error = %e, "failed to record usage");
        }
        if !self.enabled {
            return;
        }
        if let Some(budget) = self.load_budget(subject).await {
            let now = (self.clock)();
            let status = self.evaluate(subject, &budget, now).await;
            self.dispatch(&status, now).await;
        }
    }

    /// Forget stages announced in windows that have ended.
    pub fn prune_fired(&self) {
        let now = (self.clock)();
        self.fired
            .retain(|key, _| key.window_start >= key.limit_type.period.window_start(now));
    }

    async fn load_budget(&self, subject: &Trackable) -> Option<BudgetConfig> {
        match self.budgets.budget_for(subject).await {
            Ok(budget) => budget.filter(|b| b.enabled),
            Err(e) => {
                warn!(subject = %subject, error = %e, "budget lookup failed, allowing call");
                None
            }
        }
    }

    async fn evaluate(
        &self,
        subject: &Trackable,
        budget: &BudgetConfig,
        now: DateTime<Utc>,
    ) -> BudgetStatus {
        let configured = budget.limits.configured();
        let periods: BTreeSet<Period> = configured.iter().map(|(t, _)| t.period).collect();

        let mut usage = BudgetUsage::default();
        for period in periods {
            let since = period.window_start(now);
            match self.store.usage_since(subject, since).await {
                Ok(totals) => *usage.period_mut(period) = totals,
                Err(e) => warn!(
                    subject = %subject,
                    period = %period,
                    error = %e,
                    "usage query failed, treating usage as zero"
                ),
            }
        }

        let warning = budget.warning_threshold.unwrap_or(self.warning_threshold);
        let critical = budget.critical_threshold.unwrap_or(self.critical_threshold);

        let limits: Vec<LimitStatus> = configured
            .into_iter()
            .map(|(limit_type, limit)| {
                let used = usage.value(limit_type);
                let percentage = used / limit * 100.0;
                LimitStatus {
                    limit_type,
                    limit,
                    usage: used,
                    percentage,
                    stage: stage_for(percentage, warning, critical),
                    window_start: limit_type.period.window_start(now),
                }
            })
            .collect();

        let max_utilization = limits.iter().map(|l| l.percentage).fold(0.0, f64::max);
        let mut status = BudgetStatus {
            subject: subject.clone(),
            allowed: true,
            hard_limit: budget.hard_limit,
            max_utilization,
            usage,
            limits,
            violation: None,
        };

        if budget.hard_limit {
            if let Some(worst) = status.worst_exceeded() {
                status.violation = Some(BudgetError::LimitExceeded {
                    subject: subject.clone(),
                    limit_type: worst.limit_type,
                    limit: worst.limit,
                    usage: worst.usage,
                    overage: worst.overage(),
                    percentage: worst.percentage,
                });
                status.allowed = false;
            }
        }
        status
    }

    async fn dispatch(&self, status: &BudgetStatus, now: DateTime<Utc>) {
        if self.fired.len() > PRUNE_THRESHOLD {
            self.prune_fired();
        }
        let subject_key = status.subject.key();
        for limit in &status.limits {
            let Some(stage) = limit.stage else {
                continue;
            };
            let key = |stage| FiredKey {
                subject: subject_key.clone(),
                limit_type: limit.limit_type,
                stage,
                window_start: limit.window_start,
            };

            let first = match self.fired.entry(key(stage)) {
                Entry::Occupied(_) => false,
                Entry::Vacant(slot) => {
                    slot.insert(now);
                    true
                }
            };
            if !first {
                continue;
            }
            for lower in stage.lower() {
                self.fired.entry(key(*lower)).or_insert(now);
            }

            debug!(key = %key(stage), "budget stage reached");
            let event = BudgetEvent {
                subject: status.subject.clone(),
                limit_type: limit.limit_type,
                stage,
                limit: limit.limit,
                usage: limit.usage,
                percentage: limit.percentage,
                hard_limit: status.hard_limit,
                window_start: limit.window_start,
                occurred_at: now,
            };
            for notifier in &self.notifiers {
                notifier.notify(&event).await;
            }
        }
    }
}

/// Allow-lists apply to hard and soft budgets alike
fn allow_list_violation(
    subject: &Trackable,
    budget: &BudgetConfig,
    provider: Option<&str>,
    model: Option<&str>,
) -> Option<BudgetError> {
    if let Some(provider) = provider.filter(|p| !budget.allows_provider(p)) {
        return Some(BudgetError::ProviderNotAllowed {
            subject: subject.clone(),
            provider: provider.to_string(),
        });
    }
    model
        .filter(|m| !budget.allows_model(m))
        .map(|model| BudgetError::ModelNotAllowed {
            subject: subject.clone(),
            model: model.to_string(),
        })
}

fn stage_for(percentage: f64, warning: f64, critical: f64) -> Option<ThresholdStage> {
    if percentage >= 100.0 {
        Some(ThresholdStage::Exceeded)
    } else if percentage >= critical {
        Some(ThresholdStage::Critical)
    } else if percentage >= warning {
        Some(ThresholdStage::Warning)
    } else {
        None
    }
}

pub struct BudgetEnforcerBuilder {
    enabled: bool,
    budgets: Arc<dyn BudgetProvider>,
    store: Arc<dyn UsageStore>,
    notifiers: Vec<Arc<dyn NotificationSink>>,
    warning_threshold: f64,
    critical_threshold: f64,
    clock: Clock,
}

impl BudgetEnforcerBuilder {
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifiers.push(notifier);
        self
    }

    /// Default thresholds, in percent, for budgets that set none
    pub fn thresholds(mut self, warning: f64, critical: f64) -> Self {
        self.warning_threshold = warning;
        self.critical_threshold = critical;
        self
    }

    pub fn clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn build(self) -> BudgetEnforcer {
        BudgetEnforcer {
            enabled: self.enabled,
            budgets: self.budgets,
            store: self.store,
            notifiers: self.notifiers,
            warning_threshold: self.warning_threshold,
            critical_threshold: self.critical_threshold,
            fired: DashMap::new(),
            clock: self.clock,
        }
    }
}
