//! Usage aggregates
//!
//! Budget checks query totals from a store instead of accumulating them in
//! memory, so concurrent calls for one subject never race on a
//! read-modify-write.

use super::types::UsageTotals;
use crate::core::types::{RequestRecord, Trackable};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
#[cfg(test)]
use mockall::automock;

/// Aggregate usage queries, usually backed by the persistence database
#[cfg_attr(test, automock)]
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Add a finished call to the aggregates
    async fn record(&self, record: &RequestRecord) -> Result<()>;

    /// Totals for `subject` from `since` until now
    async fn usage_since(&self, subject: &Trackable, since: DateTime<Utc>) -> Result<UsageTotals>;
}

#[derive(Debug, Clone, Copy)]
struct UsageEntry {
    at: DateTime<Utc>,
    cost: f64,
    tokens: u64,
}

/// Per-subject usage log held in memory
#[derive(Debug, Default)]
pub struct InMemoryUsageStore {
    entries: DashMap<String, Vec<UsageEntry>>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add usage directly, e.g. to seed a test
    pub fn add(&self, subject: &Trackable, at: DateTime<Utc>, cost: f64, tokens: u64) {
        self.entries
            .entry(subject.key())
            .or_default()
            .push(UsageEntry { at, cost, tokens });
    }

    pub fn subject_count(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn record(&self, record: &RequestRecord) -> Result<()> {
        if let Some(subject) = &record.trackable {
            self.add(
                subject,
                record.completed_at,
                record.cost.total_cost,
                record.total_tokens,
            );
        }
        Ok(())
    }

    async fn usage_since(&self, subject: &Trackable, since: DateTime<Utc>) -> Result<UsageTotals> {
        let mut totals = UsageTotals::default();
        if let Some(entries) = self.entries.get(&subject.key()) {
            for entry in entries.iter().filter(|e| e.at >= since) {
                totals.cost += entry.cost;
                totals.tokens += entry.tokens;
                totals.requests += 1;
            }
        }
        Ok(totals)
    }
}
