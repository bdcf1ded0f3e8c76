//! Persistence sinks
//!
//! Durable storage is the host's job. The tracker hands every finished,
//! immutable [`RequestRecord`] to each configured sink.

use crate::core::types::RequestRecord;
use crate::utils::error::Result;
use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::info;

/// Receives finished records
#[async_trait]
pub trait PersistenceSink: Send + Sync {
    async fn persist(&self, record: &RequestRecord) -> Result<()>;
}

/// Keeps records in memory, for tests and inspection
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: RwLock<Vec<RequestRecord>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<RequestRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn last(&self) -> Option<RequestRecord> {
        self.records.read().last().cloned()
    }

    /// Sum of `total_cost` over stored records, in cents
    pub fn total_cost(&self) -> f64 {
        self.records.read().iter().map(RequestRecord::total_cost).sum()
    }

    pub fn clear(&self) {
        self.records.write().clear();
    }
}

#[async_trait]
impl PersistenceSink for InMemorySink {
    async fn persist(&self, record: &RequestRecord) -> Result<()> {
        self.records.write().push(record.clone());
        Ok(())
    }
}

/// Logs one structured line per record
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl PersistenceSink for TracingSink {
    async fn persist(&self, record: &RequestRecord) -> Result<()> {
        info!(
            id = %record.id,
            provider = %record.provider,
            model = record.model.as_deref().unwrap_or("unknown"),
            model_type = record.model_type.map(|t| t.as_str()).unwrap_or("unknown"),
            prompt_tokens = record.prompt_tokens,
            completion_tokens = record.completion_tokens,
            total_cost = record.cost.total_cost,
            latency_ms = record.latency_ms,
            success = record.success,
            "ai request tracked"
        );
        Ok(())
    }
}
