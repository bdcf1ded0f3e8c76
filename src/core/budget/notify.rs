//! Threshold notifications
//!
//! Informational events for host alerting. They are never errors.

use super::types::{LimitType, ThresholdStage};
use crate::core::cost::format_cents;
use crate::core::types::Trackable;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{error, warn};

/// A threshold reached by a subject's usage within one window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEvent {
    pub subject: Trackable,
    pub limit_type: LimitType,
    pub stage: ThresholdStage,
    pub limit: f64,
    pub usage: f64,
    pub percentage: f64,
    pub hard_limit: bool,
    pub window_start: DateTime<Utc>,
    pub occurred_at: DateTime<Utc>,
}

impl BudgetEvent {
    /// One-line summary for logs and alerts
    pub fn summary(&self) -> String {
        let (usage, limit) = match self.limit_type.metric {
            super::LimitMetric::Cost => (format_cents(self.usage), format_cents(self.limit)),
            _ => (format!("{:.0}", self.usage), format!("{:.0}", self.limit)),
        };
        format!(
            "{} budget {} for {}: {} of {} ({:.1}%)",
            self.limit_type, self.stage, self.subject, usage, limit, self.percentage
        )
    }
}

/// Receives budget events
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn notify(&self, event: &BudgetEvent);
}

/// Logs events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl NotificationSink for TracingNotifier {
    async fn notify(&self, event: &BudgetEvent) {
        let summary = event.summary();
        match event.stage {
            ThresholdStage::Exceeded => error!(
                subject = %event.subject,
                limit_type = %event.limit_type,
                percentage = event.percentage,
                "{}",
                summary
            ),
            _ => warn!(
                subject = %event.subject,
                limit_type = %event.limit_type,
                stage = %event.stage,
                percentage = event.percentage,
                "{}",
                summary
            ),
        }
    }
}

/// Forwards events to a channel for the host to consume
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<BudgetEvent>,
}

impl ChannelNotifier {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<BudgetEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Like [`new`](Self::new) with the receiver wrapped as a `Stream`
    pub fn stream() -> (Self, UnboundedReceiverStream<BudgetEvent>) {
        let (notifier, rx) = Self::new();
        (notifier, UnboundedReceiverStream::new(rx))
    }
}

#[async_trait]
impl NotificationSink for ChannelNotifier {
    async fn notify(&self, event: &BudgetEvent) {
        if self.tx.send(event.clone()).is_err() {
            warn!(subject = %event.subject, "budget event receiver dropped");
        }
    }
}
