//! Tracker wired to in-memory collaborators

use ai_usage_tracker::core::budget::{BudgetEvent, ChannelNotifier, StaticBudgetProvider};
use ai_usage_tracker::{
    BudgetConfig, BudgetEnforcer, InMemoryExporter, InMemoryMediaStore, InMemorySink,
    InMemoryUsageStore, UsageTracker,
};
use std::sync::Arc;
use tokio::sync::mpsc;

pub struct TrackerHarness {
    pub tracker: UsageTracker,
    pub sink: Arc<InMemorySink>,
    pub exporter: Arc<InMemoryExporter>,
    pub store: Arc<InMemoryUsageStore>,
    pub media: Arc<InMemoryMediaStore>,
    pub events: mpsc::UnboundedReceiver<BudgetEvent>,
}

impl TrackerHarness {
    pub fn new() -> Self {
        Self::with_budgets(Vec::new())
    }

    pub fn with_budgets(budgets: Vec<BudgetConfig>) -> Self {
        let sink = Arc::new(InMemorySink::new());
        let exporter = Arc::new(InMemoryExporter::new());
        let store = Arc::new(InMemoryUsageStore::new());
        let media = Arc::new(InMemoryMediaStore::new());
        let (notifier, events) = ChannelNotifier::new();

        let budget = BudgetEnforcer::builder(
            Arc::new(StaticBudgetProvider::new(budgets)),
            store.clone(),
        )
        .notifier(Arc::new(notifier))
        .build();

        let tracker = UsageTracker::builder()
            .budget(budget)
            .sink(sink.clone())
            .exporter(exporter.clone())
            .media_store(media.clone())
            .build();

        Self {
            tracker,
            sink,
            exporter,
            store,
            media,
            events,
        }
    }

    /// Budget events received so far
    pub fn drain_events(&mut self) -> Vec<BudgetEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }
}

impl Default for TrackerHarness {
    fn default() -> Self {
        Self::new()
    }
}
