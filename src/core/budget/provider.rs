//! Where budgets come from

use super::types::BudgetConfig;
use crate::core::types::Trackable;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Supplies the budget that applies to a subject
#[async_trait]
pub trait BudgetProvider: Send + Sync {
    async fn budget_for(&self, subject: &Trackable) -> Result<Option<BudgetConfig>>;
}

/// Budgets fixed at startup, usually from configuration. A budget naming the
/// exact subject beats a type-wide one.
#[derive(Debug, Clone, Default)]
pub struct StaticBudgetProvider {
    budgets: Vec<BudgetConfig>,
}

impl StaticBudgetProvider {
    pub fn new(budgets: Vec<BudgetConfig>) -> Self {
        Self { budgets }
    }

    pub fn with_budget(mut self, budget: BudgetConfig) -> Self {
        self.budgets.push(budget);
        self
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }

    pub fn find(&self, subject: &Trackable) -> Option<&BudgetConfig> {
        let mut matching = self
            .budgets
            .iter()
            .filter(|b| b.enabled && b.applies_to(subject));
        let first = matching.next()?;
        if first.trackable_id.is_some() {
            return Some(first);
        }
        matching
            .find(|b| b.trackable_id.is_some())
            .or(Some(first))
    }
}

#[async_trait]
impl BudgetProvider for StaticBudgetProvider {
    async fn budget_for(&self, subject: &Trackable) -> Result<Option<BudgetConfig>> {
        Ok(self.find(subject).cloned())
    }
}
