//! Budget configuration

use super::default_true;
use crate::core::budget::{BudgetConfig, DEFAULT_CRITICAL_THRESHOLD, DEFAULT_WARNING_THRESHOLD};
use serde::{Deserialize, Serialize};

fn default_warning_threshold() -> f64 {
    DEFAULT_WARNING_THRESHOLD
}

fn default_critical_threshold() -> f64 {
    DEFAULT_CRITICAL_THRESHOLD
}

/// Budget enforcement settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetSettings {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Provider used for pre-call estimates when the caller names none
    pub default_provider: Option<String>,
    /// Model used for pre-call estimates when the caller names none
    pub default_model: Option<String>,
    /// Percent of a limit
    #[serde(default = "default_warning_threshold")]
    pub warning_threshold: f64,
    /// Percent of a limit
    #[serde(default = "default_critical_threshold")]
    pub critical_threshold: f64,
    pub budgets: Vec<BudgetConfig>,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            default_provider: None,
            default_model: None,
            warning_threshold: DEFAULT_WARNING_THRESHOLD,
            critical_threshold: DEFAULT_CRITICAL_THRESHOLD,
            budgets: Vec::new(),
        }
    }
}
