//! Error handling for the tracker
//!
//! Only budget violations are meant to reach the host application. Everything
//! else in this enum covers configuration and collaborator plumbing.

use crate::core::budget::BudgetError;
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for the tracker
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Main error type for the tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Budget violations raised before a call is made
    #[error(transparent)]
    Budget(#[from] BudgetError),

    /// A request context was completed or failed twice
    #[error("Request context {0} has already been finished")]
    ContextFinished(Uuid),

    /// Persistence sink errors
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Exporter sink errors
    #[error("Export error: {0}")]
    Export(String),

    /// Media store errors
    #[error("Media storage error: {0}")]
    Media(String),

    /// Usage aggregate store errors
    #[error("Usage store error: {0}")]
    UsageStore(String),

    /// Auxiliary enrichment errors (token counting and the like)
    #[error("Enrichment error: {0}")]
    Enrichment(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackerError {
    /// Whether this error is a budget violation that must block the call
    pub fn is_budget_violation(&self) -> bool {
        matches!(self, Self::Budget(_))
    }

    /// Borrow the budget violation, if any
    pub fn as_budget_error(&self) -> Option<&BudgetError> {
        match self {
            Self::Budget(e) => Some(e),
            _ => None,
        }
    }
}
