//! Budget violations

use super::types::LimitType;
use crate::core::types::Trackable;
use thiserror::Error;

/// A call blocked by a budget. The only error the tracker raises to the host.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BudgetError {
    #[error(
        "Budget limit {limit_type} exceeded for {subject}: {usage:.2} of {limit:.2} ({percentage:.1}%)"
    )]
    LimitExceeded {
        subject: Trackable,
        limit_type: LimitType,
        limit: f64,
        usage: f64,
        overage: f64,
        percentage: f64,
    },

    #[error("Provider '{provider}' is not allowed for {subject}")]
    ProviderNotAllowed { subject: Trackable, provider: String },

    #[error("Model '{model}' is not allowed for {subject}")]
    ModelNotAllowed { subject: Trackable, model: String },
}

impl BudgetError {
    pub fn subject(&self) -> &Trackable {
        match self {
            Self::LimitExceeded { subject, .. }
            | Self::ProviderNotAllowed { subject, .. }
            | Self::ModelNotAllowed { subject, .. } => subject,
        }
    }

    /// The breached limit, for numeric violations
    pub fn limit_type(&self) -> Option<LimitType> {
        match self {
            Self::LimitExceeded { limit_type, .. } => Some(*limit_type),
            _ => None,
        }
    }
}
