//! Helper functions for creating specific error types

use super::error::TrackerError;

impl TrackerError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Self::Persistence(message.into())
    }

    pub fn export<S: Into<String>>(message: S) -> Self {
        Self::Export(message.into())
    }

    pub fn media<S: Into<String>>(message: S) -> Self {
        Self::Media(message.into())
    }

    pub fn usage_store<S: Into<String>>(message: S) -> Self {
        Self::UsageStore(message.into())
    }

    pub fn enrichment<S: Into<String>>(message: S) -> Self {
        Self::Enrichment(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}
