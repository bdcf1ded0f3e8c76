//! Configuration management for the tracker
//!
//! This module handles loading and validation of the tracker configuration.

mod loader;
pub mod models;
pub mod validation;

pub use loader::CONFIG_PATH_VAR;
pub use models::*;
pub use validation::Validate;

use crate::utils::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Main configuration struct for the tracker
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub tracking: TrackingConfig,
    pub pricing: PricingSettings,
    pub budget: BudgetSettings,
    pub providers: ProvidersConfig,
    pub logging: LoggingConfig,
}

impl TrackerConfig {
    /// Load configuration from a YAML file
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Self::read_file(path).await?;
        config.validate()?;
        debug!("Configuration loaded successfully");
        Ok(config)
    }

    /// Parse configuration from YAML text
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| TrackerError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    async fn read_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Loading configuration from: {:?}", path);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| TrackerError::Config(format!("Failed to read config file: {}", e)))?;

        serde_yaml::from_str(&content)
            .map_err(|e| TrackerError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(TrackerError::Config)
    }

    /// Convert to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| TrackerError::Config(format!("Failed to serialize config to YAML: {}", e)))
    }
}
