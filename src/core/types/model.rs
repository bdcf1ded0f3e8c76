//! Capability and pricing-tier enumerations

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The capability a handler covers. Every handler declares exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelType {
    Text,
    Embedding,
    Image,
    Video,
    Tts,
    Stt,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Text => "text",
            ModelType::Embedding => "embedding",
            ModelType::Image => "image",
            ModelType::Video => "video",
            ModelType::Tts => "tts",
            ModelType::Stt => "stt",
        }
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named pricing class. `Standard` is the universal default and fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingTier {
    Batch,
    Flex,
    #[default]
    Standard,
    Priority,
}

impl PricingTier {
    pub const ALL: [PricingTier; 4] = [
        PricingTier::Batch,
        PricingTier::Flex,
        PricingTier::Standard,
        PricingTier::Priority,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PricingTier::Batch => "batch",
            PricingTier::Flex => "flex",
            PricingTier::Standard => "standard",
            PricingTier::Priority => "priority",
        }
    }

    /// Map a vendor `service_tier` value onto a pricing tier.
    /// `default` is the standard tier; `auto` names no tier, leaving the
    /// configured default in charge.
    pub fn from_service_tier(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "auto" => None,
            "default" | "standard" | "standard_only" => Some(PricingTier::Standard),
            other => other.parse().ok(),
        }
    }
}

impl fmt::Display for PricingTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PricingTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "batch" => Ok(PricingTier::Batch),
            "flex" => Ok(PricingTier::Flex),
            "standard" => Ok(PricingTier::Standard),
            "priority" => Ok(PricingTier::Priority),
            other => Err(format!("unknown pricing tier '{}'", other)),
        }
    }
}
