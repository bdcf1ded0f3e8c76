//! Provider registry adjustments

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Provider slug → additional hosts, e.g. a corporate proxy
    pub extra_hosts: HashMap<String, Vec<String>>,
    /// Slugs left out of the registry
    pub disabled: Vec<String>,
}
