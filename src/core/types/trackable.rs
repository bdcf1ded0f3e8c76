//! Polymorphic owner of requests and budgets

use serde::{Deserialize, Serialize};
use std::fmt;

/// A subject (user, team, api key, ...) that requests and budgets are
/// attributed to: a type discriminator plus an opaque id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Trackable {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: String,
}

impl Trackable {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Stable string key, `kind:id`
    pub fn key(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

impl fmt::Display for Trackable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}
