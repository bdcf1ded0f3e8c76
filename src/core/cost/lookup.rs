//! Price table lookup
//!
//! Model names arrive in many spellings: dated snapshots
//! (`gpt-4o-2024-08-06`), resource paths (`models/gemini-2.5-flash`) and
//! router-style `vendor/model` ids. Resolution tries, in order:
//!
//! 1. an exact match in the provider's table
//! 2. the same after stripping path and vendor prefixes
//! 3. the longest table key the name extends with only a snapshot suffix
//!    (`-2024-08-06`, `-20250929`, `-001`, `-latest`, `-preview-06-17`,
//!    `-v1:0`, `@20250514`)
//! 4. steps 1-3 in the named vendor's table, for `vendor/model` ids
//! 5. the provider's default pricing

use super::providers::builtin_pricing;
use super::types::{ModelPricing, PricingEntry, ProviderPricing};
use crate::core::types::PricingTier;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use tracing::debug;

static SNAPSHOT_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:-(?:\d{2,8}|latest|preview|exp|v\d+(?::\d+)?))*(?:@[\w.:-]+)?$")
        .expect("snapshot suffix regex is valid")
});

/// Provider → model → per-tier overrides, as loaded from configuration
pub type PricingOverrides = HashMap<String, HashMap<String, ModelPricing>>;

/// A model matched to a price table entry
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPricing<'a> {
    /// Table the model was found in
    pub provider: &'a str,
    /// Table key, or `None` for the provider's default pricing
    pub model: Option<&'a str>,
    pub pricing: &'a ModelPricing,
}

/// Read-only price tables keyed by provider slug
#[derive(Debug, Clone, Default)]
pub struct PricingLookup {
    tables: HashMap<String, ProviderPricing>,
}

impl PricingLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Built-in tables for every vendor
    pub fn builtin() -> Self {
        let mut lookup = Self::new();
        for table in builtin_pricing() {
            lookup.insert_table(table);
        }
        lookup
    }

    pub fn with_table(mut self, table: ProviderPricing) -> Self {
        self.insert_table(table);
        self
    }

    /// Add a table, merging model by model into an existing one.
    pub fn insert_table(&mut self, table: ProviderPricing) {
        match self.tables.get_mut(&table.provider) {
            Some(existing) => {
                for (model, pricing) in table.model_pricing {
                    existing
                        .model_pricing
                        .entry(model)
                        .and_modify(|p| p.merge(&pricing))
                        .or_insert(pricing);
                }
                if table.default_pricing.is_some() {
                    existing.default_pricing = table.default_pricing;
                }
            }
            None => {
                self.tables.insert(table.provider.clone(), table);
            }
        }
    }

    /// Merge configured prices over the tables. Overrides replace individual
    /// tiers and leave the others in place.
    pub fn apply_overrides(&mut self, overrides: &PricingOverrides) {
        for (provider, models) in overrides {
            let mut table = ProviderPricing::new(provider.clone());
            for (model, pricing) in models {
                table = table.model(&model.to_ascii_lowercase(), pricing.clone());
            }
            debug!(provider = %provider, models = models.len(), "applying pricing overrides");
            self.insert_table(table);
        }
    }

    pub fn table(&self, provider: &str) -> Option<&ProviderPricing> {
        self.tables.get(provider)
    }

    pub fn providers(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Find the pricing for `model` as called through `provider`.
    pub fn resolve(&self, provider: &str, model: &str) -> Option<ResolvedPricing<'_>> {
        let model = model.trim().to_ascii_lowercase();
        let own = self.tables.get(provider);

        if let Some(found) = own.and_then(|t| find_model(t, &model)) {
            return Some(found);
        }

        if let Some((vendor, rest)) = split_vendor(&model) {
            if vendor != provider {
                if let Some(found) = self.tables.get(vendor).and_then(|t| find_model(t, rest)) {
                    return Some(found);
                }
            }
        }

        own.and_then(|t| {
            t.default_pricing.as_ref().map(|pricing| ResolvedPricing {
                provider: t.provider.as_str(),
                model: None,
                pricing,
            })
        })
    }

    /// Entry for a model at a tier, falling back to the standard tier.
    pub fn entry(&self, provider: &str, model: &str, tier: PricingTier) -> Option<PricingEntry> {
        self.resolve(provider, model)
            .and_then(|r| r.pricing.entry(tier).copied())
    }
}

fn find_model<'a>(table: &'a ProviderPricing, model: &str) -> Option<ResolvedPricing<'a>> {
    let stripped = strip_prefixes(model);
    let candidates = if stripped == model {
        vec![model]
    } else {
        vec![model, stripped]
    };

    for candidate in &candidates {
        if let Some((key, pricing)) = table.model_pricing.get_key_value(*candidate) {
            return Some(resolved(table, key, pricing));
        }
    }

    table
        .model_pricing
        .iter()
        .filter(|(key, _)| is_snapshot_of(key, stripped))
        .max_by_key(|(key, _)| key.len())
        .map(|(key, pricing)| resolved(table, key, pricing))
}

fn resolved<'a>(
    table: &'a ProviderPricing,
    key: &'a str,
    pricing: &'a ModelPricing,
) -> ResolvedPricing<'a> {
    ResolvedPricing {
        provider: table.provider.as_str(),
        model: Some(key),
        pricing,
    }
}

/// `models/gemini-2.5-flash` → `gemini-2.5-flash`, `openai/gpt-4o` → `gpt-4o`
fn strip_prefixes(model: &str) -> &str {
    model.rsplit('/').next().unwrap_or(model)
}

/// Vendor named by a `vendor/model` id, normalised to a provider slug
fn split_vendor(model: &str) -> Option<(&str, &str)> {
    let (vendor, rest) = model.split_once('/')?;
    let vendor = match vendor {
        "models" => return None,
        "x-ai" => "xai",
        "mistralai" => "mistral",
        "google" | "gemini" => "google",
        other => other,
    };
    Some((vendor, rest))
}

/// `name` is `key` plus a date, build number or version tag. Anything
/// else (`o1-pro`, `gpt-4-32k`) is a different model.
fn is_snapshot_of(key: &str, name: &str) -> bool {
    name.len() > key.len()
        && name.starts_with(key)
        && SNAPSHOT_SUFFIX.is_match(&name[key.len()..])
}
