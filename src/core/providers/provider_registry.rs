//! Provider Registry
//!
//! Maps request hosts to providers. Built once at startup and read-only
//! afterwards, so lookups need no locking.

use super::provider::Provider;
use super::{anthropic, cohere, elevenlabs, google, ollama, openai, openai_compatible};
use crate::config::ProvidersConfig;
use crate::core::handlers::Handler;
use crate::core::types::ApiRequest;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Every built-in vendor, in registration order
pub fn default_providers() -> Vec<Provider> {
    vec![
        openai::provider(),
        anthropic::provider(),
        google::provider(),
        openai_compatible::mistral::provider(),
        openai_compatible::groq::provider(),
        openai_compatible::xai::provider(),
        openai_compatible::deepseek::provider(),
        openai_compatible::openrouter::provider(),
        ollama::provider(),
        cohere::provider(),
        elevenlabs::provider(),
    ]
}

/// Immutable host → provider map
pub struct ProviderRegistry {
    providers: Vec<Arc<Provider>>,
    by_slug: HashMap<String, Arc<Provider>>,
    by_host: HashMap<String, Arc<Provider>>,
}

impl ProviderRegistry {
    pub fn builder() -> ProviderRegistryBuilder {
        ProviderRegistryBuilder::default()
    }

    /// Registry with every built-in vendor
    pub fn with_defaults() -> Self {
        Self::builder().providers(default_providers()).build()
    }

    /// Built-in vendors adjusted by configuration (extra hosts, disabled slugs)
    pub fn from_config(config: &ProvidersConfig) -> Self {
        let mut builder = Self::builder().providers(default_providers());
        for slug in &config.disabled {
            builder = builder.disable(slug);
        }
        for (slug, hosts) in &config.extra_hosts {
            builder = builder.extra_hosts(slug, hosts.iter().cloned());
        }
        builder.build()
    }

    /// Provider reachable at `host` (`host[:port]`, case-insensitive). An
    /// exact match including the port wins over a hostname-only match.
    pub fn resolve(&self, host: &str) -> Option<Arc<Provider>> {
        let host = host.trim().to_ascii_lowercase();
        if let Some(provider) = self.by_host.get(&host) {
            return Some(provider.clone());
        }
        let hostname = host.split(':').next().unwrap_or(&host);
        self.by_host.get(hostname).cloned()
    }

    /// Resolve provider and handler for an intercepted request.
    pub fn resolve_request(
        &self,
        request: &ApiRequest,
        response: &Value,
    ) -> Option<(Arc<Provider>, Arc<dyn Handler>)> {
        let provider = self.resolve(&request.host)?;
        let handler = provider.resolve_handler(request.endpoint(), response)?;
        Some((provider, handler))
    }

    pub fn get(&self, slug: &str) -> Option<Arc<Provider>> {
        self.by_slug.get(slug).cloned()
    }

    pub fn contains(&self, slug: &str) -> bool {
        self.by_slug.contains_key(slug)
    }

    /// Providers in registration order
    pub fn providers(&self) -> impl Iterator<Item = &Arc<Provider>> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("provider_count", &self.providers.len())
            .field(
                "providers",
                &self.providers.iter().map(|p| p.slug()).collect::<Vec<_>>(),
            )
            .field("host_count", &self.by_host.len())
            .finish()
    }
}

/// Collects providers before freezing them into a [`ProviderRegistry`]
#[derive(Default)]
pub struct ProviderRegistryBuilder {
    providers: Vec<Provider>,
    extra_hosts: Vec<(String, String)>,
    disabled: HashSet<String>,
}

impl ProviderRegistryBuilder {
    pub fn provider(mut self, provider: Provider) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn providers(mut self, providers: impl IntoIterator<Item = Provider>) -> Self {
        self.providers.extend(providers);
        self
    }

    /// Route additional hosts (a proxy, a self-hosted gateway) to `slug`.
    pub fn extra_hosts<I, S>(mut self, slug: &str, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for host in hosts {
            self.extra_hosts
                .push((slug.to_string(), host.into().trim().to_ascii_lowercase()));
        }
        self
    }

    pub fn disable(mut self, slug: &str) -> Self {
        self.disabled.insert(slug.to_string());
        self
    }

    pub fn build(self) -> ProviderRegistry {
        let mut providers = Vec::new();
        let mut by_slug = HashMap::new();
        let mut by_host: HashMap<String, Arc<Provider>> = HashMap::new();

        for provider in self.providers {
            if self.disabled.contains(provider.slug()) {
                debug!(provider = provider.slug(), "provider disabled");
                continue;
            }
            if by_slug.contains_key(provider.slug()) {
                warn!(provider = provider.slug(), "duplicate provider slug ignored");
                continue;
            }
            let provider = Arc::new(provider);
            for host in provider.hosts() {
                insert_host(&mut by_host, host.clone(), &provider);
            }
            by_slug.insert(provider.slug().to_string(), provider.clone());
            providers.push(provider);
        }

        for (slug, host) in self.extra_hosts {
            match by_slug.get(&slug) {
                Some(provider) => insert_host(&mut by_host, host, provider),
                None => warn!(provider = %slug, host = %host, "extra host for unknown provider"),
            }
        }

        ProviderRegistry {
            providers,
            by_slug,
            by_host,
        }
    }
}

fn insert_host(by_host: &mut HashMap<String, Arc<Provider>>, host: String, provider: &Arc<Provider>) {
    if let Some(existing) = by_host.get(&host) {
        warn!(
            host = %host,
            kept = existing.slug(),
            ignored = provider.slug(),
            "host already registered"
        );
        return;
    }
    by_host.insert(host, provider.clone());
}
