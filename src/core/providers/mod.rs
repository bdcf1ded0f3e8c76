//! Vendor integrations
//!
//! Each vendor module exposes a `provider()` constructor returning an
//! immutable [`Provider`] with its hosts and handlers. The
//! [`ProviderRegistry`] assembles them at startup.

pub mod anthropic;
pub mod cohere;
pub mod elevenlabs;
pub mod google;
pub mod ollama;
pub mod openai;
pub mod openai_compatible;
pub mod provider;
pub mod provider_registry;

pub use provider::{Provider, ProviderBuilder, RegisteredHandler};
pub use provider_registry::{ProviderRegistry, ProviderRegistryBuilder, default_providers};
