//! Anthropic

pub mod messages;

pub use messages::MessagesHandler;

use super::provider::Provider;

pub const SLUG: &str = "anthropic";
pub const HOSTS: &[&str] = &["api.anthropic.com"];

pub fn provider() -> Provider {
    Provider::builder(SLUG, "Anthropic")
        .hosts(HOSTS.iter().copied())
        .handler(MessagesHandler::new())
        .build()
}
