//! Provider: the handlers of one vendor plus the hosts it is reached on

use crate::core::handlers::{EndpointPattern, Handler, compile_patterns};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// A handler together with its compiled endpoint patterns
#[derive(Debug, Clone)]
pub struct RegisteredHandler {
    handler: Arc<dyn Handler>,
    patterns: Vec<EndpointPattern>,
}

impl RegisteredHandler {
    pub fn new(handler: Arc<dyn Handler>) -> Self {
        let patterns = compile_patterns(handler.endpoints());
        Self { handler, patterns }
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    pub fn matches_endpoint(&self, endpoint: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(endpoint))
    }

    fn confirms_shape(&self, response: &Value) -> bool {
        self.handler
            .shape_matcher()
            .is_some_and(|m| m.matches_response(response))
    }
}

/// A vendor integration. Immutable once built.
pub struct Provider {
    slug: String,
    display_name: String,
    hosts: Vec<String>,
    handlers: Vec<RegisteredHandler>,
}

impl Provider {
    pub fn builder(slug: impl Into<String>, display_name: impl Into<String>) -> ProviderBuilder {
        ProviderBuilder {
            slug: slug.into(),
            display_name: display_name.into(),
            hosts: Vec::new(),
            handlers: Vec::new(),
        }
    }

    pub fn slug(&self) -> &str {
        &self.slug
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn hosts(&self) -> &[String] {
        &self.hosts
    }

    /// Handlers in registration order
    pub fn handlers(&self) -> impl Iterator<Item = &Arc<dyn Handler>> {
        self.handlers.iter().map(RegisteredHandler::handler)
    }

    pub fn handler_named(&self, name: &str) -> Option<Arc<dyn Handler>> {
        self.handlers()
            .find(|h| h.name() == name)
            .cloned()
    }

    /// Pick the handler for an endpoint and (optional) response body.
    ///
    /// Handlers registered later are treated as specialists: among several
    /// handlers sharing an endpoint, the last one that confirms the response
    /// shape wins, otherwise the first registered one does. With no endpoint
    /// match the response shape alone decides, again latest first. Pass
    /// `Value::Null` when no body is available yet.
    pub fn resolve_handler(&self, endpoint: &str, response: &Value) -> Option<Arc<dyn Handler>> {
        let matched: Vec<&RegisteredHandler> = self
            .handlers
            .iter()
            .filter(|h| h.matches_endpoint(endpoint))
            .collect();

        let resolved = match matched.as_slice() {
            [] => {
                if !has_body(response) {
                    return None;
                }
                self.handlers
                    .iter()
                    .rev()
                    .find(|h| h.confirms_shape(response))
                    .map(|h| h.handler().clone())
            }
            [only] => Some(only.handler().clone()),
            [default, ..] => matched
                .iter()
                .rev()
                .find(|h| has_body(response) && h.confirms_shape(response))
                .map(|h| h.handler().clone())
                .or_else(|| Some(default.handler().clone())),
        };

        trace!(
            provider = %self.slug,
            endpoint,
            handler = resolved.as_ref().map(|h| h.name()),
            "handler resolution"
        );
        resolved
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("slug", &self.slug)
            .field("hosts", &self.hosts)
            .field(
                "handlers",
                &self.handlers().map(|h| h.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

fn has_body(response: &Value) -> bool {
    match response {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Builder for [`Provider`]
pub struct ProviderBuilder {
    slug: String,
    display_name: String,
    hosts: Vec<String>,
    handlers: Vec<RegisteredHandler>,
}

impl ProviderBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        let host = host.into().to_ascii_lowercase();
        if !self.hosts.contains(&host) {
            self.hosts.push(host);
        }
        self
    }

    pub fn hosts<I, S>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for host in hosts {
            self = self.host(host);
        }
        self
    }

    /// Register a handler. Order matters: later handlers act as specialists.
    pub fn handler<H: Handler + 'static>(self, handler: H) -> Self {
        self.shared_handler(Arc::new(handler))
    }

    pub fn shared_handler(mut self, handler: Arc<dyn Handler>) -> Self {
        self.handlers.push(RegisteredHandler::new(handler));
        self
    }

    pub fn build(self) -> Provider {
        Provider {
            slug: self.slug,
            display_name: self.display_name,
            hosts: self.hosts,
            handlers: self.handlers,
        }
    }
}
