//! Endpoint pattern matching
//!
//! Patterns are literal paths or contain `{placeholder}` segments. A
//! placeholder matches any run of characters without a slash and the whole
//! pattern is anchored.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[^/{}]+\}").expect("placeholder regex is valid"));

/// A compiled endpoint pattern
#[derive(Debug, Clone)]
pub struct EndpointPattern {
    raw: String,
    regex: Option<Regex>,
}

impl EndpointPattern {
    pub fn new(pattern: &str) -> Self {
        if !PLACEHOLDER.is_match(pattern) {
            return Self {
                raw: pattern.to_string(),
                regex: None,
            };
        }

        let mut source = String::from("^");
        let mut last = 0;
        for m in PLACEHOLDER.find_iter(pattern) {
            source.push_str(&regex::escape(&pattern[last..m.start()]));
            source.push_str("[^/]+");
            last = m.end();
        }
        source.push_str(&regex::escape(&pattern[last..]));
        source.push('$');

        let regex = match Regex::new(&source) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(pattern, error = %e, "endpoint pattern failed to compile, matching literally");
                None
            }
        };

        Self {
            raw: pattern.to_string(),
            regex,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_literal(&self) -> bool {
        self.regex.is_none()
    }

    pub fn matches(&self, endpoint: &str) -> bool {
        let endpoint = normalize_endpoint(endpoint);
        match &self.regex {
            Some(re) => re.is_match(endpoint),
            None => self.raw == endpoint,
        }
    }
}

/// Strip the query string and a trailing slash.
pub fn normalize_endpoint(endpoint: &str) -> &str {
    let path = endpoint.split('?').next().unwrap_or(endpoint);
    if path.len() > 1 {
        path.strip_suffix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Compile a handler's endpoint list
pub fn compile_patterns(patterns: &[&str]) -> Vec<EndpointPattern> {
    patterns.iter().map(|p| EndpointPattern::new(p)).collect()
}
