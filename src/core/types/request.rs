//! Views over an intercepted HTTP exchange

use crate::utils::error::{Result, TrackerError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use url::Url;

/// One part of a multipart/form-data body
#[derive(Debug, Clone, PartialEq)]
pub enum MultipartField {
    Text(String),
    File {
        filename: Option<String>,
        content_type: Option<String>,
    },
}

/// The outgoing request as seen by the interceptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiRequest {
    pub method: String,
    /// Lowercased host, including a non-default port
    pub host: String,
    /// Path without the query string
    pub path: String,
    pub query: Option<String>,
    /// Decoded body; `Null` for bodiless requests
    pub body: Value,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, host: impl Into<String>, path: impl Into<String>) -> Self {
        let path = path.into();
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p.to_string(), Some(q.to_string())),
            None => (path, None),
        };
        Self {
            method: method.into().to_ascii_uppercase(),
            host: host.into().to_ascii_lowercase(),
            path,
            query,
            body: Value::Null,
        }
    }

    /// Build from a full URL.
    pub fn from_url(method: impl Into<String>, url: &str) -> Result<Self> {
        let parsed = Url::parse(url)
            .map_err(|e| TrackerError::validation(format!("Invalid request URL '{}': {}", url, e)))?;
        let host = parsed
            .host_str()
            .ok_or_else(|| TrackerError::validation(format!("URL '{}' has no host", url)))?;
        let host = match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };
        let mut request = Self::new(method, host, parsed.path());
        request.query = parsed.query().map(str::to_string);
        Ok(request)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = body;
        self
    }

    /// Attach a multipart body: text fields become string entries, file
    /// parts are skipped.
    pub fn with_multipart<I, K>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = (K, MultipartField)>,
        K: Into<String>,
    {
        let mut map = Map::new();
        for (name, field) in fields {
            if let MultipartField::Text(text) = field {
                map.insert(name.into(), Value::String(text));
            }
        }
        self.body = Value::Object(map);
        self
    }

    /// The endpoint used for handler matching
    pub fn endpoint(&self) -> &str {
        &self.path
    }

    /// Host without port
    pub fn hostname(&self) -> &str {
        self.host.split(':').next().unwrap_or(&self.host)
    }

    pub fn body_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    /// Whether the caller asked for a streamed response
    pub fn is_streaming(&self) -> bool {
        self.body.get("stream").and_then(Value::as_bool).unwrap_or(false)
            || self.path.contains("streamGenerateContent")
            || self.path.ends_with("/stream")
            || self
                .query
                .as_deref()
                .is_some_and(|q| q.split('&').any(|p| p == "alt=sse"))
    }
}

/// The response as seen by the interceptor (non-streaming path).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    /// Decoded JSON body; `Null` for binary bodies such as synthesized audio
    pub body: Value,
    pub content_type: Option<String>,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self {
            status,
            body,
            content_type: None,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_failure(&self) -> bool {
        self.status >= 400
    }
}
