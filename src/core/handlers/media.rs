//! Media produced by image/audio/video handlers
//!
//! Vendors hand back either short-lived URLs or inline base64 payloads.
//! Handlers only enumerate them; copying is done by an injected [`MediaStore`].

use crate::utils::error::{Result, TrackerError};
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A media item found in a response body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MediaPayload {
    /// A (possibly expiring) link to the media
    Url {
        url: String,
        mime_type: Option<String>,
    },
    /// Inline base64 data
    Inline { mime_type: String, data: String },
}

impl MediaPayload {
    pub fn url(url: impl Into<String>, mime_type: Option<&str>) -> Self {
        Self::Url {
            url: url.into(),
            mime_type: mime_type.map(str::to_string),
        }
    }

    pub fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Inline {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn mime_type(&self) -> Option<&str> {
        match self {
            Self::Url { mime_type, .. } => mime_type.as_deref(),
            Self::Inline { mime_type, .. } => Some(mime_type),
        }
    }
}

/// Who produced the media
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaContext {
    pub request_id: Uuid,
    pub provider: String,
    pub model: Option<String>,
}

/// Where a media item ended up
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMedia {
    pub location: String,
    pub mime_type: Option<String>,
    pub size_bytes: Option<u64>,
}

/// Durable media storage, supplied by the host.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn store(&self, payload: &MediaPayload, context: &MediaContext) -> Result<StoredMedia>;
}

/// Keeps decoded inline media and URLs in memory. Useful for tests and
/// short-lived processes.
#[derive(Debug, Default)]
pub struct InMemoryMediaStore {
    items: DashMap<String, (MediaPayload, Option<Vec<u8>>)>,
}

impl InMemoryMediaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get_bytes(&self, location: &str) -> Option<Vec<u8>> {
        self.items.get(location).and_then(|entry| entry.1.clone())
    }
}

#[async_trait]
impl MediaStore for InMemoryMediaStore {
    async fn store(&self, payload: &MediaPayload, context: &MediaContext) -> Result<StoredMedia> {
        let location = format!("memory://{}/{}", context.request_id, Uuid::new_v4().simple());
        let bytes = match payload {
            MediaPayload::Inline { data, .. } => Some(
                STANDARD
                    .decode(data.as_bytes())
                    .map_err(|e| TrackerError::media(format!("invalid base64 media: {}", e)))?,
            ),
            MediaPayload::Url { .. } => None,
        };
        let stored = StoredMedia {
            location: location.clone(),
            mime_type: payload.mime_type().map(str::to_string),
            size_bytes: bytes.as_ref().map(|b| b.len() as u64),
        };
        self.items.insert(location, (payload.clone(), bytes));
        Ok(stored)
    }
}
