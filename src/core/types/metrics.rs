//! Extracted usage facts for one AI call

use serde::{Deserialize, Serialize};

/// Token usage.
///
/// `prompt_tokens` is the full prompt size including cache reads and cache
/// writes; `cached_tokens` and `cache_creation_tokens` are subsets of it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetrics {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    /// Prompt tokens served from the vendor's prompt cache
    #[serde(default)]
    pub cached_tokens: u64,
    /// Completion tokens spent on hidden reasoning (subset of completion)
    #[serde(default)]
    pub reasoning_tokens: u64,
    /// Prompt tokens written to the prompt cache
    #[serde(default)]
    pub cache_creation_tokens: u64,
    /// Portion of `cache_creation_tokens` written with a one-hour TTL
    #[serde(default)]
    pub cache_creation_1h_tokens: u64,
}

impl TokenMetrics {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            ..Default::default()
        }
    }

    pub fn with_cached(mut self, cached_tokens: u64) -> Self {
        self.cached_tokens = cached_tokens;
        self
    }

    pub fn with_reasoning(mut self, reasoning_tokens: u64) -> Self {
        self.reasoning_tokens = reasoning_tokens;
        self
    }

    pub fn with_cache_creation(mut self, total: u64, one_hour: u64) -> Self {
        self.cache_creation_tokens = total;
        self.cache_creation_1h_tokens = one_hour.min(total);
        self
    }

    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }

    /// Prompt tokens billed at the regular input rate
    pub fn regular_prompt_tokens(&self) -> u64 {
        self.prompt_tokens
            .saturating_sub(self.cached_tokens)
            .saturating_sub(self.cache_creation_tokens)
    }

    pub fn is_empty(&self) -> bool {
        self.prompt_tokens == 0 && self.completion_tokens == 0
    }
}

/// Generated image usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetrics {
    pub count: u32,
}

/// Audio usage: seconds transcribed or characters synthesized
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioMetrics {
    pub duration_seconds: Option<f64>,
    pub input_characters: Option<u64>,
}

/// Generated video usage
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetrics {
    pub count: u32,
    pub duration_seconds: Option<f64>,
}

/// Usage extracted from a response.
///
/// Token usage may coexist with one media sub-object (a multimodal response
/// that reports tokens and also returned images).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub tokens: Option<TokenMetrics>,
    pub image: Option<ImageMetrics>,
    pub audio: Option<AudioMetrics>,
    pub video: Option<VideoMetrics>,
}

impl Metrics {
    /// Metrics for an unclassified call
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_tokens(tokens: TokenMetrics) -> Self {
        Self {
            tokens: Some(tokens),
            ..Default::default()
        }
    }

    pub fn with_tokens(mut self, tokens: Option<TokenMetrics>) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_image(mut self, count: u32) -> Self {
        self.image = Some(ImageMetrics { count });
        self
    }

    pub fn with_audio(mut self, audio: AudioMetrics) -> Self {
        self.audio = Some(audio);
        self
    }

    pub fn with_video(mut self, video: VideoMetrics) -> Self {
        self.video = Some(video);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_none() && self.image.is_none() && self.audio.is_none() && self.video.is_none()
    }

    pub fn prompt_tokens(&self) -> u64 {
        self.tokens.map(|t| t.prompt_tokens).unwrap_or(0)
    }

    pub fn completion_tokens(&self) -> u64 {
        self.tokens.map(|t| t.completion_tokens).unwrap_or(0)
    }

    pub fn cached_tokens(&self) -> u64 {
        self.tokens.map(|t| t.cached_tokens).unwrap_or(0)
    }

    pub fn reasoning_tokens(&self) -> u64 {
        self.tokens.map(|t| t.reasoning_tokens).unwrap_or(0)
    }

    pub fn total_tokens(&self) -> u64 {
        self.tokens.map(|t| t.total_tokens()).unwrap_or(0)
    }
}
