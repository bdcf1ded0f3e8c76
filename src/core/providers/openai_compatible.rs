//! Vendors that speak the OpenAI wire format under their own hosts/paths
//!
//! Each vendor reuses the OpenAI handlers with its own endpoint list. Vendor
//! quirks (Groq's `x_groq.usage`, DeepSeek's `prompt_cache_hit_tokens`) are
//! absorbed by the shared usage parser.

use super::openai::{
    ChatCompletionHandler, CompletionHandler, EmbeddingHandler, ImageHandler, SpeechHandler,
    TranscriptionHandler,
};
use super::provider::Provider;

pub mod mistral {
    use super::*;

    pub const SLUG: &str = "mistral";
    pub const HOSTS: &[&str] = &["api.mistral.ai"];

    pub fn provider() -> Provider {
        Provider::builder(SLUG, "Mistral AI")
            .hosts(HOSTS.iter().copied())
            .handler(ChatCompletionHandler::new(&[
                "/v1/chat/completions",
                "/v1/fim/completions",
                "/v1/agents/completions",
            ]))
            .handler(EmbeddingHandler::new(&["/v1/embeddings"]))
            .build()
    }
}

pub mod groq {
    use super::*;

    pub const SLUG: &str = "groq";
    pub const HOSTS: &[&str] = &["api.groq.com"];

    pub fn provider() -> Provider {
        Provider::builder(SLUG, "Groq")
            .hosts(HOSTS.iter().copied())
            .handler(ChatCompletionHandler::new(&["/openai/v1/chat/completions"]))
            .handler(TranscriptionHandler::new(&[
                "/openai/v1/audio/transcriptions",
                "/openai/v1/audio/translations",
            ]))
            .handler(SpeechHandler::new(&["/openai/v1/audio/speech"]))
            .build()
    }
}

pub mod xai {
    use super::*;

    pub const SLUG: &str = "xai";
    pub const HOSTS: &[&str] = &["api.x.ai"];

    pub fn provider() -> Provider {
        Provider::builder(SLUG, "xAI")
            .hosts(HOSTS.iter().copied())
            .handler(ChatCompletionHandler::new(&["/v1/chat/completions"]))
            .handler(ImageHandler::new(&["/v1/images/generations"], "grok-2-image"))
            .build()
    }
}

pub mod deepseek {
    use super::*;

    pub const SLUG: &str = "deepseek";
    pub const HOSTS: &[&str] = &["api.deepseek.com"];

    pub fn provider() -> Provider {
        Provider::builder(SLUG, "DeepSeek")
            .hosts(HOSTS.iter().copied())
            .handler(ChatCompletionHandler::new(&[
                "/chat/completions",
                "/v1/chat/completions",
            ]))
            .handler(CompletionHandler::new(&["/beta/completions"]))
            .build()
    }
}

pub mod openrouter {
    use super::*;

    pub const SLUG: &str = "openrouter";
    pub const HOSTS: &[&str] = &["openrouter.ai"];

    pub fn provider() -> Provider {
        Provider::builder(SLUG, "OpenRouter")
            .hosts(HOSTS.iter().copied())
            .handler(ChatCompletionHandler::new(&["/api/v1/chat/completions"]))
            .handler(CompletionHandler::new(&["/api/v1/completions"]))
            .handler(EmbeddingHandler::new(&["/api/v1/embeddings"]))
            .build()
    }
}
