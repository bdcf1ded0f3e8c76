//! OpenAI
//!
//! The handlers here double as the building blocks for every vendor that
//! speaks the OpenAI wire format (see `openai_compatible`).

pub mod audio;
pub mod chat;
pub mod completions;
pub mod embeddings;
pub mod images;
pub mod responses;
pub mod usage;
pub mod video;

pub use audio::{SpeechHandler, TranscriptionHandler};
pub use chat::ChatCompletionHandler;
pub use completions::CompletionHandler;
pub use embeddings::EmbeddingHandler;
pub use images::ImageHandler;
pub use responses::{ResponsesHandler, ResponsesImageHandler};
pub use video::VideoHandler;

use super::provider::Provider;

pub const SLUG: &str = "openai";
pub const HOSTS: &[&str] = &["api.openai.com"];

pub fn provider() -> Provider {
    Provider::builder(SLUG, "OpenAI")
        .hosts(HOSTS.iter().copied())
        .handler(ChatCompletionHandler::openai())
        .handler(CompletionHandler::openai())
        .handler(ResponsesHandler::new())
        .handler(ResponsesImageHandler::new())
        .handler(EmbeddingHandler::openai())
        .handler(ImageHandler::openai())
        .handler(SpeechHandler::openai())
        .handler(TranscriptionHandler::openai())
        .handler(VideoHandler::new())
        .build()
}
