//! Google Gemini API

pub mod embeddings;
pub mod generate;
pub mod imagen;
pub mod video;

pub use embeddings::GeminiEmbeddingHandler;
pub use generate::{GenerateContentHandler, GenerateImageHandler, GenerateSpeechHandler};
pub use imagen::ImagenHandler;
pub use video::VeoHandler;

use super::provider::Provider;

pub const SLUG: &str = "google";
pub const HOSTS: &[&str] = &["generativelanguage.googleapis.com"];

pub fn provider() -> Provider {
    Provider::builder(SLUG, "Google Gemini")
        .hosts(HOSTS.iter().copied())
        .handler(GenerateContentHandler::new())
        .handler(GenerateImageHandler::new())
        .handler(GenerateSpeechHandler::new())
        .handler(ImagenHandler::new())
        .handler(GeminiEmbeddingHandler::new())
        .handler(VeoHandler::new())
        .build()
}
