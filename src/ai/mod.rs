//! AI provider integration, routing and streaming

pub mod error;
pub mod openai;
pub mod router;
pub mod stream;

pub use openai::OpenAiClient;
