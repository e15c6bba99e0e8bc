//! OpenAI-compatible chat-completions backend.

pub mod assemble;
pub mod client;
pub mod stream;
pub mod translate;
pub mod types;

pub use client::OpenAiCompatGenerator;
pub use stream::{StreamNormalizer, ToolCallFragment, DEFAULT_TEXT_FLUSH_THRESHOLD};
