//! A provider-abstraction layer for conversational-AI clients.
//!
//! This library resolves which backend (and which credential) a session talks
//! to, translates one internal Google-style request/response contract into
//! each backend's wire format, and reassembles streamed fragments — text
//! deltas and position-indexed tool-call deltas — into complete logical
//! responses. Every backend produces the same response shape.

pub mod auth;
pub mod error;
pub mod factory;
pub mod generator;
pub mod providers;
pub mod sse;
pub mod types;

// Re-export core types for easy usage
pub use auth::{resolve, AuthSelection, EnvSnapshot, ProviderKind};
pub use error::Error;
pub use factory::{CodeAssistBuilder, GeneratorFactory};
pub use generator::{ContentGenerator, ResponseStream};
pub use providers::{GeminiGenerator, OpenAiCompatGenerator};
pub use sse::SseFrame;
pub use types::*;
