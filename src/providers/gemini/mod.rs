//! Google-style content-API backend (generative-language and Vertex hosts).

pub mod client;
pub mod types;

pub use client::GeminiGenerator;
