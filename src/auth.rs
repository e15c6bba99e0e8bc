//! Backend and credential resolution.
//!
//! A session resolves exactly one [`AuthSelection`] before any call is made.
//! Resolution is a pure function of explicit configuration and a captured
//! environment snapshot; nothing here reads or mutates ambient process state
//! after the snapshot is taken.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The backend and credential family a session operates against.
///
/// Immutable once a call begins; exactly one selection is active per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuthSelection {
    #[serde(rename = "google-oauth")]
    GoogleOauth,
    #[serde(rename = "google-api-key")]
    GoogleApiKey,
    #[serde(rename = "vertex")]
    Vertex,
    #[serde(rename = "cloud-shell")]
    CloudShell,
    #[serde(rename = "openai-compatible")]
    OpenAiCompatible,
}

impl AuthSelection {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthSelection::GoogleOauth => "google-oauth",
            AuthSelection::GoogleApiKey => "google-api-key",
            AuthSelection::Vertex => "vertex",
            AuthSelection::CloudShell => "cloud-shell",
            AuthSelection::OpenAiCompatible => "openai-compatible",
        }
    }
}

impl fmt::Display for AuthSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Known provider selections in session config.
///
/// The three OpenAI-compatible aliases all resolve to
/// [`AuthSelection::OpenAiCompatible`]; they differ only in default base URL,
/// credential requirements and header conventions applied later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ProviderKind {
    #[default]
    #[serde(rename = "gemini")]
    Gemini,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "ollama")]
    Ollama,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Gemini => "gemini",
            ProviderKind::OpenAi => "openai",
            ProviderKind::DeepSeek => "deepseek",
            ProviderKind::Ollama => "ollama",
        }
    }

    /// Whether this provider is served by the OpenAI-compatible adapter.
    pub fn is_openai_compatible(&self) -> bool {
        matches!(
            self,
            ProviderKind::OpenAi | ProviderKind::DeepSeek | ProviderKind::Ollama
        )
    }

    /// Whether construction must fail without a non-empty API key. Ollama is
    /// the local/offline variant and accepts an empty key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderKind::OpenAi | ProviderKind::DeepSeek)
    }

    /// Default base URL for the OpenAI-compatible aliases.
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            ProviderKind::Gemini => None,
            ProviderKind::OpenAi => Some("https://api.openai.com/v1"),
            ProviderKind::DeepSeek => Some("https://api.deepseek.com"),
            ProviderKind::Ollama => Some("http://localhost:11434"),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(ProviderKind::Gemini),
            "openai" => Ok(ProviderKind::OpenAi),
            "deepseek" => Ok(ProviderKind::DeepSeek),
            "ollama" => Ok(ProviderKind::Ollama),
            other => Err(Error::unsupported(other.to_string())),
        }
    }
}

/// Environment state consulted during resolution, captured once per session.
#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    /// Google OAuth (code-assist) mode flag.
    pub use_oauth: bool,
    /// Vertex AI (enterprise endpoint) mode flag.
    pub use_vertex: bool,
    pub gemini_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub deepseek_api_key: Option<String>,
    pub ollama_api_key: Option<String>,
    pub openai_base_url: Option<String>,
    pub deepseek_base_url: Option<String>,
    pub ollama_base_url: Option<String>,
    /// Provider override; explicit session config still beats this.
    pub provider: Option<ProviderKind>,
}

impl EnvSnapshot {
    /// Capture the process environment. This is the only point that touches
    /// ambient state; [`resolve`] itself is pure.
    pub fn from_process() -> Self {
        Self {
            use_oauth: flag("GOOGLE_GENAI_USE_GCA"),
            use_vertex: flag("GOOGLE_GENAI_USE_VERTEXAI"),
            gemini_api_key: var("GEMINI_API_KEY"),
            openai_api_key: var("OPENAI_API_KEY"),
            deepseek_api_key: var("DEEPSEEK_API_KEY"),
            ollama_api_key: var("OLLAMA_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL"),
            deepseek_base_url: var("DEEPSEEK_BASE_URL"),
            ollama_base_url: var("OLLAMA_BASE_URL"),
            provider: var("PROVIDER_TYPE").and_then(|v| v.parse().ok()),
        }
    }
}

fn flag(name: &str) -> bool {
    std::env::var(name)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

fn var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Resolve the active backend for a session.
///
/// An explicit selection wins outright. A non-default provider — from session
/// config, or the environment override when config is silent — maps the
/// session onto the OpenAI-compatible family. Otherwise the environment is
/// consulted in a fixed priority order: the OAuth flag, the Vertex flag, a
/// Gemini API key, then an OpenAI-compatible API key. When nothing matches
/// the session cannot proceed (non-interactive mode has no fallback).
pub fn resolve(
    explicit: Option<AuthSelection>,
    provider: Option<ProviderKind>,
    env: &EnvSnapshot,
) -> Result<AuthSelection, Error> {
    if let Some(auth) = explicit {
        return Ok(auth);
    }

    if let Some(kind) = provider.or(env.provider) {
        if kind.is_openai_compatible() {
            return Ok(AuthSelection::OpenAiCompatible);
        }
    }

    if env.use_oauth {
        return Ok(AuthSelection::GoogleOauth);
    }
    if env.use_vertex {
        return Ok(AuthSelection::Vertex);
    }
    if env.gemini_api_key.is_some() {
        return Ok(AuthSelection::GoogleApiKey);
    }
    if env.openai_api_key.is_some() || env.deepseek_api_key.is_some() {
        return Ok(AuthSelection::OpenAiCompatible);
    }

    Err(Error::UnresolvedAuth)
}
