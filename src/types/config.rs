use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::auth::{EnvSnapshot, ProviderKind};

/// Session-level construction parameters for a generator.
///
/// Built once at session start and read-only afterwards; every field a
/// provider branch needs is resolved before the first call.
#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub provider: ProviderKind,
    /// Applied when the HTTP client is built.
    pub timeout: Duration,
    /// Retry allowance the transport layer honors; not enforced in this
    /// crate.
    pub max_retries: u32,
    pub sampling: SamplingParams,
    /// Explicit proxy for the HTTP client. Ambient proxy environment
    /// variables are never consulted.
    pub proxy: Option<String>,
}

impl GeneratorConfig {
    pub fn new(model: impl Into<String>, provider: ProviderKind) -> Self {
        Self {
            model: model.into(),
            api_key: None,
            base_url: None,
            provider,
            timeout: Duration::from_secs(60),
            max_retries: 2,
            sampling: SamplingParams::default(),
            proxy: None,
        }
    }

    /// Fill the credential and base URL for `provider` from an environment
    /// snapshot.
    pub fn from_env(
        model: impl Into<String>,
        provider: ProviderKind,
        env: &EnvSnapshot,
    ) -> Self {
        let mut config = Self::new(model, provider);
        match provider {
            ProviderKind::Gemini => {
                config.api_key = env.gemini_api_key.clone();
            }
            ProviderKind::OpenAi => {
                config.api_key = env.openai_api_key.clone();
                config.base_url = env.openai_base_url.clone();
            }
            ProviderKind::DeepSeek => {
                config.api_key = env.deepseek_api_key.clone();
                config.base_url = env.deepseek_base_url.clone();
            }
            ProviderKind::Ollama => {
                config.api_key = env.ollama_api_key.clone();
                config.base_url = env.ollama_base_url.clone();
            }
        }
        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// Named numeric tuning knobs. Only set fields are forwarded to a backend;
/// nothing is defaulted on the way out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub max_output_tokens: Option<u32>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,
}
