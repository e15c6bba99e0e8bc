use thiserror::Error;

/// Errors produced while resolving a backend, constructing a generator, or
/// calling a provider.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no authentication method could be resolved from configuration or environment")]
    UnresolvedAuth,

    #[error("provider {provider} requires an API key and none was configured")]
    MissingCredential { provider: String },

    #[error("unsupported provider selection: {0}")]
    UnsupportedProvider(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("provider error: {provider} - {message}")]
    Provider { provider: String, message: String },

    #[error("streaming error: {0}")]
    Streaming(String),
}

impl Error {
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    pub fn missing_credential(provider: impl Into<String>) -> Self {
        Error::MissingCredential {
            provider: provider.into(),
        }
    }

    pub fn unsupported(selection: impl Into<String>) -> Self {
        Error::UnsupportedProvider(selection.into())
    }

    pub fn streaming(message: impl Into<String>) -> Self {
        Error::Streaming(message.into())
    }
}
