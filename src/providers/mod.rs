//! Backend implementations and shared transport construction.

pub mod gemini;
pub mod openai;

// Re-export commonly used provider types
pub use gemini::GeminiGenerator;
pub use openai::OpenAiCompatGenerator;

use crate::types::GeneratorConfig;
use crate::Error;

/// Build the HTTP client a generator uses for every call. Timeout and proxy
/// come from the session config; ambient proxy environment variables are
/// never consulted.
pub(crate) fn http_client(config: &GeneratorConfig) -> Result<reqwest::Client, Error> {
    let mut builder = reqwest::Client::builder()
        .timeout(config.timeout)
        .no_proxy();
    if let Some(proxy) = &config.proxy {
        builder = builder.proxy(reqwest::Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}
