use tracing::debug;

use crate::auth::{AuthSelection, ProviderKind};
use crate::generator::ContentGenerator;
use crate::providers::{GeminiGenerator, OpenAiCompatGenerator};
use crate::types::GeneratorConfig;
use crate::Error;

/// Builds generators for the OAuth and Cloud Shell selections. The
/// code-assist flow lives outside this crate; the factory only hands it the
/// resolved selection.
pub trait CodeAssistBuilder: Send + Sync {
    fn build(
        &self,
        auth: AuthSelection,
        config: &GeneratorConfig,
    ) -> Result<Box<dyn ContentGenerator>, Error>;
}

/// Dispatch table from a resolved (auth, provider) pair to one concrete
/// generator. Construction is never retried; failures go straight to the
/// caller.
#[derive(Default)]
pub struct GeneratorFactory {
    code_assist: Option<Box<dyn CodeAssistBuilder>>,
}

impl GeneratorFactory {
    pub fn new() -> Self {
        Self { code_assist: None }
    }

    pub fn with_code_assist(mut self, builder: Box<dyn CodeAssistBuilder>) -> Self {
        self.code_assist = Some(builder);
        self
    }

    pub fn build(
        &self,
        config: &GeneratorConfig,
        auth: AuthSelection,
    ) -> Result<Box<dyn ContentGenerator>, Error> {
        debug!(auth = %auth, provider = %config.provider, model = %config.model, "building content generator");

        match auth {
            AuthSelection::OpenAiCompatible => {
                let kind = config.provider;
                if !kind.is_openai_compatible() {
                    return Err(Error::unsupported(format!(
                        "provider {kind} cannot serve the {auth} selection"
                    )));
                }
                let api_key = config.api_key.clone().unwrap_or_default();
                if api_key.is_empty() && kind.requires_api_key() {
                    return Err(Error::missing_credential(kind.as_str()));
                }
                let base_url = resolve_base_url(kind, config.base_url.as_deref());
                let generator = OpenAiCompatGenerator::new(config, base_url, api_key)?;
                Ok(Box::new(generator))
            }
            AuthSelection::GoogleApiKey | AuthSelection::Vertex => {
                let vertex = auth == AuthSelection::Vertex;
                let api_key = config
                    .api_key
                    .clone()
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| {
                        Error::missing_credential(if vertex { "vertex" } else { "gemini" })
                    })?;
                let generator = GeminiGenerator::new(config, api_key, vertex)?;
                Ok(Box::new(generator))
            }
            AuthSelection::GoogleOauth | AuthSelection::CloudShell => match &self.code_assist {
                Some(builder) => builder.build(auth, config),
                None => Err(Error::unsupported(format!(
                    "{auth} requires a code-assist collaborator"
                ))),
            },
        }
    }
}

/// Per-alias base-URL defaults. Ollama's OpenAI-compatible endpoint lives
/// under `/v1`, so the suffix is appended even to configured overrides.
fn resolve_base_url(kind: ProviderKind, configured: Option<&str>) -> String {
    let base = configured
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or_else(|| kind.default_base_url().unwrap_or_default().to_string());

    match kind {
        ProviderKind::Ollama if !base.ends_with("/v1") => format!("{base}/v1"),
        _ => base,
    }
}
