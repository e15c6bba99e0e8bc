use serde::{Deserialize, Serialize};

use super::config::SamplingParams;
use super::content::Content;

/// One generation request in the internal contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<FunctionDeclaration>>,
    #[serde(default)]
    pub sampling: SamplingParams,
}

impl GenerationRequest {
    pub fn new(contents: Vec<Content>) -> Self {
        Self {
            contents,
            tools: None,
            sampling: SamplingParams::default(),
        }
    }

    /// A request carrying one user text turn.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::new(vec![Content::user_text(text)])
    }

    pub fn with_tools(mut self, tools: Vec<FunctionDeclaration>) -> Self {
        self.tools = Some(tools);
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }
}

/// A callable tool surfaced to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    pub name: String,
    pub description: String,
    /// JSON-schema parameter object. Passed through unchanged when absent or
    /// not convertible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

impl FunctionDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
        }
    }

    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = Some(parameters);
        self
    }
}
