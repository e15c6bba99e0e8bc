//! Wire schemas for the Google-style content API.
//!
//! The internal contract already mirrors this shape, so request construction
//! is a direct mapping rather than a translation.

use ijson::IValue;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    Content, FinishReason, FunctionCall, GenerationRequest, GenerationResponse, Part, Role,
    UsageMetadata,
};

/// generateContent request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<WireContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<WireTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<WireGenerationConfig>,
}

impl GenerateContentRequest {
    pub fn from_internal(request: &GenerationRequest) -> Self {
        let tools = request.tools.as_ref().map(|tools| {
            vec![WireTool {
                function_declarations: tools
                    .iter()
                    .map(|declaration| WireFunctionDeclaration {
                        name: declaration.name.clone(),
                        description: declaration.description.clone(),
                        parameters: declaration.parameters.clone(),
                    })
                    .collect(),
            }]
        });

        Self {
            contents: request.contents.iter().map(WireContent::from).collect(),
            tools,
            generation_config: Some(WireGenerationConfig {
                temperature: request.sampling.temperature,
                top_p: request.sampling.top_p,
                max_output_tokens: request.sampling.max_output_tokens,
            }),
        }
    }
}

/// One turn on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireContent {
    pub role: String, // "user" or "model"
    #[serde(default)]
    pub parts: Vec<WirePart>,
}

impl From<&Content> for WireContent {
    fn from(content: &Content) -> Self {
        let role = match content.role {
            Role::User | Role::Tool => "user", // tool results ride in user turns
            Role::Model => "model",
        };
        WireContent {
            role: role.to_string(),
            parts: content.parts.iter().map(WirePart::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WirePart {
    Text {
        text: String,
    },
    FunctionCall {
        #[serde(rename = "functionCall")]
        function_call: WireFunctionCall,
    },
    FunctionResponse {
        #[serde(rename = "functionResponse")]
        function_response: WireFunctionResponse,
    },
}

impl From<&Part> for WirePart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text { text } => WirePart::Text { text: text.clone() },
            Part::FunctionCall { function_call } => WirePart::FunctionCall {
                function_call: WireFunctionCall {
                    name: function_call.name.clone(),
                    args: ivalue_from(&function_call.args),
                },
            },
            Part::FunctionResponse { function_response } => WirePart::FunctionResponse {
                function_response: WireFunctionResponse {
                    id: Some(function_response.id.clone()),
                    name: function_response.name.clone(),
                    response: ivalue_from(&function_response.response),
                },
            },
        }
    }
}

fn ivalue_from(value: &serde_json::Value) -> IValue {
    serde_json::from_value(value.clone()).unwrap_or(IValue::NULL)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFunctionCall {
    pub name: String,
    pub args: IValue,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireFunctionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub response: IValue,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireTool {
    pub function_declarations: Vec<WireFunctionDeclaration>,
}

#[derive(Debug, Clone, Serialize)]
pub struct WireFunctionDeclaration {
    pub name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireGenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
}

/// generateContent reply (whole response or one streamed chunk).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<WireCandidate>,
    #[serde(default)]
    pub usage_metadata: Option<WireUsageMetadata>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireCandidate {
    #[serde(default)]
    pub content: Option<WireContent>,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireUsageMetadata {
    #[serde(default)]
    pub prompt_token_count: u32,
    #[serde(default)]
    pub candidates_token_count: u32,
    #[serde(default)]
    pub total_token_count: u32,
}

impl From<WireUsageMetadata> for UsageMetadata {
    fn from(metadata: WireUsageMetadata) -> Self {
        UsageMetadata {
            prompt_token_count: metadata.prompt_token_count,
            candidates_token_count: metadata.candidates_token_count,
            total_token_count: metadata.total_token_count,
        }
    }
}

impl From<GenerateContentResponse> for GenerationResponse {
    /// Assemble the internal shape from one reply or streamed chunk. Missing
    /// candidates or bodies yield an empty response, not an error. The wire
    /// leaves calls unidentified, so ids are synthesized for the session.
    fn from(response: GenerateContentResponse) -> Self {
        let usage = response.usage_metadata.map(Into::into);
        let mut text = String::new();
        let mut calls = Vec::new();
        let mut finish_reason = None;

        if let Some(candidate) = response.candidates.into_iter().next() {
            finish_reason = candidate
                .finish_reason
                .as_deref()
                .and_then(FinishReason::from_google_wire);
            if let Some(content) = candidate.content {
                for part in content.parts {
                    match part {
                        WirePart::Text { text: t } => text.push_str(&t),
                        WirePart::FunctionCall { function_call } => {
                            let args = serde_json::to_value(&function_call.args)
                                .unwrap_or(serde_json::Value::Null);
                            calls.push(FunctionCall {
                                name: function_call.name,
                                args,
                                id: Some(format!("call_{}", Uuid::new_v4().simple())),
                            });
                        }
                        WirePart::FunctionResponse { .. } => {}
                    }
                }
            }
        }

        GenerationResponse {
            text,
            function_calls: if calls.is_empty() { None } else { Some(calls) },
            finish_reason,
            usage,
        }
    }
}

/// countTokens request/reply.
#[derive(Debug, Clone, Serialize)]
pub struct CountTokensRequest {
    pub contents: Vec<WireContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountTokensResponse {
    pub total_tokens: u32,
}

/// embedContent request/reply.
#[derive(Debug, Clone, Serialize)]
pub struct EmbedContentRequest {
    pub content: WireContent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbedContentResponse {
    pub embedding: WireEmbedding,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WireEmbedding {
    #[serde(default)]
    pub values: Vec<f32>,
}
