//! Final assembly of logical responses from either transport path.
//!
//! Streaming flushes and one-shot replies converge here so both paths produce
//! the same response shape for the same logical reply.

use std::collections::BTreeMap;

use serde_json::Value;

use super::stream::ToolCallFragment;
use super::types::ChatResponse;
use crate::types::{FinishReason, FunctionCall, GenerationResponse, UsageMetadata};

pub struct ResponseAssembler;

impl ResponseAssembler {
    /// Build one response from accumulated stream state. Fragments emit in
    /// position order; each one's argument text is parsed here.
    pub fn from_stream_state(
        text: String,
        fragments: BTreeMap<u32, ToolCallFragment>,
        finish_reason: Option<FinishReason>,
        usage: Option<UsageMetadata>,
    ) -> GenerationResponse {
        let calls: Vec<FunctionCall> = fragments
            .into_values()
            .map(|fragment| FunctionCall {
                name: fragment.name.unwrap_or_default(),
                args: parse_arguments(&fragment.arguments),
                id: fragment.id,
            })
            .collect();

        GenerationResponse {
            text,
            function_calls: if calls.is_empty() { None } else { Some(calls) },
            finish_reason,
            usage,
        }
    }

    /// Build one response from a non-streaming reply. A reply lacking a
    /// message body yields an empty response, not an error.
    pub fn from_chat_response(response: ChatResponse) -> GenerationResponse {
        let usage = response.usage.as_ref().map(UsageMetadata::from);

        let Some(choice) = response.choices.into_iter().next() else {
            return GenerationResponse {
                usage,
                ..GenerationResponse::empty()
            };
        };

        let finish_reason = choice
            .finish_reason
            .as_deref()
            .and_then(FinishReason::from_chat_wire);

        let Some(message) = choice.message else {
            return GenerationResponse {
                finish_reason,
                usage,
                ..GenerationResponse::empty()
            };
        };

        let calls: Vec<FunctionCall> = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| FunctionCall {
                name: call.function.name,
                args: parse_arguments(&call.function.arguments),
                id: call.id,
            })
            .collect();

        GenerationResponse {
            text: message.content.unwrap_or_default(),
            function_calls: if calls.is_empty() { None } else { Some(calls) },
            finish_reason,
            usage,
        }
    }
}

/// Malformed argument payloads degrade to an empty object. A partial JSON
/// fragment mid-stream is an expected condition, not a defect; only
/// completion-flushed fragments are guaranteed parseable.
fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "tool-call arguments did not parse, substituting empty object");
            Value::Object(Default::default())
        }
    }
}
