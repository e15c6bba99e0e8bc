//! Translation from the internal content contract to the chat-completions
//! wire format. Deterministic: the same input always yields the same body.

use serde_json::Value;

use super::types::{ChatFunctionDef, ChatMessage, ChatRequest, ChatTool};
use crate::types::{Content, FunctionDeclaration, GenerationRequest, Part, Role};

/// Convert one internal request into a chat-completions body. Sampling knobs
/// map 1:1 by name except `max_output_tokens`, which the chat protocol calls
/// `max_tokens`; unset knobs are not forwarded.
pub fn to_chat_request(request: &GenerationRequest, model: &str) -> ChatRequest {
    ChatRequest {
        model: model.to_string(),
        messages: request.contents.iter().map(to_chat_message).collect(),
        tools: request
            .tools
            .as_ref()
            .map(|tools| tools.iter().map(to_chat_tool).collect()),
        temperature: request.sampling.temperature,
        top_p: request.sampling.top_p,
        max_tokens: request.sampling.max_output_tokens,
        presence_penalty: request.sampling.presence_penalty,
        frequency_penalty: request.sampling.frequency_penalty,
        stream: None,
    }
}

/// Map one internal turn onto a chat message.
///
/// A function response anywhere in the turn forces the whole message to the
/// "tool" role, keyed by `tool_call_id`. A function call with no accompanying
/// response is a replay of a prior assistant invocation and serializes as the
/// message content. Text parts concatenate in order; an empty turn keeps its
/// role rather than being dropped.
fn to_chat_message(content: &Content) -> ChatMessage {
    for part in &content.parts {
        if let Part::FunctionResponse { function_response } = part {
            return ChatMessage {
                role: "tool".to_string(),
                content: stringify_response_payload(&function_response.response),
                tool_call_id: Some(function_response.id.clone()),
            };
        }
    }

    let mut text = String::new();
    for part in &content.parts {
        match part {
            Part::Text { text: t } => text.push_str(t),
            Part::FunctionCall { function_call } => {
                if let Ok(serialized) = serde_json::to_string(function_call) {
                    text.push_str(&serialized);
                }
            }
            Part::FunctionResponse { .. } => {}
        }
    }

    ChatMessage {
        role: chat_role(content.role).to_string(),
        content: text,
        tool_call_id: None,
    }
}

fn chat_role(role: Role) -> &'static str {
    match role {
        Role::User => "user",
        Role::Model => "assistant",
        Role::Tool => "tool",
    }
}

/// Stringify a function-response payload for the tool message body: a string
/// is used as-is, an object is searched for `output` then `content`, anything
/// else is serialized whole.
fn stringify_response_payload(payload: &Value) -> String {
    match payload {
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            if let Some(output) = map.get("output") {
                value_to_string(output)
            } else if let Some(content) = map.get("content") {
                value_to_string(content)
            } else {
                payload.to_string()
            }
        }
        other => other.to_string(),
    }
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_chat_tool(declaration: &FunctionDeclaration) -> ChatTool {
    ChatTool {
        r#type: "function".to_string(),
        function: ChatFunctionDef {
            name: declaration.name.clone(),
            description: declaration.description.clone(),
            parameters: declaration.parameters.as_ref().map(convert_schema),
        },
    }
}

/// Recursively rewrite a parameter schema into the chat endpoints' JSON-schema
/// vocabulary: type tags are lower-cased, `properties` and `items` recurse,
/// and length bounds supplied as numeric-looking strings become integers.
/// Anything else passes through unchanged.
pub(crate) fn convert_schema(schema: &Value) -> Value {
    let Value::Object(map) = schema else {
        return schema.clone();
    };

    let mut converted = serde_json::Map::new();
    for (key, value) in map {
        let rewritten = match key.as_str() {
            "type" => match value {
                Value::String(tag) => Value::String(tag.to_lowercase()),
                other => other.clone(),
            },
            "properties" => match value {
                Value::Object(props) => Value::Object(
                    props
                        .iter()
                        .map(|(name, sub)| (name.clone(), convert_schema(sub)))
                        .collect(),
                ),
                other => other.clone(),
            },
            "items" => convert_schema(value),
            "minLength" | "maxLength" | "minItems" | "maxItems" => coerce_integer(value),
            _ => value.clone(),
        };
        converted.insert(key.clone(), rewritten);
    }
    Value::Object(converted)
}

fn coerce_integer(value: &Value) -> Value {
    if let Value::String(s) = value {
        if let Ok(n) = s.trim().parse::<i64>() {
            return Value::Number(n.into());
        }
    }
    value.clone()
}
