use serde::{Deserialize, Serialize};

/// A complete logical response in the Google-style shape, regardless of which
/// backend served the request.
///
/// Value object: produced fresh per emitted unit and never mutated after
/// emission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub text: String,
    pub function_calls: Option<Vec<FunctionCall>>,
    pub finish_reason: Option<FinishReason>,
    pub usage: Option<UsageMetadata>,
}

impl GenerationResponse {
    pub fn empty() -> Self {
        Self {
            text: String::new(),
            function_calls: None,
            finish_reason: None,
            usage: None,
        }
    }

    /// Whether the response carries neither text nor calls.
    pub fn is_empty(&self) -> bool {
        self.text.is_empty() && self.function_calls.is_none()
    }
}

/// One reassembled tool invocation with parsed arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub args: serde_json::Value,
    pub id: Option<String>,
}

/// Provider-supplied terminal signal for a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolCalls,
    ContentFilter,
}

impl FinishReason {
    /// Map an OpenAI-compatible finish reason string.
    pub fn from_chat_wire(reason: &str) -> Option<Self> {
        match reason {
            "stop" => Some(FinishReason::Stop),
            "tool_calls" => Some(FinishReason::ToolCalls),
            "length" => Some(FinishReason::Length),
            "content_filter" => Some(FinishReason::ContentFilter),
            _ => None,
        }
    }

    /// Map a Google-style finish reason string. Unknown reasons read as a
    /// natural stop.
    pub fn from_google_wire(reason: &str) -> Option<Self> {
        match reason {
            "STOP" => Some(FinishReason::Stop),
            "MAX_TOKENS" => Some(FinishReason::Length),
            "SAFETY" => Some(FinishReason::ContentFilter),
            _ => Some(FinishReason::Stop),
        }
    }

    /// Whether this reason terminates a streaming turn.
    pub fn signals_completion(&self) -> bool {
        matches!(self, FinishReason::Stop | FinishReason::ToolCalls)
    }
}

/// Token accounting for one turn, reported in the Google-style vocabulary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageMetadata {
    pub prompt_token_count: u32,
    pub candidates_token_count: u32,
    pub total_token_count: u32,
}

/// Result of a token-count request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenCount {
    pub total_tokens: u32,
}

/// Result of an embedding request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentEmbedding {
    pub values: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_wire_finish_reasons() {
        assert_eq!(
            FinishReason::from_chat_wire("stop"),
            Some(FinishReason::Stop)
        );
        assert_eq!(
            FinishReason::from_chat_wire("tool_calls"),
            Some(FinishReason::ToolCalls)
        );
        assert_eq!(
            FinishReason::from_chat_wire("length"),
            Some(FinishReason::Length)
        );
        assert_eq!(FinishReason::from_chat_wire("weird"), None);
    }

    #[test]
    fn test_google_wire_finish_reasons() {
        assert_eq!(
            FinishReason::from_google_wire("STOP"),
            Some(FinishReason::Stop)
        );
        assert_eq!(
            FinishReason::from_google_wire("MAX_TOKENS"),
            Some(FinishReason::Length)
        );
        assert_eq!(
            FinishReason::from_google_wire("SAFETY"),
            Some(FinishReason::ContentFilter)
        );
    }

    #[test]
    fn test_completion_signal() {
        assert!(FinishReason::Stop.signals_completion());
        assert!(FinishReason::ToolCalls.signals_completion());
        assert!(!FinishReason::Length.signals_completion());
        assert!(!FinishReason::ContentFilter.signals_completion());
    }

    #[test]
    fn test_empty_response() {
        let response = GenerationResponse::empty();
        assert!(response.is_empty());
        assert_eq!(response.finish_reason, None);
    }
}
