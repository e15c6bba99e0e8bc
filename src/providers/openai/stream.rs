//! Normalization of chat-completions stream chunks into logical responses.
//!
//! Providers split a single tool invocation's name and argument text
//! arbitrarily across chunks and disambiguate concurrent invocations only by
//! a position index, so fragments merge by index rather than arrival order.

use std::collections::BTreeMap;

use super::assemble::ResponseAssembler;
use super::types::{ChatChunk, ToolCallDelta};
use crate::types::{FinishReason, GenerationResponse, UsageMetadata};

/// Default minimum text-buffer length for an interim flush on pure-text
/// streams. A latency knob, not a semantic boundary.
pub const DEFAULT_TEXT_FLUSH_THRESHOLD: usize = 10;

/// Partial accumulation of one tool invocation, keyed by position index.
/// Frozen once emitted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolCallFragment {
    pub name: Option<String>,
    pub arguments: String,
    pub id: Option<String>,
}

/// Reassembles fragmented chunks into complete logical responses.
///
/// Owned exclusively by one in-flight stream consumption. The text buffer is
/// cleared on every emission; the fragment set and its in-progress flag are
/// cleared only on the completion-triggered flush, so tool-call accumulation
/// survives an interim text emission.
#[derive(Debug)]
pub struct StreamNormalizer {
    fragments: BTreeMap<u32, ToolCallFragment>,
    text: String,
    tool_calls_in_progress: bool,
    text_flush_threshold: usize,
    usage: Option<UsageMetadata>,
    last_finish: Option<FinishReason>,
}

impl StreamNormalizer {
    pub fn new() -> Self {
        Self::with_text_flush_threshold(DEFAULT_TEXT_FLUSH_THRESHOLD)
    }

    pub fn with_text_flush_threshold(threshold: usize) -> Self {
        Self {
            fragments: BTreeMap::new(),
            text: String::new(),
            tool_calls_in_progress: false,
            text_flush_threshold: threshold,
            usage: None,
            last_finish: None,
        }
    }

    /// Feed one provider chunk; returns a response when the flush policy
    /// fires: always at completion (finish reason "stop" or "tool_calls"),
    /// or early for pure-text streams once the buffer reaches the threshold.
    pub fn push_chunk(&mut self, chunk: &ChatChunk) -> Option<GenerationResponse> {
        if let Some(usage) = &chunk.usage {
            self.usage = Some(usage.into());
        }

        let choice = chunk.choices.first()?;

        if let Some(deltas) = &choice.delta.tool_calls {
            self.tool_calls_in_progress = true;
            for delta in deltas {
                self.merge_delta(delta);
            }
        }
        if let Some(content) = &choice.delta.content {
            self.text.push_str(content);
        }

        if let Some(reason) = choice
            .finish_reason
            .as_deref()
            .and_then(FinishReason::from_chat_wire)
        {
            self.last_finish = Some(reason);
            if reason.signals_completion() {
                return Some(self.flush_complete(reason));
            }
        }

        if !self.tool_calls_in_progress && self.text.len() >= self.text_flush_threshold {
            return Some(self.flush_text());
        }

        None
    }

    /// Merge one delta into the fragment at its position index: create the
    /// fragment on first sight, append argument text, adopt name/id when
    /// newly present.
    fn merge_delta(&mut self, delta: &ToolCallDelta) {
        let fragment = self.fragments.entry(delta.index).or_default();
        if let Some(id) = &delta.id {
            fragment.id = Some(id.clone());
        }
        if let Some(function) = &delta.function {
            if let Some(name) = &function.name {
                fragment.name = Some(name.clone());
            }
            if let Some(arguments) = &function.arguments {
                fragment.arguments.push_str(arguments);
            }
        }
    }

    /// Completion flush: emits everything and resets all stream state.
    fn flush_complete(&mut self, reason: FinishReason) -> GenerationResponse {
        let text = std::mem::take(&mut self.text);
        let fragments = std::mem::take(&mut self.fragments);
        self.tool_calls_in_progress = false;
        ResponseAssembler::from_stream_state(text, fragments, Some(reason), self.usage.take())
    }

    /// Interim flush: text only. In-flight fragments are left untouched.
    fn flush_text(&mut self) -> GenerationResponse {
        let text = std::mem::take(&mut self.text);
        ResponseAssembler::from_stream_state(text, BTreeMap::new(), None, None)
    }

    /// Drain whatever remains when the provider closes the stream without a
    /// recognized completion signal.
    pub fn finish(&mut self) -> Option<GenerationResponse> {
        if self.text.is_empty() && self.fragments.is_empty() {
            return None;
        }
        let text = std::mem::take(&mut self.text);
        let fragments = std::mem::take(&mut self.fragments);
        self.tool_calls_in_progress = false;
        Some(ResponseAssembler::from_stream_state(
            text,
            fragments,
            self.last_finish.take(),
            self.usage.take(),
        ))
    }
}

impl Default for StreamNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
