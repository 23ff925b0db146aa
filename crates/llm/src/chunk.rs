//! Incremental streaming units.

use crate::{ToolCallDelta, Usage};
use serde::{Deserialize, Serialize};

/// One incremental unit of a streaming response.
///
/// Once `finished` is true no further chunks are produced for that stream,
/// and `usage` is only meaningful on that terminal chunk.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct StreamChunk {
    /// Visible text delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Reasoning text delta.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<String>,
    /// A single tool-call fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call: Option<ToolCallDelta>,
    /// Whether this is the terminal chunk.
    #[serde(default)]
    pub finished: bool,
    /// Token usage, terminal chunk only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl StreamChunk {
    /// A text delta chunk.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// A reasoning delta chunk.
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self {
            reasoning: Some(text.into()),
            ..Default::default()
        }
    }

    /// A tool-call fragment chunk.
    pub fn tool(delta: ToolCallDelta) -> Self {
        Self {
            tool_call: Some(delta),
            ..Default::default()
        }
    }

    /// The terminal chunk, carrying any usage the stream reported.
    pub fn finished(usage: Option<Usage>) -> Self {
        Self {
            finished: true,
            usage,
            ..Default::default()
        }
    }

    /// The text delta, if non-empty.
    pub fn text_delta(&self) -> Option<&str> {
        self.text.as_deref().filter(|s| !s.is_empty())
    }

    /// The reasoning delta, if non-empty.
    pub fn reasoning_delta(&self) -> Option<&str> {
        self.reasoning.as_deref().filter(|s| !s.is_empty())
    }
}
