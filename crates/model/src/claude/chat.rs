//! Chat and streaming calls against the messages API.

use super::Claude;
use super::stream::{BlockDelta, ContentBlock, Event};
use crate::sse::SseDecoder;
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::{Error, Message, Response, Result, StreamChunk, ToolCall, ToolCallDelta, Usage};
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
struct WireResponse {
    #[serde(default)]
    content: Vec<WireBlock>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WireBlock {
    Text {
        text: String,
    },
    Thinking {
        thinking: String,
    },
    ToolUse {
        id: String,
        name: String,
        #[serde(default)]
        input: Value,
    },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

fn malformed(e: impl std::fmt::Display) -> Error {
    Error::api(0, format!("malformed provider response: {e}"))
}

/// Assemble the canonical response from the content block list.
///
/// Multiple text blocks join with newlines; thinking blocks become the
/// reasoning channel; tool-use blocks already carry structured input.
fn to_response(wire: WireResponse) -> Response {
    let mut text = Vec::new();
    let mut reasoning = Vec::new();
    let mut tool_calls = Vec::new();
    for block in wire.content {
        match block {
            WireBlock::Text { text: t } => text.push(t),
            WireBlock::Thinking { thinking } => reasoning.push(thinking),
            WireBlock::ToolUse { id, name, input } => tool_calls.push(ToolCall {
                id: id.into(),
                name: name.into(),
                arguments: input,
            }),
            WireBlock::Unknown => {}
        }
    }
    Response {
        text: text.join("\n"),
        reasoning: (!reasoning.is_empty()).then(|| reasoning.join("\n")),
        tool_calls,
        usage: wire
            .usage
            .map(|u| Usage::new(u.input_tokens, u.output_tokens, None)),
    }
}

enum EventStep {
    Chunks(Vec<StreamChunk>),
    Stop,
}

/// Usage bookkeeping and event handling across one message stream.
#[derive(Default)]
struct StreamState {
    prompt_tokens: u32,
    completion_tokens: u32,
    saw_usage: bool,
}

impl StreamState {
    /// Handle one SSE payload. A malformed line is logged and skipped; it
    /// never terminates the stream.
    fn apply(&mut self, data: &str) -> EventStep {
        let event: Event = match serde_json::from_str(data) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!("skipping malformed stream event: {e}");
                return EventStep::Chunks(Vec::new());
            }
        };
        let mut chunks = Vec::new();
        match event {
            Event::MessageStart { message } => {
                if let Some(usage) = message.usage {
                    self.prompt_tokens = usage.input_tokens;
                    self.saw_usage = true;
                }
            }
            Event::ContentBlockStart {
                index,
                content_block,
            } => match content_block {
                ContentBlock::Text { text } if !text.is_empty() => {
                    chunks.push(StreamChunk::text(text));
                }
                ContentBlock::Thinking { thinking } if !thinking.is_empty() => {
                    chunks.push(StreamChunk::reasoning(thinking));
                }
                ContentBlock::ToolUse { id, name } => {
                    chunks.push(StreamChunk::tool(ToolCallDelta {
                        index,
                        id: id.into(),
                        name: name.into(),
                        arguments: String::new(),
                    }));
                }
                _ => {}
            },
            Event::ContentBlockDelta { index, delta } => match delta {
                BlockDelta::TextDelta { text } => chunks.push(StreamChunk::text(text)),
                BlockDelta::ThinkingDelta { thinking } => {
                    chunks.push(StreamChunk::reasoning(thinking));
                }
                BlockDelta::InputJsonDelta { partial_json } => {
                    chunks.push(StreamChunk::tool(ToolCallDelta {
                        index,
                        arguments: partial_json,
                        ..Default::default()
                    }));
                }
                // signature_delta and future delta kinds land here.
                BlockDelta::Unknown => {}
            },
            Event::MessageDelta { usage } => {
                if let Some(usage) = usage {
                    self.completion_tokens = usage.output_tokens;
                    self.saw_usage = true;
                }
            }
            Event::MessageStop => return EventStep::Stop,
            Event::ContentBlockStop {} | Event::Ping | Event::Unknown => {}
        }
        EventStep::Chunks(chunks)
    }

    fn usage(&self) -> Option<Usage> {
        self.saw_usage
            .then(|| Usage::new(self.prompt_tokens, self.completion_tokens, None))
    }
}

impl Claude {
    /// One blocking message completion.
    pub(crate) async fn chat(&self, messages: &[Message]) -> Result<Response> {
        let request = self.request().messages(messages);
        let text = self.http().post_json(&request).await?;
        tracing::trace!("response: {text}");
        let wire: WireResponse = serde_json::from_str(&text).map_err(malformed)?;
        Ok(to_response(wire))
    }

    /// A streaming message completion.
    pub(crate) fn stream(
        &self,
        messages: &[Message],
    ) -> impl Stream<Item = Result<StreamChunk>> + use<> {
        let http = self.http().clone();
        let request = self.request().messages(messages).stream();
        try_stream! {
            let response = http.post_stream(&request).await?;
            let mut bytes = response.bytes_stream();
            let mut decoder = SseDecoder::new();
            let mut state = StreamState::default();
            'outer: while let Some(bytes) = bytes.next().await {
                let bytes = bytes.map_err(|e| Error::network(e.to_string()))?;
                decoder.push(&bytes);
                while let Some(data) = decoder.next_data() {
                    match state.apply(&data) {
                        EventStep::Stop => break 'outer,
                        EventStep::Chunks(chunks) => {
                            for chunk in chunks {
                                yield chunk;
                            }
                        }
                    }
                }
            }
            yield StreamChunk::finished(state.usage());
        }
    }
}
