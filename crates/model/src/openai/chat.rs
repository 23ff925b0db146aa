//! Chat and streaming calls against the chat completions API.

use super::OpenAi;
use crate::sse::SseDecoder;
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::{
    Error, Message, Response, Result, StreamChunk, StreamSplitter, ToolCall, ToolCallDelta, Usage,
    split_reasoning,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Default, Deserialize)]
struct WireMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: Option<u32>,
}

impl From<WireUsage> for Usage {
    fn from(w: WireUsage) -> Self {
        Usage::new(w.prompt_tokens, w.completion_tokens, w.total_tokens)
    }
}

#[derive(Debug, Deserialize)]
struct WireChunk {
    #[serde(default)]
    choices: Vec<WireDeltaChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct WireDeltaChoice {
    #[serde(default)]
    delta: WireDelta,
}

#[derive(Debug, Default, Deserialize)]
struct WireDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCallDelta>,
}

#[derive(Debug, Deserialize)]
struct WireToolCallDelta {
    index: u32,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    function: Option<WireFunctionDelta>,
}

#[derive(Debug, Default, Deserialize)]
struct WireFunctionDelta {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Option<String>,
}

fn malformed(e: impl std::fmt::Display) -> Error {
    Error::api(0, format!("malformed provider response: {e}"))
}

/// Assemble the canonical response from a parsed wire response.
///
/// Backends that inline reasoning in the answer text get it split out here;
/// backends with a dedicated `reasoning_content` field pass through as-is.
fn to_response(wire: WireResponse) -> Response {
    let message = wire
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .unwrap_or_default();
    let raw_text = message.content.unwrap_or_default();
    let (text, reasoning) = match message.reasoning_content {
        Some(reasoning) => (raw_text, (!reasoning.is_empty()).then_some(reasoning)),
        None => split_reasoning(&raw_text),
    };
    let tool_calls = message
        .tool_calls
        .into_iter()
        .map(|c| ToolCall::from_raw_arguments(&c.id, &c.function.name, &c.function.arguments))
        .collect();
    Response {
        text,
        reasoning,
        tool_calls,
        usage: wire.usage.map(Usage::from),
    }
}

/// Convert one streamed wire chunk into emittable chunks, routing the text
/// delta through the reasoning splitter.
fn chunk_deltas(wire: WireChunk, splitter: &mut StreamSplitter) -> (Vec<StreamChunk>, Option<Usage>) {
    let mut out = Vec::new();
    for choice in wire.choices {
        if let Some(reasoning) = choice.delta.reasoning_content
            && !reasoning.is_empty()
        {
            out.push(StreamChunk::reasoning(reasoning));
        }
        if let Some(content) = choice.delta.content {
            let (visible, reasoning) = splitter.push(&content);
            if !reasoning.is_empty() {
                out.push(StreamChunk::reasoning(reasoning));
            }
            if !visible.is_empty() {
                out.push(StreamChunk::text(visible));
            }
        }
        for call in choice.delta.tool_calls {
            let function = call.function.unwrap_or_default();
            out.push(StreamChunk::tool(ToolCallDelta {
                index: call.index,
                id: call.id.unwrap_or_default().into(),
                name: function.name.unwrap_or_default().into(),
                arguments: function.arguments.unwrap_or_default(),
            }));
        }
    }
    (out, wire.usage.map(Usage::from))
}

enum StreamStep {
    Chunks(Vec<StreamChunk>),
    Done,
}

/// Handle one SSE payload. A malformed line is logged and skipped; it never
/// terminates the stream.
fn stream_step(
    data: &str,
    splitter: &mut StreamSplitter,
    usage: &mut Option<Usage>,
) -> StreamStep {
    if data == "[DONE]" {
        return StreamStep::Done;
    }
    match serde_json::from_str::<WireChunk>(data) {
        Ok(wire) => {
            let (chunks, chunk_usage) = chunk_deltas(wire, splitter);
            if let Some(chunk_usage) = chunk_usage {
                *usage = Some(chunk_usage);
            }
            StreamStep::Chunks(chunks)
        }
        Err(e) => {
            tracing::warn!("skipping malformed stream chunk: {e}");
            StreamStep::Chunks(Vec::new())
        }
    }
}

impl OpenAi {
    /// One blocking chat completion.
    pub(crate) async fn chat(&self, messages: &[Message]) -> Result<Response> {
        let request = self.request().messages(messages);
        let text = self.http().post_json(&request).await?;
        tracing::trace!("response: {text}");
        let wire: WireResponse = serde_json::from_str(&text).map_err(malformed)?;
        Ok(to_response(wire))
    }

    /// A streaming chat completion.
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
            let mut splitter = StreamSplitter::new();
            let mut usage: Option<Usage> = None;
            'outer: while let Some(bytes) = bytes.next().await {
                let bytes = bytes.map_err(|e| Error::network(e.to_string()))?;
                decoder.push(&bytes);
                while let Some(data) = decoder.next_data() {
                    match stream_step(&data, &mut splitter, &mut usage) {
                        StreamStep::Done => break 'outer,
                        StreamStep::Chunks(chunks) => {
                            for chunk in chunks {
                                yield chunk;
                            }
                        }
                    }
                }
            }
            let (visible, reasoning) = splitter.flush();
            if !reasoning.is_empty() {
                yield StreamChunk::reasoning(reasoning);
            }
            if !visible.is_empty() {
                yield StreamChunk::text(visible);
            }
            yield StreamChunk::finished(usage);
        }
    }
}
