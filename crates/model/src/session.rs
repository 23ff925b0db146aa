//! Streaming session consumption.
//!
//! [`consume`] drives a chunk stream to completion on behalf of a
//! caller-supplied [`StreamSink`], accumulating the canonical [`Response`]
//! and honoring cooperative cancellation between chunks.

use futures_core::Stream;
use futures_util::StreamExt;
use llm::{Response, Result, StreamChunk, ToolCallBuilder, Usage};
use std::pin::pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Created, not yet consuming.
    #[default]
    Idle,
    /// Consuming, no content seen yet.
    Started,
    /// Last delta was visible text.
    EmittingText,
    /// Last delta was reasoning.
    EmittingReasoning,
    /// Terminal chunk seen or stream ended.
    Finished,
    /// Stopped by the cancel token; accumulated content is partial.
    Cancelled,
}

/// Cooperative cancellation handle, checked once per chunk.
///
/// Clones share one flag, so any holder can stop the session.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Callbacks invoked as the session consumes chunks.
///
/// Every method defaults to a no-op so sinks implement only what they need.
pub trait StreamSink {
    /// The stream is about to produce content.
    fn on_start(&mut self) {}

    /// A visible text delta arrived.
    fn on_text(&mut self, _delta: &str) {}

    /// A reasoning delta arrived.
    fn on_reasoning(&mut self, _delta: &str) {}

    /// The stream finished normally; `response` is the full accumulation.
    fn on_finished(&mut self, _response: &Response) {}
}

/// A sink that discards everything.
#[derive(Debug, Default)]
pub struct NullSink;

impl StreamSink for NullSink {}

/// Accumulates a streamed response chunk by chunk.
#[derive(Default)]
pub struct Session {
    state: SessionState,
    text: String,
    reasoning: String,
    tools: ToolCallBuilder,
    usage: Option<Usage>,
}

impl Session {
    /// A fresh idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Drive `stream` to completion, forwarding deltas to `sink`.
    ///
    /// The cancel token is checked before each chunk is processed; on
    /// cancellation the partial accumulation is returned and `on_finished`
    /// is not invoked. Stream errors propagate immediately.
    pub async fn consume<S>(
        &mut self,
        stream: S,
        sink: &mut dyn StreamSink,
        cancel: &CancelToken,
    ) -> Result<Response>
    where
        S: Stream<Item = Result<StreamChunk>>,
    {
        let mut stream = pin!(stream);
        self.state = SessionState::Started;
        sink.on_start();
        while let Some(chunk) = stream.next().await {
            if cancel.is_cancelled() {
                self.state = SessionState::Cancelled;
                break;
            }
            let chunk = chunk?;
            if let Some(delta) = chunk.reasoning_delta() {
                self.reasoning.push_str(delta);
                self.state = SessionState::EmittingReasoning;
                sink.on_reasoning(delta);
            }
            if let Some(delta) = chunk.text_delta() {
                self.text.push_str(delta);
                self.state = SessionState::EmittingText;
                sink.on_text(delta);
            }
            if let Some(delta) = &chunk.tool_call {
                self.tools.accept(delta);
            }
            if chunk.finished {
                self.usage = chunk.usage;
                self.state = SessionState::Finished;
                break;
            }
        }
        // A stream that ends without a terminal chunk still finishes.
        if !matches!(
            self.state,
            SessionState::Finished | SessionState::Cancelled
        ) {
            self.state = SessionState::Finished;
        }
        let response = self.response();
        if self.state == SessionState::Finished {
            sink.on_finished(&response);
        }
        Ok(response)
    }

    fn response(&self) -> Response {
        Response {
            text: self.text.clone(),
            reasoning: (!self.reasoning.is_empty()).then(|| self.reasoning.clone()),
            tool_calls: self.tools.build(),
            usage: self.usage,
        }
    }
}

/// Consume a stream with a one-shot session.
pub async fn consume<S>(
    stream: S,
    sink: &mut dyn StreamSink,
    cancel: &CancelToken,
) -> Result<Response>
where
    S: Stream<Item = Result<StreamChunk>>,
{
    Session::new().consume(stream, sink, cancel).await
}
