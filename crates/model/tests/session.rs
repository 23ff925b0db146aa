//! Streaming session accumulation and cancellation.

use futures_util::stream;
use llm::{Error, Response, StreamChunk, ToolCallDelta, Usage};
use orca_model::{CancelToken, NullSink, Session, SessionState, StreamSink, consume};

fn ok_chunks(chunks: Vec<StreamChunk>) -> impl futures_core::Stream<Item = llm::Result<StreamChunk>> {
    stream::iter(chunks.into_iter().map(Ok))
}

#[derive(Default)]
struct RecordingSink {
    text: String,
    reasoning: String,
    started: bool,
    finished: Option<Response>,
}

impl StreamSink for RecordingSink {
    fn on_start(&mut self) {
        self.started = true;
    }

    fn on_text(&mut self, delta: &str) {
        self.text.push_str(delta);
    }

    fn on_reasoning(&mut self, delta: &str) {
        self.reasoning.push_str(delta);
    }

    fn on_finished(&mut self, response: &Response) {
        self.finished = Some(response.clone());
    }
}

#[tokio::test]
async fn accumulates_text_reasoning_tools_and_usage() {
    let chunks = vec![
        StreamChunk::reasoning("thinking "),
        StreamChunk::reasoning("hard"),
        StreamChunk::text("the "),
        StreamChunk::text("answer"),
        StreamChunk::tool(ToolCallDelta {
            index: 0,
            id: "call_1".into(),
            name: "lookup".into(),
            arguments: "{\"q\":".into(),
        }),
        StreamChunk::tool(ToolCallDelta {
            index: 0,
            arguments: "\"rust\"}".into(),
            ..Default::default()
        }),
        StreamChunk::finished(Some(Usage::new(10, 20, None))),
    ];
    let mut sink = RecordingSink::default();
    let mut session = Session::new();
    let response = session
        .consume(ok_chunks(chunks), &mut sink, &CancelToken::new())
        .await
        .unwrap();

    assert_eq!(session.state(), SessionState::Finished);
    assert_eq!(response.text, "the answer");
    assert_eq!(response.reasoning.as_deref(), Some("thinking hard"));
    assert_eq!(response.tool_calls.len(), 1);
    assert_eq!(response.tool_calls[0].name, "lookup");
    assert_eq!(response.tool_calls[0].arguments["q"], "rust");
    assert_eq!(response.usage.unwrap().total_tokens, 30);

    assert!(sink.started);
    assert_eq!(sink.text, "the answer");
    assert_eq!(sink.reasoning, "thinking hard");
    assert_eq!(sink.finished.unwrap(), response);
}

#[tokio::test]
async fn stream_ending_without_terminal_chunk_still_finishes() {
    let chunks = vec![StreamChunk::text("partial")];
    let mut session = Session::new();
    let response = session
        .consume(ok_chunks(chunks), &mut NullSink, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Finished);
    assert_eq!(response.text, "partial");
    assert!(response.usage.is_none());
}

/// A sink that pulls the plug after seeing enough text deltas.
struct CancellingSink {
    token: CancelToken,
    after: usize,
    seen: usize,
    finished: bool,
}

impl StreamSink for CancellingSink {
    fn on_text(&mut self, _delta: &str) {
        self.seen += 1;
        if self.seen >= self.after {
            self.token.cancel();
        }
    }

    fn on_finished(&mut self, _response: &Response) {
        self.finished = true;
    }
}

#[tokio::test]
async fn cancellation_stops_consumption_and_skips_on_finished() {
    let chunks = vec![
        StreamChunk::text("one "),
        StreamChunk::text("two "),
        StreamChunk::text("three "),
        StreamChunk::finished(None),
    ];
    let token = CancelToken::new();
    let mut sink = CancellingSink {
        token: token.clone(),
        after: 2,
        seen: 0,
        finished: false,
    };
    let mut session = Session::new();
    let response = session
        .consume(ok_chunks(chunks), &mut sink, &token)
        .await
        .unwrap();

    assert_eq!(session.state(), SessionState::Cancelled);
    assert_eq!(response.text, "one two ");
    assert!(!sink.finished);
    assert!(token.is_cancelled());
}

#[tokio::test]
async fn stream_error_propagates() {
    let items: Vec<llm::Result<StreamChunk>> = vec![
        Ok(StreamChunk::text("before ")),
        Err(Error::rate_limited()),
    ];
    let err = consume(stream::iter(items), &mut NullSink, &CancelToken::new())
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(429));
}

#[tokio::test]
async fn state_tracks_the_last_delta_kind() {
    let mut session = Session::new();
    assert_eq!(session.state(), SessionState::Idle);
    session
        .consume(
            ok_chunks(vec![
                StreamChunk::reasoning("r"),
                StreamChunk::text("t"),
                StreamChunk::finished(None),
            ]),
            &mut NullSink,
            &CancelToken::new(),
        )
        .await
        .unwrap();
    assert_eq!(session.state(), SessionState::Finished);
}

#[tokio::test]
async fn empty_deltas_do_not_reach_the_sink() {
    let chunks = vec![
        StreamChunk::text(""),
        StreamChunk::reasoning(""),
        StreamChunk::text("real"),
        StreamChunk::finished(None),
    ];
    let mut sink = RecordingSink::default();
    let response = consume(ok_chunks(chunks), &mut sink, &CancelToken::new())
        .await
        .unwrap();
    assert_eq!(sink.text, "real");
    assert!(sink.reasoning.is_empty());
    assert_eq!(response.text, "real");
    assert!(response.reasoning.is_none());
}
