//! Unified model dispatch.

use crate::claude::Claude;
use crate::openai::OpenAi;
use async_stream::try_stream;
use futures_core::Stream;
use futures_util::StreamExt;
use llm::{Capabilities, Message, Response, Result, StreamChunk, validate_messages};
use std::pin::pin;

/// A constructed model instance, ready to serve requests.
///
/// Enum dispatch keeps the call sites static and the instances cheap to
/// clone out of the cache.
#[derive(Debug, Clone)]
pub enum Model {
    /// An OpenAI-compatible backend.
    OpenAi(OpenAi),
    /// A Claude backend.
    Claude(Claude),
}

impl Model {
    /// Capabilities declared for the configured model.
    pub fn capabilities(&self) -> Capabilities {
        match self {
            Self::OpenAi(m) => m.capabilities(),
            Self::Claude(m) => m.capabilities(),
        }
    }

    /// The configured model identifier.
    pub fn model_id(&self) -> &str {
        match self {
            Self::OpenAi(m) => m.model_id(),
            Self::Claude(m) => m.model_id(),
        }
    }

    /// Send the conversation and wait for the complete response.
    pub async fn chat(&self, messages: &[Message]) -> Result<Response> {
        validate_messages(messages)?;
        match self {
            Self::OpenAi(m) => m.chat(messages).await,
            Self::Claude(m) => m.chat(messages).await,
        }
    }

    /// Send the conversation and stream incremental chunks.
    ///
    /// The returned stream owns its input, so it outlives the borrow of
    /// `self`. Validation failures surface as the first stream item.
    pub fn stream(&self, messages: &[Message]) -> impl Stream<Item = Result<StreamChunk>> + use<> {
        let model = self.clone();
        let validation = validate_messages(messages);
        let messages = messages.to_vec();
        try_stream! {
            validation?;
            match model {
                Self::OpenAi(m) => {
                    let mut inner = pin!(m.stream(&messages));
                    while let Some(chunk) = inner.next().await {
                        yield chunk?;
                    }
                }
                Self::Claude(m) => {
                    let mut inner = pin!(m.stream(&messages));
                    while let Some(chunk) = inner.next().await {
                        yield chunk?;
                    }
                }
            }
        }
    }
}
