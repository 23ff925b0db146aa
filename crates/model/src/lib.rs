//! Provider adapters, registry, instance cache, and streaming orchestration.
//!
//! The layer between application code and the remote LLM backends:
//!
//! - [`Registry`] maps provider names to [`ProviderSpec`] implementations
//!   and resolves which provider should serve a configuration.
//! - [`ModelCache`] memoizes constructed [`Model`] instances with LRU
//!   eviction and TTL expiry.
//! - [`Model`] dispatches `chat`/`stream` to the concrete adapter
//!   ([`openai`] or [`claude`]), both of which share the retrying HTTP
//!   transport in [`http`] and the SSE decoder in [`sse`].
//! - [`session`] drives a chunk stream on behalf of a caller-supplied sink
//!   with cooperative cancellation.

pub use cache::{DEFAULT_CAPACITY, DEFAULT_TTL, ModelCache};
pub use http::{CallError, HttpClient, RetryPolicy, default_client};
pub use provider::Model;
pub use registry::{CLAUDE_NAME, ClaudeSpec, OPENAI_NAME, OpenAiSpec, ProviderSpec, Registry};
pub use session::{CancelToken, NullSink, Session, SessionState, StreamSink, consume};
pub use sse::SseDecoder;

mod cache;
pub mod claude;
pub mod http;
pub mod openai;
mod provider;
mod registry;
pub mod session;
mod sse;

/// Resolve a configuration and return a (possibly cached) model instance.
///
/// The single entry point application code needs: resolution, validation,
/// construction, and caching happen behind it.
pub fn resolve_and_get(cache: &ModelCache, config: &llm::ChatConfig) -> llm::Result<Model> {
    cache.get_or_create(config)
}
