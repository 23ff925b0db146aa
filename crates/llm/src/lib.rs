//! Canonical types for the unified LLM interface.
//!
//! This crate provides the shared, provider-agnostic data model used across
//! all backends: `Message` (with multimodal content parts), `Response`,
//! `StreamChunk`, `ToolCall`, `Capabilities`, `ChatConfig`, and the error
//! taxonomy. Pure data, no I/O — transports and adapters live in
//! `orca-model`.

pub use capability::Capabilities;
pub use chunk::StreamChunk;
pub use config::{ChatConfig, ReasoningEffort};
pub use error::{Error, Result};
pub use message::{Content, ContentPart, Message, Role, estimate_tokens, validate_messages};
pub use reasoning::{StreamSplitter, split_reasoning};
pub use response::{Response, Usage};
pub use tool::{ToolCall, ToolCallBuilder, ToolCallDelta};

mod capability;
mod chunk;
mod config;
mod error;
mod message;
mod reasoning;
mod response;
mod tool;
