//! Declared per-model capabilities.
//!
//! A static prefix-matching map over known model families. Capabilities are
//! attached to an adapter instance at construction time and never mutated.

use serde::{Deserialize, Serialize};

/// What a resolved model instance declares it can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct Capabilities {
    /// Accepts image content parts.
    pub vision: bool,
    /// Emits reasoning content through a dedicated channel.
    pub reasoning: bool,
    /// Supports tool calls.
    pub tool_calls: bool,
    /// Maximum context length in tokens.
    pub max_context: usize,
}

impl Capabilities {
    /// Look up capabilities by model ID prefix.
    ///
    /// Unknown models get a conservative text-only default.
    pub fn for_model(model: &str) -> Self {
        if model.starts_with("claude-") {
            return Self {
                vision: true,
                reasoning: true,
                tool_calls: true,
                max_context: 200_000,
            };
        }
        if model.starts_with("gpt-4o") || model.starts_with("gpt-4-turbo") {
            return Self {
                vision: true,
                reasoning: false,
                tool_calls: true,
                max_context: 128_000,
            };
        }
        if model.starts_with("o1") || model.starts_with("o3") || model.starts_with("o4") {
            return Self {
                vision: false,
                reasoning: true,
                tool_calls: true,
                max_context: 200_000,
            };
        }
        if model.starts_with("gpt-4") {
            return Self {
                vision: false,
                reasoning: false,
                tool_calls: true,
                max_context: 8_192,
            };
        }
        if model.starts_with("gpt-3.5") {
            return Self {
                vision: false,
                reasoning: false,
                tool_calls: true,
                max_context: 16_385,
            };
        }
        if model.starts_with("deepseek-reasoner") {
            return Self {
                vision: false,
                reasoning: true,
                tool_calls: true,
                max_context: 64_000,
            };
        }
        if model.starts_with("deepseek-") {
            return Self {
                vision: false,
                reasoning: false,
                tool_calls: true,
                max_context: 64_000,
            };
        }
        // Unknown model, conservative text-only default.
        Self {
            vision: false,
            reasoning: false,
            tool_calls: false,
            max_context: 8_192,
        }
    }
}
