//! Chat configuration handed to provider resolution.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// The configuration for resolving and constructing a model instance.
///
/// Immutable once handed to resolution; the cache copies it into entries.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Explicit provider selection. Inferred from the model name or base
    /// URL when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<CompactString>,
    /// API credential.
    #[serde(default)]
    pub api_key: String,
    /// Endpoint base URL override. Defaults per provider when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Model identifier.
    pub model: CompactString,
    /// Sampling temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Top-p sampling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum tokens to generate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Frequency penalty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Presence penalty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Reasoning-effort hint for models with a thinking channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<ReasoningEffort>,
}

impl ChatConfig {
    /// Create a configuration for the given model.
    pub fn new(model: impl Into<CompactString>) -> Self {
        Self {
            model: model.into(),
            ..Default::default()
        }
    }

    /// Short credential prefix, safe for cache keys and logs.
    ///
    /// Eight characters is enough to distinguish credentials without
    /// exposing meaningful key material.
    pub fn key_prefix(&self) -> CompactString {
        self.api_key.chars().take(8).collect()
    }
}

/// How much reasoning a thinking-capable model should spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    /// Minimal thinking budget.
    Low,
    /// Moderate thinking budget.
    Medium,
    /// Large thinking budget.
    High,
}

impl ReasoningEffort {
    /// Wire name of the effort level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}
