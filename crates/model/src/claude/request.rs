//! Wire request body for the messages API.

use llm::{ChatConfig, Content, ContentPart, Message, ReasoningEffort, Role};
use serde::Serialize;
use serde_json::{Value, json};

/// Default generation budget; the messages API requires `max_tokens`.
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// The messages API request body.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The model identifier.
    pub model: String,
    /// Maximum tokens to generate; mandatory on this API.
    pub max_tokens: u32,
    /// Top-level system prompt, extracted from system-role messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// The wire messages (user and assistant turns only).
    pub messages: Vec<Value>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Top-p sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Extended-thinking configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<Value>,
    /// Whether to stream the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
}

impl Request {
    /// Fill in the wire messages. System-role messages move to the
    /// top-level `system` field, joined when there are several.
    pub fn messages(&self, messages: &[Message]) -> Self {
        let mut system = Vec::new();
        let mut wire = Vec::new();
        for message in messages {
            match message.role {
                Role::System => system.push(message.content.text()),
                _ => wire.push(json!({
                    "role": message.role.as_str(),
                    "content": content_blocks(&message.content),
                })),
            }
        }
        Self {
            system: (!system.is_empty()).then(|| system.join("\n")),
            messages: wire,
            ..self.clone()
        }
    }

    /// Enable streaming.
    pub fn stream(mut self) -> Self {
        self.stream = Some(true);
        self
    }
}

impl From<&ChatConfig> for Request {
    fn from(config: &ChatConfig) -> Self {
        Self {
            model: config.model.to_string(),
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            system: None,
            messages: Vec::new(),
            temperature: config.temperature,
            top_p: config.top_p,
            thinking: config.reasoning_effort.map(thinking_config),
            stream: None,
        }
    }
}

/// Map an effort level onto an extended-thinking token budget.
fn thinking_config(effort: ReasoningEffort) -> Value {
    let budget = match effort {
        ReasoningEffort::Low => 1024,
        ReasoningEffort::Medium => 4096,
        ReasoningEffort::High => 16384,
    };
    json!({ "type": "enabled", "budget_tokens": budget })
}

fn content_blocks(content: &Content) -> Value {
    match content {
        Content::Text(text) => json!(text),
        Content::Parts(parts) => json!(parts.iter().map(wire_part).collect::<Vec<_>>()),
    }
}

fn wire_part(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text { text } => json!({ "type": "text", "text": text }),
        ContentPart::Image { data, media_type } => json!({
            "type": "image",
            "source": {
                "type": "base64",
                "media_type": media_type,
                "data": data,
            },
        }),
        ContentPart::ImageUrl { url } => json!({
            "type": "image",
            "source": { "type": "url", "url": url },
        }),
    }
}
