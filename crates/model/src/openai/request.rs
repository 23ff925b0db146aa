//! Wire request body for the chat completions API.

use llm::{ChatConfig, Content, ContentPart, Message};
use serde::Serialize;
use serde_json::{Value, json};

/// The chat completions request body.
///
/// Optional fields use `skip_serializing_if` so provider-specific extras
/// are simply absent when unused.
#[derive(Debug, Clone, Serialize)]
pub struct Request {
    /// The model identifier.
    pub model: String,
    /// The wire messages.
    pub messages: Vec<Value>,
    /// Sampling temperature.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Top-p sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Frequency penalty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    /// Presence penalty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    /// Reasoning effort for o-series models.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning_effort: Option<&'static str>,
    /// Whether to stream the response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    /// Stream options (include_usage).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_options: Option<Value>,
}

impl Request {
    /// Fill in the wire messages, converting canonical content (including
    /// multimodal parts) to the chat completions format.
    pub fn messages(&self, messages: &[Message]) -> Self {
        Self {
            messages: messages.iter().map(wire_message).collect(),
            ..self.clone()
        }
    }

    /// Enable streaming; usage then arrives in a final chunk before the
    /// `[DONE]` terminator.
    pub fn stream(mut self) -> Self {
        self.stream = Some(true);
        self.stream_options = Some(json!({ "include_usage": true }));
        self
    }
}

impl From<&ChatConfig> for Request {
    fn from(config: &ChatConfig) -> Self {
        Self {
            model: config.model.to_string(),
            messages: Vec::new(),
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
            frequency_penalty: config.frequency_penalty,
            presence_penalty: config.presence_penalty,
            reasoning_effort: config.reasoning_effort.map(|e| e.as_str()),
            stream: None,
            stream_options: None,
        }
    }
}

fn wire_message(message: &Message) -> Value {
    let content = match &message.content {
        Content::Text(text) => json!(text),
        Content::Parts(parts) => json!(parts.iter().map(wire_part).collect::<Vec<_>>()),
    };
    json!({
        "role": message.role.as_str(),
        "content": content,
    })
}

fn wire_part(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text { text } => json!({ "type": "text", "text": text }),
        // Inline data is already local, so ask for full detail.
        ContentPart::Image { data, media_type } => json!({
            "type": "image_url",
            "image_url": {
                "url": format!("data:{media_type};base64,{data}"),
                "detail": "high",
            },
        }),
        // Remote references let the provider pick the fidelity.
        ContentPart::ImageUrl { url } => json!({
            "type": "image_url",
            "image_url": { "url": url, "detail": "auto" },
        }),
    }
}
