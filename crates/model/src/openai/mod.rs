//! OpenAI-compatible provider adapter.
//!
//! Covers OpenAI itself plus Grok (xAI), Qwen (Alibaba), Kimi (Moonshot),
//! Ollama, and any custom endpoint speaking the chat completions API.

use crate::http::HttpClient;
use llm::{Capabilities, ChatConfig, Result};
use reqwest::Client;

mod chat;
mod request;

pub use request::Request;

/// First-party chat completions endpoints.
pub mod endpoint {
    /// OpenAI chat completions.
    pub const OPENAI: &str = "https://api.openai.com/v1/chat/completions";
    /// Grok (xAI) chat completions.
    pub const GROK: &str = "https://api.x.ai/v1/chat/completions";
    /// Qwen (Alibaba DashScope) chat completions.
    pub const QWEN: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1/chat/completions";
    /// Kimi (Moonshot) chat completions.
    pub const KIMI: &str = "https://api.moonshot.cn/v1/chat/completions";
    /// Ollama local chat completions.
    pub const OLLAMA: &str = "http://localhost:11434/v1/chat/completions";
}

/// Join a base URL with the chat completions path.
pub fn chat_completions_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/chat/completions") {
        base.to_owned()
    } else {
        format!("{base}/chat/completions")
    }
}

/// An OpenAI-compatible model instance.
///
/// Cheap to clone: the transport shares its `reqwest::Client` and the
/// request template is small.
#[derive(Debug, Clone)]
pub struct OpenAi {
    http: HttpClient,
    request: Request,
    capabilities: Capabilities,
}

impl OpenAi {
    /// Build an instance from a resolved configuration.
    pub fn from_config(client: Client, config: &ChatConfig) -> Result<Self> {
        let endpoint = match &config.base_url {
            Some(base) => chat_completions_url(base),
            None => endpoint::OPENAI.to_owned(),
        };
        // Local endpoints (Ollama) run without credentials.
        let http = if config.api_key.is_empty() {
            HttpClient::no_auth(client, &endpoint)
        } else {
            HttpClient::bearer(client, &config.api_key, &endpoint)?
        };
        Ok(Self {
            http,
            request: Request::from(config),
            capabilities: Capabilities::for_model(&config.model),
        })
    }

    /// Capabilities declared for the configured model.
    pub fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    /// The configured model identifier.
    pub fn model_id(&self) -> &str {
        &self.request.model
    }

    pub(crate) fn http(&self) -> &HttpClient {
        &self.http
    }

    pub(crate) fn request(&self) -> &Request {
        &self.request
    }
}
