//! Claude (Anthropic Messages API) provider adapter.

use crate::http::HttpClient;
use llm::{Capabilities, ChatConfig, Result};
use reqwest::Client;

mod chat;
mod request;
mod stream;

pub use request::Request;

/// First-party messages endpoint.
pub const ENDPOINT: &str = "https://api.anthropic.com/v1/messages";
/// Messages API version header value.
pub const API_VERSION: &str = "2023-06-01";

/// Join a base URL with the messages path.
pub fn messages_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/v1/messages") {
        base.to_owned()
    } else if base.ends_with("/v1") {
        format!("{base}/messages")
    } else {
        format!("{base}/v1/messages")
    }
}

/// A Claude model instance.
#[derive(Debug, Clone)]
pub struct Claude {
    http: HttpClient,
    request: Request,
    capabilities: Capabilities,
}

impl Claude {
    /// Build an instance from a resolved configuration.
    pub fn from_config(client: Client, config: &ChatConfig) -> Result<Self> {
        let endpoint = match &config.base_url {
            Some(base) => messages_url(base),
            None => ENDPOINT.to_owned(),
        };
        let http = HttpClient::custom_header(client, "x-api-key", &config.api_key, &endpoint)?
            .with_header("anthropic-version", API_VERSION)?;
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
