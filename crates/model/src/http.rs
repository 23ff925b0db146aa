//! Shared HTTP transport and the retry policy applied to every outbound
//! call.
//!
//! `HttpClient` wraps a `reqwest::Client` with pre-configured headers and an
//! endpoint URL. Both the non-streaming (`post_json`) and streaming
//! (`post_stream`) paths run under one [`RetryPolicy`], so every adapter
//! gets identical timeout, backoff, and error-classification behavior
//! without provider-specific code.

use llm::{Error, Result};
use reqwest::{
    Client, Method,
    header::{self, HeaderMap, HeaderName, HeaderValue},
};
use serde::Serialize;
use std::time::Duration;

/// Connect timeout for the shared client.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Idle-read timeout; also bounds silent gaps inside a stream.
pub const READ_TIMEOUT: Duration = Duration::from_secs(90);

/// Build the shared HTTP client with per-call timeouts.
///
/// Building only fails when the TLS backend cannot initialize, in which
/// case no client would work anyway.
pub fn default_client() -> Client {
    Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .read_timeout(READ_TIMEOUT)
        .build()
        .expect("TLS backend failed to initialize")
}

/// Transport-level failure handed to the retry policy for classification.
#[derive(Debug)]
pub enum CallError {
    /// Non-2xx HTTP response with its raw body.
    Http { status: u16, body: String },
    /// Timeout, connection reset, DNS failure.
    Network(String),
}

impl From<reqwest::Error> for CallError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}

/// Exponential-backoff retry applied to every adapter HTTP call.
///
/// Retryable conditions: HTTP 429, HTTP 503, and network-level failures,
/// each retried up to `max_retries` times with doubling delays. 401 fails
/// immediately as an invalid-credential error; every other non-2xx surfaces
/// immediately with the provider's error message.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the initial attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles each time.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry `attempt` (0-based): 1s, 2s, 4s.
    pub fn delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Run `op`, retrying retryable failures until the budget is spent.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, CallError>>,
    {
        let mut attempt = 0;
        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => classify(err),
            };
            if !err.is_retryable() || attempt >= self.max_retries {
                return Err(err);
            }
            let delay = self.delay(attempt);
            tracing::warn!("retryable failure: {err}; retrying in {delay:?}");
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Map a transport failure onto the typed error taxonomy.
fn classify(err: CallError) -> Error {
    match err {
        CallError::Network(detail) => Error::network(detail),
        CallError::Http { status, body } => match status {
            401 => Error::invalid_credentials(),
            429 => Error::rate_limited(),
            503 => Error::unavailable(),
            status => Error::api(status, provider_message(status, &body)),
        },
    }
}

/// Extract a provider error message from a JSON body, falling back to the
/// raw status line.
fn provider_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .pointer("/error/message")
                .or_else(|| value.get("message"))
                .and_then(|m| m.as_str())
                .map(str::to_owned)
        })
        .unwrap_or_else(|| format!("HTTP {status}"))
}

/// Pre-configured transport for one provider endpoint.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    headers: HeaderMap,
    endpoint: String,
    retry: RetryPolicy,
}

impl HttpClient {
    fn base_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }

    /// Create a transport with Bearer token authentication.
    pub fn bearer(client: Client, key: &str, endpoint: &str) -> Result<Self> {
        let mut headers = Self::base_headers();
        headers.insert(
            header::AUTHORIZATION,
            format!("Bearer {key}")
                .parse()
                .map_err(|e| Error::Configuration(format!("invalid authorization header: {e}")))?,
        );
        Ok(Self {
            client,
            headers,
            endpoint: endpoint.to_owned(),
            retry: RetryPolicy::default(),
        })
    }

    /// Create a transport without authentication (e.g. a local endpoint).
    pub fn no_auth(client: Client, endpoint: &str) -> Self {
        Self {
            client,
            headers: Self::base_headers(),
            endpoint: endpoint.to_owned(),
            retry: RetryPolicy::default(),
        }
    }

    /// Create a transport with a custom authentication header.
    ///
    /// Used by providers that don't take Bearer tokens (Anthropic uses
    /// `x-api-key`).
    pub fn custom_header(
        client: Client,
        header_name: &str,
        header_value: &str,
        endpoint: &str,
    ) -> Result<Self> {
        Self::no_auth(client, endpoint).with_header(header_name, header_value)
    }

    /// Add a header to the transport.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = name
            .parse::<HeaderName>()
            .map_err(|e| Error::Configuration(format!("invalid header name '{name}': {e}")))?;
        let value = value
            .parse::<HeaderValue>()
            .map_err(|e| Error::Configuration(format!("invalid header value: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Replace the retry policy (tests use short budgets).
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The endpoint URL.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// The pre-built headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// POST a JSON body and return the response text.
    pub async fn post_json(&self, body: &impl Serialize) -> Result<String> {
        if let Ok(text) = serde_json::to_string(body) {
            tracing::trace!("request: {text}");
        }
        self.retry
            .run(|| async {
                let response = self
                    .client
                    .request(Method::POST, &self.endpoint)
                    .headers(self.headers.clone())
                    .json(body)
                    .send()
                    .await?;
                checked(response).await?.text().await.map_err(CallError::from)
            })
            .await
    }

    /// POST a JSON body and return the raw response for streaming
    /// consumption. Establishing the call (including the status check) goes
    /// through the retry policy; the body stream itself does not.
    pub async fn post_stream(&self, body: &impl Serialize) -> Result<reqwest::Response> {
        if let Ok(text) = serde_json::to_string(body) {
            tracing::trace!("request: {text}");
        }
        self.retry
            .run(|| async {
                let response = self
                    .client
                    .request(Method::POST, &self.endpoint)
                    .headers(self.headers.clone())
                    .json(body)
                    .send()
                    .await?;
                checked(response).await
            })
            .await
    }
}

/// Pass 2xx responses through; turn anything else into a `CallError` with
/// the body preserved for message extraction.
async fn checked(response: reqwest::Response) -> std::result::Result<reqwest::Response, CallError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CallError::Http {
        status: status.as_u16(),
        body,
    })
}
