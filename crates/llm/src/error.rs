//! Error taxonomy shared by every layer.
//!
//! Three categories: `Configuration` (registration, resolution, instance
//! construction), `Validation` (malformed message lists, bad config fields),
//! and `Api` (HTTP-level failures, status 0 for network errors).
//! Cancellation is not an error anywhere in this workspace.

use thiserror::Error;

/// Result alias over the crate error type.
pub type Result<T> = std::result::Result<T, Error>;

/// The unified error type.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Missing or invalid registration, an unresolved provider, or a failed
    /// instance construction.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed message list or an invalid per-field configuration value.
    #[error("validation error: {0}")]
    Validation(String),

    /// An HTTP-level failure carrying an HTTP-status-like code.
    #[error("{message} (status {status})")]
    Api {
        /// HTTP status, or 0 for network-level failures.
        status: u16,
        /// Human-readable description safe to render in a UI.
        message: String,
    },
}

impl Error {
    /// An `Api` error with the given status and message.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Authentication failure. Never retried.
    pub fn invalid_credentials() -> Self {
        Self::api(401, "invalid API credentials")
    }

    /// Rate limit hit after the retry budget was spent.
    pub fn rate_limited() -> Self {
        Self::api(429, "rate limited - retry later")
    }

    /// Service unavailable after the retry budget was spent.
    pub fn unavailable() -> Self {
        Self::api(503, "service temporarily unavailable")
    }

    /// Network-level failure (timeout, connection reset, DNS).
    pub fn network(detail: impl std::fmt::Display) -> Self {
        Self::api(0, format!("network error - check connectivity: {detail}"))
    }

    /// The HTTP status carried by an `Api` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the retry policy may try again after this error.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Api { status: 0 | 429 | 503, .. })
    }
}
