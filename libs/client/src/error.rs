//! Error types for the pidman client.

use thiserror::Error;

/// Errors returned by [`PidmanClient`](crate::PidmanClient) operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// A caller-supplied argument was rejected before any request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The service does not permit this operation.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// The service answered with a status outside the expected set.
    #[error("HTTP {status} {reason}{}", detail_suffix(.detail))]
    Http {
        status: u16,
        reason: String,
        detail: Option<String>,
    },

    /// The request could not be delivered or the response could not be read.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The response body did not match the declared encoding.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Client configuration is missing or malformed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl ClientError {
    /// Create an invalid-argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidArgument(message.into())
    }

    /// The HTTP status code, for errors raised from a response.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the service reported the resource as missing.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Returns true if the error was raised locally, before dispatch.
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidArgument(_) | ClientError::Unsupported(_) | ClientError::Config(_)
        )
    }
}

fn detail_suffix(detail: &Option<String>) -> String {
    detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()
}

/// Errors raised by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The underlying HTTP client failed.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A request could not be built from the given parts.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A response was built with a status outside the HTTP range.
    #[error("invalid HTTP status code {0}")]
    InvalidStatus(u16),

    /// A scripted transport had no response left to return.
    #[error("no response available for {method} {url}")]
    Exhausted { method: String, url: String },
}

/// Errors loading client configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting is absent.
    #[error("configuration error: {0} must be set")]
    Missing(&'static str),

    /// A setting is present but unusable.
    #[error("configuration error: {name} is invalid: {message}")]
    Invalid { name: &'static str, message: String },
}

/// Result alias for client operations.
pub type Result<T, E = ClientError> = std::result::Result<T, E>;
