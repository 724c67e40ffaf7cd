//! CommitProvider trait and LLM backends.
//!
//! Every backend builds a prompt from the shared [`prompt`] helpers, issues
//! exactly one bounded-timeout HTTP request, and passes the reply through
//! [`sanitize::sanitize_message`]. Failures come back as a typed
//! [`ProviderError`]; the orchestrator decides what to do with them.

pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod sanitize;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::ProviderConfig;
use crate::models::ProviderName;

pub use prompt::Conventions;

/// Longest slice of an error body kept in [`ProviderError::Backend`].
const ERROR_BODY_PREVIEW_LEN: usize = 200;

/// Errors from a commit-message provider.
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("invalid or missing {provider} API key")]
    InvalidCredential { provider: String },

    #[error("{0}")]
    UnknownBackend(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("network error talking to {provider}: {message}")]
    Network { provider: String, message: String },

    #[error("{provider} request timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("{provider} request was cancelled")]
    Cancelled { provider: String },

    #[error("{provider} rate limit exceeded")]
    RateLimited { provider: String },

    #[error("{provider} service temporarily unavailable (HTTP {status})")]
    ServiceUnavailable { provider: String, status: u16 },

    #[error("{provider} API error (HTTP {status}): {body}")]
    Backend {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("{provider} API error: {message}")]
    Api { provider: String, message: String },

    #[error("failed to decode {provider} response: {message}")]
    Decode { provider: String, message: String },

    #[error("no response from {provider}")]
    EmptyResponse { provider: String },
}

/// Coarse grouping of [`ProviderError`] for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Detected before any request was sent.
    Configuration,
    /// The request never produced an HTTP response.
    Transport,
    /// The backend answered, but not with a usable message.
    Protocol,
}

impl ProviderError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ProviderError::InvalidCredential { .. }
            | ProviderError::UnknownBackend(_)
            | ProviderError::NotConfigured(_) => ErrorCategory::Configuration,
            ProviderError::Network { .. }
            | ProviderError::Timeout { .. }
            | ProviderError::Cancelled { .. } => ErrorCategory::Transport,
            ProviderError::RateLimited { .. }
            | ProviderError::ServiceUnavailable { .. }
            | ProviderError::Backend { .. }
            | ProviderError::Api { .. }
            | ProviderError::Decode { .. }
            | ProviderError::EmptyResponse { .. } => ErrorCategory::Protocol,
        }
    }

    /// A short suggestion for the user, when there is a useful one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ProviderError::InvalidCredential { provider } if provider == "openai" => Some(
                "Get an API key from https://platform.openai.com/api-keys and set OPENAI_API_KEY (or add it to ~/.env)",
            ),
            ProviderError::InvalidCredential { .. } => Some("Check your API key configuration"),
            ProviderError::UnknownBackend(_) => Some("Supported providers: openai, ollama"),
            ProviderError::Network { .. } | ProviderError::Timeout { .. } => {
                Some("Check your connection, or use `commitgen cache latest` for a previous message")
            }
            ProviderError::RateLimited { .. } => Some("Wait a moment and try again"),
            ProviderError::ServiceUnavailable { .. } => Some("Try again in a few moments"),
            _ => None,
        }
    }
}

/// Trait for LLM-backed commit message generation.
///
/// `generate` returns an already sanitized single-line message.
#[async_trait]
pub trait CommitProvider: Send + Sync {
    /// Backend name, also recorded as the cache `provider` tag.
    fn name(&self) -> &str;

    /// Whether the provider has everything it needs to make a request.
    fn is_configured(&self) -> bool;

    /// Generate a commit message for the staged change set.
    async fn generate(&self, files: &[String], patch: &str) -> Result<String, ProviderError>;
}

/// Construct the backend named in `config`.
///
/// Validation happens here so configuration problems surface before any
/// network call.
pub fn build_provider(
    config: &ProviderConfig,
    conventions: Conventions,
) -> Result<Box<dyn CommitProvider>, ProviderError> {
    let name: ProviderName = config
        .name
        .parse()
        .map_err(ProviderError::UnknownBackend)?;

    match name {
        ProviderName::OpenAI => Ok(Box::new(openai::OpenAiProvider::new(config, conventions)?)),
        ProviderName::Ollama => Ok(Box::new(ollama::OllamaProvider::new(config, conventions)?)),
    }
}

/// Build a reqwest client with the backend's request timeout.
pub(crate) fn http_client(provider: &str, timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            ProviderError::NotConfigured(format!("failed to create {provider} HTTP client: {e}"))
        })
}

/// Map a reqwest failure that happened before a response arrived.
pub(crate) fn transport_error(provider: &str, timeout: Duration, err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout {
            provider: provider.to_string(),
            timeout,
        }
    } else {
        ProviderError::Network {
            provider: provider.to_string(),
            message: err.to_string(),
        }
    }
}

/// Map a non-success HTTP status to the error taxonomy.
pub(crate) fn status_error(provider: &str, status: u16, body: &str) -> ProviderError {
    let provider = provider.to_string();
    match status {
        401 => ProviderError::InvalidCredential { provider },
        429 => ProviderError::RateLimited { provider },
        500..=599 => ProviderError::ServiceUnavailable { provider, status },
        _ => ProviderError::Backend {
            provider,
            status,
            body: body.chars().take(ERROR_BODY_PREVIEW_LEN).collect(),
        },
    }
}

/// Join a base URL and an endpoint path without doubling the slash.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}
