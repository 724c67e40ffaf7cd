//! Shared types used across all modules.
//!
//! This module defines the staged change set and the provider identifiers.
//! Other modules import from here rather than reaching into each other's
//! internals.

pub mod diff;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use diff::ChangeSet;

/// Supported LLM provider backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    /// Hosted OpenAI chat-completions API.
    #[default]
    #[serde(rename = "openai")]
    OpenAI,
    /// Local Ollama server.
    Ollama,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderName::OpenAI => write!(f, "openai"),
            ProviderName::Ollama => write!(f, "ollama"),
        }
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(ProviderName::OpenAI),
            "ollama" => Ok(ProviderName::Ollama),
            other => Err(format!(
                "unsupported provider: '{other}'. Supported: openai, ollama"
            )),
        }
    }
}

impl ProviderName {
    /// Provider-specific environment variable holding the API key, if any.
    pub fn api_key_env_var(self) -> Option<&'static str> {
        match self {
            ProviderName::OpenAI => Some("OPENAI_API_KEY"),
            ProviderName::Ollama => None,
        }
    }

    /// Model used when none is configured.
    pub fn default_model(self) -> &'static str {
        match self {
            ProviderName::OpenAI => "gpt-4o-mini",
            ProviderName::Ollama => "llama3.2:3b",
        }
    }

    /// Endpoint root used when no base URL is configured.
    pub fn default_base_url(self) -> &'static str {
        match self {
            ProviderName::OpenAI => "https://api.openai.com/v1",
            ProviderName::Ollama => "http://localhost:11434",
        }
    }
}
