//! OpenAI chat-completions backend.
//!
//! Sends the conventions as the `system` message and the change-set prompt
//! as the `user` message. Any OpenAI-compatible server can be targeted by
//! overriding the base URL.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::models::ProviderName;

use super::prompt::{self, Conventions};
use super::sanitize::sanitize_message;
use super::{CommitProvider, ProviderError};

/// Default per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Token cap for the reply; a subject line needs far fewer.
const MAX_TOKENS: u32 = 100;

const TEMPERATURE: f32 = 0.1;

/// Required prefix of an OpenAI secret key.
const API_KEY_PREFIX: &str = "sk-";

const NAME: &str = "openai";

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ApiErrorBody>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Hosted OpenAI provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    conventions: Conventions,
    timeout: Duration,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl OpenAiProvider {
    /// Validate the credential and build the HTTP client.
    pub fn new(config: &ProviderConfig, conventions: Conventions) -> Result<Self, ProviderError> {
        Self::with_timeout(config, conventions, REQUEST_TIMEOUT)
    }

    /// Like [`new`](Self::new) with a custom per-request timeout.
    pub fn with_timeout(
        config: &ProviderConfig,
        conventions: Conventions,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| k.starts_with(API_KEY_PREFIX))
            .ok_or_else(|| ProviderError::InvalidCredential {
                provider: NAME.to_string(),
            })?;

        Ok(Self {
            client: super::http_client(NAME, timeout)?,
            api_key: api_key.to_string(),
            model: config
                .model
                .clone()
                .unwrap_or_else(|| ProviderName::OpenAI.default_model().to_string()),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| ProviderName::OpenAI.default_base_url().to_string()),
            conventions,
            timeout,
        })
    }
}

#[async_trait]
impl CommitProvider for OpenAiProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, files: &[String], patch: &str) -> Result<String, ProviderError> {
        let user_prompt = prompt::build_prompt(files, patch);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: self.conventions.text(),
                },
                ChatMessage {
                    role: "user",
                    content: &user_prompt,
                },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let url = super::endpoint(&self.base_url, "/chat/completions");
        debug!(url = %url, model = %self.model, files = files.len(), "requesting commit message");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| super::transport_error(NAME, self.timeout, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(super::status_error(NAME, status.as_u16(), &body));
        }

        let body = response
            .text()
            .await
            .map_err(|e| super::transport_error(NAME, self.timeout, e))?;
        let parsed: ChatResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
                provider: NAME.to_string(),
                message: e.to_string(),
            })?;

        if let Some(err) = parsed.error {
            return Err(ProviderError::Api {
                provider: NAME.to_string(),
                message: err.message,
            });
        }

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::EmptyResponse {
                provider: NAME.to_string(),
            })?;

        Ok(sanitize_message(
            choice.message.content.as_deref().unwrap_or_default(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            name: "openai".into(),
            model: None,
            base_url: None,
            api_key: api_key.map(String::from),
        }
    }

    #[test]
    fn rejects_missing_key() {
        let err = OpenAiProvider::new(&config(None), Conventions::builtin()).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCredential { .. }));
    }

    #[test]
    fn rejects_malformed_key() {
        let err = OpenAiProvider::new(&config(Some("pk-123")), Conventions::builtin()).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidCredential { .. }));
    }

    #[test]
    fn applies_defaults() {
        let provider = OpenAiProvider::new(&config(Some("sk-abc")), Conventions::builtin()).unwrap();
        assert_eq!(provider.model, "gpt-4o-mini");
        assert_eq!(provider.base_url, "https://api.openai.com/v1");
        assert_eq!(provider.timeout, REQUEST_TIMEOUT);
        assert!(provider.is_configured());
    }

    #[test]
    fn debug_redacts_key() {
        let provider = OpenAiProvider::new(&config(Some("sk-secret")), Conventions::builtin()).unwrap();
        let out = format!("{provider:?}");
        assert!(!out.contains("sk-secret"));
        assert!(out.contains("[REDACTED]"));
    }

    #[test]
    fn request_body_shape() {
        let request = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![
                ChatMessage { role: "system", content: "conv" },
                ChatMessage { role: "user", content: "prompt" },
            ],
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["max_tokens"], 100);
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "prompt");
    }

    #[test]
    fn response_with_null_content_parses() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }
}
