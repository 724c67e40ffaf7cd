//! Local Ollama backend (`/api/generate`, non-streaming).

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ProviderConfig;
use crate::models::ProviderName;

use super::prompt::{self, Conventions};
use super::sanitize::sanitize_message;
use super::{CommitProvider, ProviderError};

/// Default per-request timeout. Local models can be slow to load.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

const NUM_PREDICT: u32 = 100;

const TEMPERATURE: f32 = 0.1;

const NAME: &str = "ollama";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
    #[serde(default)]
    error: Option<String>,
}

/// Ollama provider. Needs no credential.
#[derive(Debug)]
pub struct OllamaProvider {
    client: reqwest::Client,
    model: String,
    base_url: String,
    conventions: Conventions,
    timeout: Duration,
}

impl OllamaProvider {
    pub fn new(config: &ProviderConfig, conventions: Conventions) -> Result<Self, ProviderError> {
        Self::with_timeout(config, conventions, REQUEST_TIMEOUT)
    }

    /// Like [`new`](Self::new) with a custom per-request timeout.
    pub fn with_timeout(
        config: &ProviderConfig,
        conventions: Conventions,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            client: super::http_client(NAME, timeout)?,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| ProviderName::Ollama.default_model().to_string()),
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| ProviderName::Ollama.default_base_url().to_string()),
            conventions,
            timeout,
        })
    }
}

#[async_trait]
impl CommitProvider for OllamaProvider {
    fn name(&self) -> &str {
        NAME
    }

    fn is_configured(&self) -> bool {
        !self.model.is_empty() && !self.base_url.is_empty()
    }

    async fn generate(&self, files: &[String], patch: &str) -> Result<String, ProviderError> {
        let full_prompt = prompt::build_inline_prompt(files, patch, &self.conventions);
        let request = GenerateRequest {
            model: &self.model,
            prompt: &full_prompt,
            stream: false,
            options: GenerateOptions {
                temperature: TEMPERATURE,
                num_predict: NUM_PREDICT,
            },
        };

        let url = super::endpoint(&self.base_url, "/api/generate");
        debug!(url = %url, model = %self.model, files = files.len(), "requesting commit message");

        let response = self
            .client
            .post(&url)
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
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| ProviderError::Decode {
                provider: NAME.to_string(),
                message: e.to_string(),
            })?;

        if let Some(message) = parsed.error.filter(|m| !m.is_empty()) {
            return Err(ProviderError::Api {
                provider: NAME.to_string(),
                message,
            });
        }

        Ok(sanitize_message(&parsed.response))
    }
}
