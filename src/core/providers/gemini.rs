//! Gemini provider implementation

use crate::core::config::Config;
use crate::core::constants::gemini;
use crate::core::provider::{Provider, ProviderError};
use crate::models::gemini::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Provider for Google's Generative Language (Gemini) API
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    ///
    /// # Arguments
    ///
    /// * `api_key` - Gemini API key, sent as the `key` query parameter
    /// * `base_url` - API base URL, without trailing slash
    /// * `model` - Model name, e.g. `gemini-2.0-flash`
    /// * `timeout` - Request timeout in seconds
    pub fn new(api_key: String, base_url: String, model: String, timeout: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url,
            model,
        })
    }

    /// Create a provider from the relay configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.model.clone(),
            config.request_timeout,
        )
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:{}",
            self.base_url,
            self.model,
            gemini::GENERATE_CONTENT
        )
    }
}

// reqwest errors render the request URL, which carries the API key.
fn transport_error(error: reqwest::Error) -> ProviderError {
    ProviderError::Transport(error.without_url().to_string())
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError> {
        debug!("Sending generateContent request: model={}", self.model);

        let response = self
            .client
            .post(self.endpoint())
            .query(&[(gemini::KEY_PARAM, self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::ApiError {
                status: status.as_u16(),
                message: ErrorEnvelope::message_from_body(&body),
                body,
            });
        }

        let body = response.bytes().await.map_err(transport_error)?;
        serde_json::from_slice(&body).map_err(|e| ProviderError::Decode(e.to_string()))
    }

    fn provider_name(&self) -> &str {
        "Gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }
}
