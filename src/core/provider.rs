//! Provider abstraction for the upstream generation API
//!
//! The relay handler talks to the upstream through [`Provider`] and gets an
//! explicit `Result` back; every upstream failure is a [`ProviderError`].

use crate::core::constants::message;
use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse};
use async_trait::async_trait;
use thiserror::Error;

/// Error types for provider operations
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The request never produced an HTTP response (connect, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(String),

    /// The upstream answered with a non-2xx status
    #[error("API error (status {status}): {body}")]
    ApiError {
        status: u16,
        message: Option<String>,
        body: String,
    },

    /// A 2xx reply whose body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ProviderError {
    /// Message safe to hand back to the client
    ///
    /// Only an upstream-supplied `error.message` is surfaced; everything else
    /// collapses to the generic failure text.
    pub fn user_message(&self) -> String {
        match self {
            ProviderError::ApiError {
                message: Some(message),
                ..
            } => message.clone(),
            _ => message::UPSTREAM_FAILED.to_string(),
        }
    }
}

/// Trait for upstream generation providers
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send a single non-streaming generation request
    async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ProviderError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Model the provider generates with
    fn model(&self) -> &str;
}
