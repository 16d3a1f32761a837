//! Inbound relay data models

use serde::{Deserialize, Serialize};

/// Body of `POST /api/generate`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: Option<String>,
}

impl GenerationRequest {
    /// Decode a raw request body, returning the prompt if it is usable
    ///
    /// Bodies that are not JSON objects, prompts that are not strings and
    /// empty prompts all yield `None`.
    pub fn prompt_from_body(body: &[u8]) -> Option<String> {
        serde_json::from_slice::<GenerationRequest>(body)
            .ok()?
            .prompt
            .filter(|prompt| !prompt.is_empty())
    }
}

/// Successful relay reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResponse {
    pub response: String,
}

/// Error reply
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
