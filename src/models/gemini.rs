//! Gemini `generateContent` data models
//!
//! Only the fields the relay reads or writes are modelled. Every response
//! field is optional, and a `null` anywhere on the candidate path decodes
//! like a missing field, so such a reply falls through to the placeholder
//! text instead of failing.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Decode a list that may be absent, `null`, or contain `null` entries
///
/// `null` entries stay in place so indexing matches the upstream array.
fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<Option<T>>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single content part
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// A content block: one role plus its parts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub parts: Vec<Option<Part>>,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Build a request whose only content part is `prompt`
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![Content {
                role: None,
                parts: vec![Some(Part {
                    text: Some(prompt.to_string()),
                })],
            }],
        }
    }
}

/// One generated candidate
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Token accounting reported alongside candidates
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageMetadata {
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    #[serde(default)]
    pub candidates_token_count: Option<u32>,
    #[serde(default)]
    pub total_token_count: Option<u32>,
}

/// Successful `generateContent` reply
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default, deserialize_with = "nullable_list")]
    pub candidates: Vec<Option<Candidate>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_metadata: Option<UsageMetadata>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if present and non-empty
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .as_ref()?
            .content
            .as_ref()?
            .parts
            .first()?
            .as_ref()?
            .text
            .as_deref()
            .filter(|text| !text.is_empty())
    }

    /// Finish reason of the first candidate
    pub fn finish_reason(&self) -> Option<&str> {
        self.candidates.first()?.as_ref()?.finish_reason.as_deref()
    }
}

/// Error detail in a non-2xx Gemini reply
///
/// Fields are kept as raw JSON so an odd `code` or `status` never stops
/// `message` from being read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorDetail {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub message: Option<Value>,
    #[serde(default)]
    pub status: Option<Value>,
}

impl ErrorDetail {
    /// `message`, when it is a non-empty string
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_ref()?
            .as_str()
            .filter(|message| !message.is_empty())
    }
}

/// Envelope of a non-2xx Gemini reply: `{"error": {...}}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

impl ErrorEnvelope {
    /// Extract `error.message` from a raw error body
    ///
    /// Returns `None` when the body is not JSON, has no `error` object, or
    /// carries an empty message.
    pub fn message_from_body(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()?
            .error?
            .message()
            .map(str::to_string)
    }
}
