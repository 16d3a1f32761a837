//! Constants for the relay's wire contract
//!
//! User-facing messages and upstream defaults live here so handlers, the
//! provider, and tests agree on the exact strings.

/// Messages returned to clients
pub mod message {
    /// Error text for a missing or empty prompt
    pub const PROMPT_REQUIRED: &str = "Prompt is required";

    /// Response text used when the upstream reply carries no candidate text
    pub const NO_RESPONSE: &str = "No response from Gemini.";

    /// Error text used when the upstream failure has no message of its own
    pub const UPSTREAM_FAILED: &str = "Failed to get response from Gemini.";
}

/// Gemini API defaults
pub mod gemini {
    /// Generative Language API base URL
    pub const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// Default generation model
    pub const MODEL: &str = "gemini-2.0-flash";

    /// Method name appended to the model path
    pub const GENERATE_CONTENT: &str = "generateContent";

    /// Query parameter carrying the API key
    pub const KEY_PARAM: &str = "key";
}

/// Inbound routes
pub mod route {
    /// Prompt relay endpoint
    pub const GENERATE: &str = "/api/generate";

    /// Health check endpoint
    pub const HEALTH: &str = "/health";
}
