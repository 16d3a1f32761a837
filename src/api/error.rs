//! Handler error type and its HTTP rendering

use crate::core::constants::message;
use crate::core::provider::ProviderError;
use crate::models::relay::ErrorResponse;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Outcome of a failed relay call
#[derive(Debug, Error)]
pub enum ApiError {
    /// Prompt missing or empty; no upstream call was made
    #[error("Prompt is required")]
    Validation,

    /// The upstream call failed
    #[error(transparent)]
    Upstream(#[from] ProviderError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = match &self {
            ApiError::Validation => message::PROMPT_REQUIRED.to_string(),
            ApiError::Upstream(e) => e.user_message(),
        };
        (self.status(), Json(ErrorResponse { error })).into_response()
    }
}
