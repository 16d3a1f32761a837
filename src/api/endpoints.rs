//! API endpoint handlers
//!
//! This module implements the relay endpoint and the health check.

use crate::api::error::ApiError;
use crate::core::config::Config;
use crate::core::constants::{message, route};
use crate::core::provider::Provider;
use crate::models::gemini::GenerateContentRequest;
use crate::models::relay::{GenerationRequest, GenerationResponse};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, error, info, warn};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub provider: Arc<dyn Provider>,
}

/// Create the API router with all endpoints
///
/// Cross-origin requests are allowed from any origin.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(route::GENERATE, post(generate))
        .route(route::HEALTH, get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// POST /api/generate - Relay a prompt to the upstream model
///
/// The body is decoded by hand so that malformed or non-JSON bodies get the
/// same 400 as a missing prompt.
async fn generate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<GenerationResponse>, ApiError> {
    let request_id = uuid::Uuid::new_v4();

    let Some(prompt) = GenerationRequest::prompt_from_body(&body) else {
        debug!(%request_id, "Rejected request without prompt");
        return Err(ApiError::Validation);
    };

    info!(
        %request_id,
        "📥 Incoming generate request: model={}, prompt_chars={}",
        state.provider.model(),
        prompt.chars().count()
    );

    let upstream_request = GenerateContentRequest::from_prompt(&prompt);
    let reply = match state.provider.generate_content(&upstream_request).await {
        Ok(reply) => reply,
        Err(e) => {
            error!(
                %request_id,
                "Error calling {} API: {}",
                state.provider.provider_name(),
                e
            );
            return Err(ApiError::Upstream(e));
        }
    };

    // A reply without candidate text is still a success for the client.
    let response = match reply.first_text() {
        Some(text) => text.to_string(),
        None => {
            warn!(
                %request_id,
                "Upstream reply had no candidate text (finish_reason={:?})",
                reply.finish_reason()
            );
            message::NO_RESPONSE.to_string()
        }
    };

    Ok(Json(GenerationResponse { response }))
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "provider": state.provider.provider_name(),
        "model": state.config.model,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::gemini;
    use crate::core::provider::ProviderError;
    use crate::core::providers::GeminiProvider;
    use crate::models::gemini::GenerateContentResponse;
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tower::ServiceExt;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const GENERATE_PATH: &str = "/models/gemini-2.0-flash:generateContent";

    fn test_config(base_url: String) -> Config {
        Config {
            api_key: "test-key".to_string(),
            model: gemini::MODEL.to_string(),
            base_url,
            request_timeout: 5,
            host: "127.0.0.1".to_string(),
            port: 3001,
            log_level: "info".to_string(),
        }
    }

    fn app_for(server: &MockServer) -> Router {
        let config = test_config(server.uri());
        let provider = GeminiProvider::from_config(&config).unwrap();
        create_router(AppState {
            config: Arc::new(config),
            provider: Arc::new(provider),
        })
    }

    fn generate_request(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(route::GENERATE)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn candidate(text: &str) -> Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]})
    }

    /// Provider that only counts calls, for checks that never reach the network
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Provider for CountingProvider {
        async fn generate_content(
            &self,
            _request: &GenerateContentRequest,
        ) -> Result<GenerateContentResponse, ProviderError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(GenerateContentResponse::default())
        }

        fn provider_name(&self) -> &str {
            "Counting"
        }

        fn model(&self) -> &str {
            "counting-model"
        }
    }

    #[tokio::test]
    async fn test_relays_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(GENERATE_PATH))
            .and(query_param("key", "test-key"))
            .and(body_json(json!({"contents": [{"parts": [{"text": "Hello"}]}]})))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Hi there!")))
            .expect(1)
            .mount(&server)
            .await;

        let (status, body) = send(app_for(&server), generate_request(r#"{"prompt":"Hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"response": "Hi there!"}));
    }

    #[tokio::test]
    async fn test_missing_prompt_is_rejected_without_upstream_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate("unused")))
            .expect(0)
            .mount(&server)
            .await;

        let app = app_for(&server);
        for body in ["{}", r#"{"prompt":""}"#, r#"{"prompt":null}"#, "", "not json"] {
            let (status, json_body) = send(app.clone(), generate_request(body)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body: {body:?}");
            assert_eq!(json_body, json!({"error": "Prompt is required"}));
        }
    }

    #[tokio::test]
    async fn test_validation_never_reaches_provider() {
        let provider = Arc::new(CountingProvider {
            calls: AtomicUsize::new(0),
        });
        let app = create_router(AppState {
            config: Arc::new(test_config(gemini::BASE_URL.to_string())),
            provider: provider.clone(),
        });

        let (status, _) = send(app.clone(), generate_request(r#"{"prompt":""}"#)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);

        let (status, _) = send(app, generate_request(r#"{"prompt":"Hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_candidate_falls_back_to_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"finishReason": "SAFETY"}]
            })))
            .mount(&server)
            .await;

        let (status, body) = send(app_for(&server), generate_request(r#"{"prompt":"Hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"response": "No response from Gemini."}));
    }

    #[tokio::test]
    async fn test_null_candidate_fields_fall_back_to_placeholder() {
        let replies = [
            json!({"candidates": null}),
            json!({"candidates": [null]}),
            json!({"candidates": [{"content": {"parts": null}}]}),
            json!({"candidates": [{"content": {"parts": [{"text": null}]}}]}),
        ];
        for reply in replies {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(reply.clone()))
                .expect(1)
                .mount(&server)
                .await;

            let (status, body) =
                send(app_for(&server), generate_request(r#"{"prompt":"Hello"}"#)).await;
            assert_eq!(status, StatusCode::OK, "reply: {reply}");
            assert_eq!(body, json!({"response": "No response from Gemini."}));
        }
    }

    #[tokio::test]
    async fn test_upstream_message_survives_odd_error_code() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {"code": "400", "message": "Quota exceeded", "status": 7}
            })))
            .mount(&server)
            .await;

        let (status, body) = send(app_for(&server), generate_request(r#"{"prompt":"Hello"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Quota exceeded"}));
    }

    #[tokio::test]
    async fn test_upstream_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": {
                    "code": 400,
                    "message": "API key not valid. Please pass a valid API key.",
                    "status": "INVALID_ARGUMENT"
                }
            })))
            .mount(&server)
            .await;

        let (status, body) = send(app_for(&server), generate_request(r#"{"prompt":"Hello"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": "API key not valid. Please pass a valid API key."})
        );
    }

    #[tokio::test]
    async fn test_upstream_error_without_message_uses_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("Service Unavailable"))
            .mount(&server)
            .await;

        let (status, body) = send(app_for(&server), generate_request(r#"{"prompt":"Hello"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to get response from Gemini."}));
    }

    #[tokio::test]
    async fn test_unparseable_success_body_uses_fallback_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let (status, body) = send(app_for(&server), generate_request(r#"{"prompt":"Hello"}"#)).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({"error": "Failed to get response from Gemini."}));
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_isolated() {
        let server = MockServer::start().await;
        let prompts = ["one", "two", "three", "four"];
        for (i, prompt) in prompts.iter().enumerate() {
            // Later prompts answer first.
            let delay = Duration::from_millis(40 * (prompts.len() - i) as u64);
            Mock::given(method("POST"))
                .and(body_json(json!({"contents": [{"parts": [{"text": prompt}]}]})))
                .respond_with(
                    ResponseTemplate::new(200)
                        .set_body_json(candidate(&format!("echo: {prompt}")))
                        .set_delay(delay),
                )
                .expect(1)
                .mount(&server)
                .await;
        }

        let app = app_for(&server);
        let calls = prompts.iter().map(|prompt| {
            let body = json!({"prompt": prompt}).to_string();
            send(app.clone(), generate_request(body))
        });
        let results = futures::future::join_all(calls).await;

        for (prompt, (status, body)) in prompts.iter().zip(results) {
            assert_eq!(status, StatusCode::OK);
            assert_eq!(body, json!({"response": format!("echo: {prompt}")}));
        }
    }

    #[tokio::test]
    async fn test_cors_allows_any_origin() {
        let server = MockServer::start().await;
        let request = Request::builder()
            .method("OPTIONS")
            .uri(route::GENERATE)
            .header(header::ORIGIN, "http://localhost:5173")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap();

        let response = app_for(&server).oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn test_health_check() {
        let server = MockServer::start().await;
        let request = Request::builder()
            .uri(route::HEALTH)
            .body(Body::empty())
            .unwrap();

        let (status, body) = send(app_for(&server), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["model"], gemini::MODEL);
        assert_eq!(body["provider"], "Gemini");
        assert!(body.get("api_key_configured").is_none());
        assert!(server.received_requests().await.unwrap().is_empty());
    }
}
