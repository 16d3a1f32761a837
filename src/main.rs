//! Gemini prompt relay
//!
//! Accepts `{"prompt": ...}` on `POST /api/generate`, forwards it to the
//! Gemini `generateContent` API and answers with the first candidate's text.

mod api;
mod core;
mod models;

use crate::api::endpoints::{AppState, create_router};
use crate::core::config::Config;
use crate::core::logging::init_logging;
use crate::core::provider::Provider;
use crate::core::providers::GeminiProvider;
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Check for --help flag
    if std::env::args().any(|arg| arg == "--help") {
        print_help();
        return;
    }

    // A missing .env file is fine; real environment variables still apply.
    dotenv::dotenv().ok();

    // Load configuration; the API key is required before anything binds
    let config = match Config::from_env() {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            eprintln!("FATAL ERROR: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    init_logging(&config.log_level);

    print_startup_banner(&config);

    let provider: Arc<dyn Provider> = match GeminiProvider::from_config(&config) {
        Ok(provider) => Arc::new(provider),
        Err(e) => {
            error!("Failed to create Gemini provider: {:#}", e);
            std::process::exit(1);
        }
    };

    info!("Using provider: {}", provider.provider_name());

    let app = create_router(AppState {
        config: config.clone(),
        provider,
    });

    // Bind to address
    let addr = format!("{}:{}", config.host, config.port);
    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    info!("Server listening on http://{}", addr);

    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Print startup banner with configuration
fn print_startup_banner(config: &Config) {
    println!("🚀 Gemini Relay v{}", env!("CARGO_PKG_VERSION"));
    println!("✅ Configuration loaded successfully");
    println!("   Model: {}", config.model);
    println!("   Base URL: {}", config.base_url);
    println!("   Request Timeout: {}s", config.request_timeout);
    println!("   Server: {}:{}", config.host, config.port);
    println!();
}

/// Print help message
fn print_help() {
    println!("Gemini Relay v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Usage: gemini-relay [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --help    Display this help message");
    println!();
    println!("Environment variables (also read from .env):");
    println!("  GEMINI_API_KEY - Gemini API key (required)");
    println!("  GEMINI_MODEL - Model name (default: gemini-2.0-flash)");
    println!("  GEMINI_BASE_URL - API base URL");
    println!("  REQUEST_TIMEOUT - Upstream timeout in seconds (default: 90)");
    println!("  HOST - Server host (default: 0.0.0.0)");
    println!("  PORT - Server port (default: 3001)");
    println!("  LOG_LEVEL - Logging level (default: info)");
    println!("  CONFIG_PATH - Optional TOML config file (default: config.toml)");
}
