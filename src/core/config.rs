//! Application configuration management
//!
//! Configuration is read once at startup from an optional TOML file and the
//! process environment (environment wins). The result is an immutable
//! [`Config`] that is passed into the router state, never read globally.

use crate::core::constants::gemini;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;

/// Default server port
const DEFAULT_PORT: u16 = 3001;

/// Default request timeout in seconds
const DEFAULT_REQUEST_TIMEOUT: u64 = 90;

/// Default configuration file looked up when `CONFIG_PATH` is unset
const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct GeminiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub request_timeout: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ServerConfig {
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub log_level: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub gemini: GeminiConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Relay configuration
///
/// Built and validated at startup so a misconfigured process fails before
/// it binds a port.
#[derive(Clone)]
pub struct Config {
    /// Gemini API key, sent as the `key` query parameter
    pub api_key: String,

    /// Gemini model name
    pub model: String,

    /// Generative Language API base URL
    pub base_url: String,

    /// Upstream request timeout in seconds
    pub request_timeout: u64,

    /// Server host address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Logging level
    pub log_level: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("request_timeout", &self.request_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl Config {
    /// Load configuration from a TOML file, ignoring the environment
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed, or if the API key
    /// is missing.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = read_toml(path.as_ref())?;
        Self::resolve(file, |_| None)
    }

    /// Load configuration from `CONFIG_PATH` (if present) and the environment
    pub fn from_env() -> Result<Self> {
        let config_path = std::env::var("CONFIG_PATH")
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(Path::new(&config_path), |key| std::env::var(key).ok())
    }

    /// Load configuration from an optional file plus an environment lookup
    ///
    /// A missing file is treated as empty. Values returned by `env` override
    /// the file; empty values count as unset.
    pub fn load<F>(path: &Path, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = if path.exists() {
            read_toml(path)?
        } else {
            TomlConfig::default()
        };
        Self::resolve(file, env)
    }

    fn resolve<F>(file: TomlConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|v| !v.trim().is_empty());

        let api_key = lookup("GEMINI_API_KEY")
            .or(file.gemini.api_key)
            .filter(|key| !key.trim().is_empty())
            .context("GEMINI_API_KEY is not set")?;

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid PORT value: {raw}"))?,
            None => file.server.port.unwrap_or(DEFAULT_PORT),
        };

        let request_timeout = match lookup("REQUEST_TIMEOUT") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Invalid REQUEST_TIMEOUT value: {raw}"))?,
            None => file
                .gemini
                .request_timeout
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT),
        };

        let base_url = lookup("GEMINI_BASE_URL")
            .or(file.gemini.base_url)
            .unwrap_or_else(|| gemini::BASE_URL.to_string());

        Ok(Config {
            api_key,
            model: lookup("GEMINI_MODEL")
                .or(file.gemini.model)
                .unwrap_or_else(|| gemini::MODEL.to_string()),
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout,
            host: lookup("HOST")
                .or(file.server.host)
                .unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            log_level: lookup("LOG_LEVEL")
                .or(file.server.log_level)
                .unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn read_toml(path: &Path) -> Result<TomlConfig> {
    let content = fs::read_to_string(path).context("Failed to read configuration file")?;
    toml::from_str(&content).context("Failed to parse TOML configuration")
}
