//! Configuration management
//!
//! This module handles loading and parsing configuration for the list server
//! and the list-query client. Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Prefix shared by every environment override
const ENV_PREFIX: &str = "ADMIN_LISTS_";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Mock data fixture overrides
    #[serde(default)]
    pub data: DataConfig,
    /// List-query cache configuration
    #[serde(default)]
    pub query: QueryConfig,
    /// HTTP client configuration
    #[serde(default)]
    pub client: ClientConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (the admin UI dev server)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "http://localhost:8848".to_string()
}

/// Fixture files replacing the embedded mock data
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON array of configuration-center entries
    #[serde(default)]
    pub config_center: Option<PathBuf>,
    /// JSON array of welcome-table rows
    #[serde(default)]
    pub welcome_table: Option<PathBuf>,
}

/// List-query cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// How long a fetched page stays fresh, in seconds
    #[serde(default = "default_stale_time")]
    pub stale_time_seconds: u64,
    /// Maximum number of cached pages
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            stale_time_seconds: default_stale_time(),
            max_entries: default_max_entries(),
        }
    }
}

impl QueryConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_seconds)
    }
}

fn default_stale_time() -> u64 {
    300
}

fn default_max_entries() -> u64 {
    1000
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL the list paths are appended to
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_timeout() -> u64 {
    30
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: format_yaml_error(&e),
        })
    }

    /// Load configuration from file with environment variable overrides
    ///
    /// Environment variables follow the pattern:
    /// - ADMIN_LISTS_SERVER_HOST
    /// - ADMIN_LISTS_SERVER_PORT
    /// - ADMIN_LISTS_SERVER_CORS_ORIGIN
    /// - ADMIN_LISTS_DATA_CONFIG_CENTER
    /// - ADMIN_LISTS_DATA_WELCOME_TABLE
    /// - ADMIN_LISTS_QUERY_STALE_TIME_SECONDS
    /// - ADMIN_LISTS_QUERY_MAX_ENTRIES
    /// - ADMIN_LISTS_CLIENT_BASE_URL
    /// - ADMIN_LISTS_CLIENT_TIMEOUT_SECONDS
    pub fn load_with_env(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Unparseable numeric values are ignored.
    fn apply_env_overrides(&mut self) {
        if let Some(host) = env_var("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse("SERVER_PORT") {
            self.server.port = port;
        }
        if let Some(origin) = env_var("SERVER_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }

        if let Some(path) = env_var("DATA_CONFIG_CENTER") {
            self.data.config_center = Some(PathBuf::from(path));
        }
        if let Some(path) = env_var("DATA_WELCOME_TABLE") {
            self.data.welcome_table = Some(PathBuf::from(path));
        }

        if let Some(secs) = env_parse("QUERY_STALE_TIME_SECONDS") {
            self.query.stale_time_seconds = secs;
        }
        if let Some(max) = env_parse("QUERY_MAX_ENTRIES") {
            self.query.max_entries = max;
        }

        if let Some(url) = env_var("CLIENT_BASE_URL") {
            self.client.base_url = url;
        }
        if let Some(secs) = env_parse("CLIENT_TIMEOUT_SECONDS") {
            self.client.timeout_seconds = secs;
        }
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(format!("{}{}", ENV_PREFIX, name)).ok()
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_var(name).and_then(|v| v.trim().parse().ok())
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());
