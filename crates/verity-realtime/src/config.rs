//! Configuration file parsing for the server.
//!
//! Loads settings from TOML files including bind address, Gemini endpoint
//! and credentials, and realtime tuning knobs (heartbeat interval,
//! monitoring cadence, outbound channel capacity).

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
}

/// Server configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "127.0.0.1")
    pub bind_address: String,

    /// Bind port (e.g., 8080)
    pub bind_port: u16,

    /// Gemini API settings
    #[serde(default)]
    pub gemini: GeminiConfig,

    /// Realtime monitoring settings
    #[serde(default)]
    pub realtime: RealtimeConfig,
}

/// Gemini API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GeminiConfig {
    /// API base endpoint
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,

    /// Model to request
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// API key; falls back to the GEMINI_API_KEY environment variable
    /// when empty
    #[serde(default)]
    pub api_key: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry attempts per request
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// Realtime layer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeConfig {
    /// Seconds between liveness sweeps
    #[serde(default = "default_heartbeat_secs")]
    pub heartbeat_interval_secs: u64,

    /// Seconds between monitoring events per session
    #[serde(default = "default_cadence_secs")]
    pub monitor_cadence_secs: u64,

    /// Outbound channel capacity per connection
    #[serde(default = "default_outbound_capacity")]
    pub outbound_capacity: usize,
}

fn default_gemini_endpoint() -> String {
    verity_llm::gemini::DEFAULT_ENDPOINT.to_string()
}

fn default_gemini_model() -> String {
    verity_llm::gemini::DEFAULT_MODEL.to_string()
}

/// Default per-request timeout: 30 seconds
fn default_timeout_secs() -> u64 {
    30
}

/// Default retry budget per request
fn default_max_retries() -> u32 {
    3
}

/// Default heartbeat: 30 seconds
fn default_heartbeat_secs() -> u64 {
    30
}

/// Default monitoring cadence: 3 seconds
fn default_cadence_secs() -> u64 {
    3
}

fn default_outbound_capacity() -> usize {
    32
}

impl Default for GeminiConfig {
    fn default() -> Self {
        GeminiConfig {
            endpoint: default_gemini_endpoint(),
            model: default_gemini_model(),
            api_key: String::new(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        RealtimeConfig {
            heartbeat_interval_secs: default_heartbeat_secs(),
            monitor_cadence_secs: default_cadence_secs(),
            outbound_capacity: default_outbound_capacity(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8080,
            gemini: GeminiConfig::default(),
            realtime: RealtimeConfig::default(),
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_address, "127.0.0.1");
        assert_eq!(config.bind_port, 8080);
        assert_eq!(config.gemini.model, "gemini-2.0-flash");
        assert_eq!(config.gemini.timeout_secs, 30);
        assert_eq!(config.gemini.max_retries, 3);
        assert_eq!(config.realtime.heartbeat_interval_secs, 30);
        assert_eq!(config.realtime.monitor_cadence_secs, 3);
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig::default_test_config();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
            bind_address = "0.0.0.0"
            bind_port = 9000

            [gemini]
            model = "gemini-2.5-pro"
            api_key = "test-key"
            timeout_secs = 10

            [realtime]
            heartbeat_interval_secs = 15
            monitor_cadence_secs = 5
            outbound_capacity = 64
        "#;

        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.bind_port, 9000);
        assert_eq!(config.gemini.model, "gemini-2.5-pro");
        assert_eq!(config.gemini.api_key, "test-key");
        assert_eq!(config.gemini.timeout_secs, 10);
        assert_eq!(config.gemini.max_retries, 3);
        assert_eq!(config.realtime.heartbeat_interval_secs, 15);
        assert_eq!(config.realtime.monitor_cadence_secs, 5);
        assert_eq!(config.realtime.outbound_capacity, 64);
    }

    #[test]
    fn test_sections_are_optional() {
        let toml = r#"
            bind_address = "127.0.0.1"
            bind_port = 8080
        "#;
        let config: ServerConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.gemini.endpoint, verity_llm::gemini::DEFAULT_ENDPOINT);
        assert_eq!(config.realtime.outbound_capacity, 32);
    }
}
