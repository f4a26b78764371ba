//! Configuration management for the email trust API
//!
//! Configuration is layered with figment: built-in defaults, an optional
//! `Config.toml`, `EMAIL_TRUST_`-prefixed environment variables (nested keys
//! separated by `__`), and finally the bare `PORT` variable.

use email_trust_core::AnalyzerConfig;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub observability: ObservabilityConfig,
    pub security: SecurityConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Time in-flight requests get to finish after a shutdown signal
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8081,
            shutdown_timeout_secs: 5,
        }
    }
}

/// Outbound services used by the analyzer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// DNS-over-HTTPS JSON endpoint
    pub doh_endpoint: String,
    /// IP geolocation endpoint
    pub geo_endpoint: String,
    /// Timeout for each outbound request in seconds
    pub request_timeout_secs: u64,
    /// User-Agent for outbound requests
    pub user_agent: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        let analyzer = AnalyzerConfig::default();
        Self {
            doh_endpoint: analyzer.doh_endpoint,
            geo_endpoint: analyzer.geo_endpoint,
            request_timeout_secs: analyzer.request_timeout_ms / 1000,
            user_agent: analyzer.user_agent,
        }
    }
}

impl UpstreamConfig {
    pub fn analyzer_config(&self) -> AnalyzerConfig {
        AnalyzerConfig {
            doh_endpoint: self.doh_endpoint.clone(),
            geo_endpoint: self.geo_endpoint.clone(),
            request_timeout_ms: self.request_timeout_secs.saturating_mul(1000),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Enable JSON structured logging
    pub json_logs: bool,
    /// Log level filter used when `RUST_LOG` is unset
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            json_logs: false,
            log_level: "info".to_string(),
        }
    }
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Enable CORS for browser clients
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size_bytes: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            max_body_size_bytes: 4096,
        }
    }
}

/// Load application configuration from defaults, `Config.toml` and the environment
pub fn load_config() -> Result<AppConfig, figment::Error> {
    Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file("Config.toml"))
        .merge(Env::prefixed("EMAIL_TRUST_").split("__"))
        .merge(Env::raw().only(&["PORT"]).map(|_| "server.port".into()))
        .extract()
}
