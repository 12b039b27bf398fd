use std::env;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host (default: 0.0.0.0)
    pub host: String,
    /// Server port (default: 8080)
    pub port: u16,
    pub upstream: UpstreamConfig,
    pub cors: CorsConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Inference service base URL (default: http://localhost:8000)
    pub base_url: String,
    /// Optional end-to-end timeout for upstream requests, in seconds.
    /// Streaming generations can run for minutes, so no timeout is imposed
    /// unless configured; the transport default applies when unset.
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    /// Allowed CORS origin, or `*` for any (default: *)
    pub origin: String,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level (default: info)
    pub level: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidPort)?,
            upstream: UpstreamConfig {
                base_url: env::var("AI_API_URL")
                    .unwrap_or_else(|_| "http://localhost:8000".to_string()),
                timeout_secs: match env::var("UPSTREAM_TIMEOUT_SECS") {
                    Ok(value) => Some(value.parse().map_err(|_| ConfigError::InvalidTimeout)?),
                    Err(_) => None,
                },
            },
            cors: CorsConfig {
                origin: env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            },
            logging: LoggingConfig {
                level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            },
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid port number")]
    InvalidPort,
    #[error("Invalid upstream timeout")]
    InvalidTimeout,
}
