//! API configuration.

use std::time::Duration;

/// Largest accepted CAD upload by default (50 MiB).
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 50 * 1024 * 1024;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// CORS origins
    pub cors_origins: Vec<String>,
    /// Request timeout
    pub request_timeout: Duration,
    /// Max accepted file size in bytes
    pub max_upload_size: usize,
    /// Environment (development/production)
    pub environment: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(120),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            environment: "development".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .or_else(|_| std::env::var("PORT"))
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3001),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_else(|_| vec!["*".to_string()]),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(120),
            ),
            max_upload_size: std::env::var("MAX_UPLOAD_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_UPLOAD_SIZE),
            environment: std::env::var("ENVIRONMENT")
                .or_else(|_| std::env::var("NODE_ENV"))
                .unwrap_or_else(|_| "development".to_string()),
        }
    }

    /// Check if running in production mode.
    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }

    /// Upload ceiling in whole megabytes, for messages.
    pub fn max_upload_mb(&self) -> usize {
        self.max_upload_size / (1024 * 1024)
    }
}
