//! Forge REST API client.
//!
//! Holds the pieces every operation shares:
//! - HTTP client tuning (pooling, timeouts)
//! - The process-wide token cache
//! - Observability (tracing spans, metrics)
//!
//! Operations live next to their endpoint family in `bucket`, `objects` and
//! `derivative`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{Client, Response};
use tracing::{info_span, Instrument};

use crate::config::ForgeConfig;
use crate::error::{ForgeError, ForgeResult};
use crate::metrics::record_request;
use crate::token_cache::{AccessToken, TokenCache};

/// Forge REST API client.
#[derive(Clone)]
pub struct ForgeClient {
    pub(crate) http: Client,
    pub(crate) config: Arc<ForgeConfig>,
    pub(crate) token_cache: Arc<TokenCache>,
}

impl ForgeClient {
    /// Create a new Forge client.
    pub fn new(config: ForgeConfig) -> ForgeResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10)
            .user_agent(concat!("cadview-forge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ForgeError::Network)?;

        let token_cache = Arc::new(TokenCache::new(http.clone(), &config));

        Ok(Self {
            http,
            config: Arc::new(config),
            token_cache,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> ForgeResult<Self> {
        let config = ForgeConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    /// Key of the bucket uploads go to.
    pub fn bucket_key(&self) -> &str {
        &self.config.bucket_key
    }

    /// Get an access token, exchanging credentials when the cached one expired.
    pub async fn access_token(&self) -> ForgeResult<AccessToken> {
        self.token_cache.get_token().await
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    // =========================================================================
    // Internal Helpers
    // =========================================================================

    /// Execute a request with tracing and metrics.
    pub(crate) async fn execute_request<T, F>(&self, operation: &str, fut: F) -> ForgeResult<T>
    where
        F: std::future::Future<Output = ForgeResult<T>>,
    {
        let span = info_span!("forge_request", operation = %operation);

        let start = Instant::now();
        let result = fut.instrument(span).await;
        let latency_ms = start.elapsed().as_millis() as f64;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.http_status().unwrap_or(500),
        };
        record_request(operation, status, latency_ms);

        result
    }

    /// Drain an error response into `(status, body)`.
    pub(crate) async fn error_parts(response: Response) -> (u16, String) {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        (status, body)
    }
}
