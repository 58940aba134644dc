//! Token caching for Forge authentication.
//!
//! Provides a thread-safe, async-aware token cache with:
//! - Refresh margin to avoid token expiry during requests
//! - Single-flight pattern to prevent thundering herd on refresh
//! - No partial updates: a failed exchange leaves the cache as it was

use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::config::ForgeConfig;
use crate::error::{ForgeError, ForgeResult};
use crate::metrics::{record_request, record_token_refresh};

// =============================================================================
// Constants
// =============================================================================

/// Refresh margin: treat tokens as expired 60 seconds early.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Path of the two-legged authentication endpoint.
const AUTHENTICATE_PATH: &str = "/authentication/v1/authenticate";

// =============================================================================
// Types
// =============================================================================

/// An access token together with the instant it stops being handed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Build a token from an exchange response received at `now`.
    ///
    /// The refresh margin is subtracted here, so `expires_at` is the moment
    /// the cache stops reusing the token.
    pub fn from_ttl(value: impl Into<String>, expires_in_secs: i64, now: DateTime<Utc>) -> Self {
        Self {
            value: value.into(),
            expires_at: now + Duration::seconds(expires_in_secs - TOKEN_REFRESH_MARGIN_SECS),
        }
    }

    /// Check if token is still valid at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    /// Whole seconds left before the cache refreshes this token.
    pub fn remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

// =============================================================================
// Token Cache
// =============================================================================

/// Thread-safe token cache with single-flight refresh.
pub struct TokenCache {
    http: Client,
    auth_url: String,
    client_id: String,
    client_secret: String,
    scope: String,
    cache: RwLock<Option<AccessToken>>,
}

impl TokenCache {
    /// Create a new, empty token cache.
    pub fn new(http: Client, config: &ForgeConfig) -> Self {
        Self {
            http,
            auth_url: format!("{}{}", config.base_url, AUTHENTICATE_PATH),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            scope: config.scope.clone(),
            cache: RwLock::new(None),
        }
    }

    /// Currently cached token, valid or not.
    #[cfg(test)]
    pub(crate) async fn cached(&self) -> Option<AccessToken> {
        self.cache.read().await.clone()
    }

    /// Get a valid access token, refreshing if necessary.
    ///
    /// - Fast path: return cached token if still valid
    /// - Slow path: acquire write lock and refresh (double-check first)
    pub async fn get_token(&self) -> ForgeResult<AccessToken> {
        // Fast path: check read lock first
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref() {
                if cached.is_valid_at(Utc::now()) {
                    return Ok(cached.clone());
                }
            }
        }

        // Slow path: acquire write lock and refresh
        let mut cache = self.cache.write().await;

        // Double-check: another task may have refreshed while we waited
        if let Some(cached) = cache.as_ref() {
            if cached.is_valid_at(Utc::now()) {
                return Ok(cached.clone());
            }
        }

        let token = self.exchange().await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    /// Perform the client-credentials exchange.
    async fn exchange(&self) -> ForgeResult<AccessToken> {
        info!("Requesting new Forge access token");
        record_token_refresh();

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("grant_type", "client_credentials"),
            ("scope", self.scope.as_str()),
        ];

        let start = Instant::now();
        let response = self.http.post(&self.auth_url).form(&params).send().await?;
        let status = response.status();
        record_request("authenticate", status.as_u16(), start.elapsed().as_millis() as f64);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ForgeError::Authentication {
                status: status.as_u16(),
                body,
            });
        }

        let body: TokenResponse = response.json().await?;
        let token = AccessToken::from_ttl(body.access_token, body.expires_in, Utc::now());

        debug!(expires_at = %token.expires_at, "Refreshed Forge access token");
        Ok(token)
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, token: AccessToken) {
        *self.cache.write().await = Some(token);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn cache_for(server: &MockServer) -> TokenCache {
        let config = ForgeConfig::new("test-id", "test-secret").with_base_url(server.uri());
        TokenCache::new(Client::new(), &config)
    }

    #[test]
    fn test_token_refresh_margin() {
        assert_eq!(TOKEN_REFRESH_MARGIN_SECS, 60);
    }

    #[test]
    fn test_expiry_subtracts_margin() {
        let now = Utc::now();
        let token = AccessToken::from_ttl("abc", 3599, now);
        assert_eq!(token.expires_at, now + Duration::milliseconds(3_599_000 - 60_000));
        assert!(token.is_valid_at(now));
        assert!(!token.is_valid_at(token.expires_at));
        assert_eq!(token.remaining_secs(now), 3539);
    }

    #[test]
    fn test_short_ttl_is_already_expired() {
        let now = Utc::now();
        let token = AccessToken::from_ttl("abc", 30, now);
        assert!(!token.is_valid_at(now));
        assert_eq!(token.remaining_secs(now), 0);
    }

    #[tokio::test]
    async fn test_cached_token_reused_without_network_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AUTHENTICATE_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        let seeded = AccessToken::from_ttl("cached-token", 3600, Utc::now());
        cache.seed(seeded.clone()).await;

        let token = cache.get_token().await.unwrap();
        assert_eq!(token, seeded);
    }

    #[tokio::test]
    async fn test_absent_token_exchanged_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AUTHENTICATE_PATH))
            .and(body_string_contains("grant_type=client_credentials"))
            .and(body_string_contains("client_id=test-id"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "fresh-token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        let before = Utc::now();
        let first = cache.get_token().await.unwrap();
        let after = Utc::now();
        let second = cache.get_token().await.unwrap();

        assert_eq!(first.value, "fresh-token");
        assert_eq!(first, second);

        let ttl = Duration::seconds(3599 - TOKEN_REFRESH_MARGIN_SECS);
        assert!(first.expires_at >= before + ttl);
        assert!(first.expires_at <= after + ttl);
    }

    #[tokio::test]
    async fn test_expired_token_refreshed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AUTHENTICATE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "new-token",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        cache
            .seed(AccessToken {
                value: "old-token".to_string(),
                expires_at: Utc::now() - Duration::seconds(1),
            })
            .await;

        let token = cache.get_token().await.unwrap();
        assert_eq!(token.value, "new-token");
    }

    #[tokio::test]
    async fn test_failed_exchange_leaves_cache_unchanged() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(AUTHENTICATE_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid client"))
            .mount(&server)
            .await;

        let cache = cache_for(&server);
        let stale = AccessToken {
            value: "stale".to_string(),
            expires_at: Utc::now() - Duration::seconds(5),
        };
        cache.seed(stale.clone()).await;

        let err = cache.get_token().await.unwrap_err();
        match err {
            ForgeError::Authentication { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "invalid client");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(cache.cached().await, Some(stale));
    }
}
