//! Forge client configuration.

use std::time::Duration;

use uuid::Uuid;

use crate::error::{ForgeError, ForgeResult};

/// Default Forge API host.
pub const DEFAULT_BASE_URL: &str = "https://developer.api.autodesk.com";

/// Scopes needed to manage the bucket, upload objects and read derivatives.
pub const DEFAULT_SCOPE: &str = "data:read data:write data:create bucket:create bucket:read";

/// Web viewer derivative format requested for every translation.
pub const DEFAULT_OUTPUT_FORMAT: &str = "svf2";

/// Prefix of the generated per-process bucket key.
pub const BUCKET_KEY_PREFIX: &str = "cad-viewer-bucket-";

/// Forge client configuration.
///
/// Resolved once at startup; the bucket key in particular stays fixed for the
/// lifetime of the process.
#[derive(Debug, Clone)]
pub struct ForgeConfig {
    /// OAuth client id
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Space separated OAuth scopes
    pub scope: String,
    /// API host, without trailing slash
    pub base_url: String,
    /// OSS bucket holding uploaded models
    pub bucket_key: String,
    /// Derivative output format
    pub output_format: String,
    /// Request timeout
    pub timeout: Duration,
    /// Connect timeout
    pub connect_timeout: Duration,
}

impl ForgeConfig {
    /// Create a config with default endpoints and a freshly generated bucket key.
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            scope: DEFAULT_SCOPE.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            bucket_key: generate_bucket_key(),
            output_format: DEFAULT_OUTPUT_FORMAT.to_string(),
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(5),
        }
    }

    /// Point the client at another host (tests, proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_bucket_key(mut self, bucket_key: impl Into<String>) -> Self {
        self.bucket_key = bucket_key.into();
        self
    }

    /// Create config from environment variables.
    pub fn from_env() -> ForgeResult<Self> {
        let client_id = required_env("FORGE_CLIENT_ID")?;
        let client_secret = required_env("FORGE_CLIENT_SECRET")?;

        let mut config = Self::new(client_id, client_secret);

        if let Ok(scope) = std::env::var("FORGE_SCOPE") {
            if !scope.trim().is_empty() {
                config.scope = scope;
            }
        }

        if let Ok(base_url) = std::env::var("FORGE_BASE_URL") {
            if !base_url.trim().is_empty() {
                config = config.with_base_url(base_url.trim());
            }
        }

        if let Ok(bucket_key) = std::env::var("FORGE_BUCKET_KEY") {
            if !bucket_key.is_empty() {
                validate_bucket_key(&bucket_key)?;
                config.bucket_key = bucket_key;
            }
        }

        if let Ok(format) = std::env::var("FORGE_OUTPUT_FORMAT") {
            if !format.is_empty() {
                config.output_format = format;
            }
        }

        config.timeout = Duration::from_secs(env_secs("FORGE_TIMEOUT_SECS", 60));
        config.connect_timeout = Duration::from_secs(env_secs("FORGE_CONNECT_TIMEOUT_SECS", 5));

        Ok(config)
    }
}

fn required_env(name: &str) -> ForgeResult<String> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        Ok(_) => Err(ForgeError::config(format!("{} cannot be empty", name))),
        Err(_) => Err(ForgeError::config(format!("{} must be set to access Forge", name))),
    }
}

fn env_secs(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Generate `cad-viewer-bucket-<16 lowercase hex chars>`.
pub fn generate_bucket_key() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}{}", BUCKET_KEY_PREFIX, &suffix[..16])
}

/// OSS bucket keys are 3-128 chars of `[-_.a-z0-9]`.
fn validate_bucket_key(key: &str) -> ForgeResult<()> {
    let valid_len = (3..=128).contains(&key.len());
    let valid_chars = key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '_' | '.'));

    if valid_len && valid_chars {
        Ok(())
    } else {
        Err(ForgeError::config(format!(
            "FORGE_BUCKET_KEY '{}' must be 3-128 characters of [-_.a-z0-9]",
            key
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_bucket_key_shape() {
        let key = generate_bucket_key();
        let suffix = key.strip_prefix(BUCKET_KEY_PREFIX).unwrap();
        assert_eq!(suffix.len(), 16);
        assert!(suffix.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert!(validate_bucket_key(&key).is_ok());
    }

    #[test]
    fn test_generated_bucket_keys_differ() {
        assert_ne!(generate_bucket_key(), generate_bucket_key());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = ForgeConfig::new("id", "secret").with_base_url("http://localhost:9000/");
        assert_eq!(config.base_url, "http://localhost:9000");
    }

    #[test]
    fn test_bucket_key_validation() {
        assert!(validate_bucket_key("my-bucket.v1_x").is_ok());
        assert!(validate_bucket_key("ab").is_err());
        assert!(validate_bucket_key("Upper-Case").is_err());
        assert!(validate_bucket_key("has space").is_err());
    }
}
