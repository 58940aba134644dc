//! Autodesk Forge REST client.
//!
//! This crate provides:
//! - Two-legged OAuth token caching with a refresh margin
//! - Idempotent provisioning of the relay's OSS bucket
//! - Binary object upload with deterministic, sanitized object names
//! - Model Derivative translation jobs, manifests and metadata

mod bucket;
pub mod client;
pub mod config;
pub mod derivative;
pub mod error;
pub mod metrics;
pub mod objects;
pub mod token_cache;
pub mod types;


pub use client::ForgeClient;
pub use config::ForgeConfig;
pub use derivative::{decode_urn, encode_urn, is_valid_urn};
pub use error::{ForgeError, ForgeResult};
pub use objects::{object_name, sanitize_file_name};
pub use token_cache::{AccessToken, TokenCache};
pub use types::{BucketStatus, Manifest, TranslationJob, UploadedObject};

#[cfg(test)]
pub(crate) mod test_support {
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::{ForgeClient, ForgeConfig};

    /// Client pointed at `server` with a fixed bucket key.
    pub fn client_for(server: &MockServer) -> ForgeClient {
        let config = ForgeConfig::new("test-id", "test-secret")
            .with_base_url(server.uri())
            .with_bucket_key("test-bucket");
        ForgeClient::new(config).unwrap()
    }

    /// Answer token exchanges with `test-token`.
    pub async fn mount_token(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/authentication/v1/authenticate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "test-token",
                "token_type": "Bearer",
                "expires_in": 3599
            })))
            .mount(server)
            .await;
    }
}
