//! OSS bucket provisioning.

use reqwest::StatusCode;
use tracing::{debug, info, warn};

use crate::client::ForgeClient;
use crate::error::{ForgeError, ForgeResult};
use crate::metrics::record_bucket_provision;
use crate::types::{BucketStatus, CreateBucketRequest, BUCKET_POLICY_TEMPORARY};

impl ForgeClient {
    /// Make sure the relay bucket exists.
    ///
    /// Never fails: a 409 on create counts as success, and every other
    /// failure is logged and returned as [`BucketStatus::Skipped`].
    pub async fn ensure_bucket_exists(&self) -> BucketStatus {
        let status = match self.provision_bucket().await {
            Ok(status) => status,
            Err(e) => {
                warn!(bucket = %self.bucket_key(), error = %e, "Bucket provisioning failed, continuing");
                BucketStatus::Skipped {
                    reason: e.to_string(),
                }
            }
        };
        record_bucket_provision(status.as_str());
        status
    }

    async fn provision_bucket(&self) -> ForgeResult<BucketStatus> {
        let bucket_key = self.bucket_key().to_string();
        let details_url = self.url(&format!(
            "/oss/v2/buckets/{}/details",
            urlencoding::encode(&bucket_key)
        ));
        let create_url = self.url("/oss/v2/buckets");

        self.execute_request("ensure_bucket", async {
            let token = self.access_token().await?;

            let response = self
                .http
                .get(&details_url)
                .bearer_auth(&token.value)
                .send()
                .await?;

            if response.status() == StatusCode::OK {
                debug!(bucket = %bucket_key, "Bucket already exists");
                return Ok(BucketStatus::Exists);
            }

            info!(bucket = %bucket_key, "Creating bucket");
            let body = CreateBucketRequest {
                bucket_key: &bucket_key,
                policy_key: BUCKET_POLICY_TEMPORARY,
            };
            let response = self
                .http
                .post(&create_url)
                .bearer_auth(&token.value)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            if status.is_success() {
                info!(bucket = %bucket_key, "Bucket created");
                return Ok(BucketStatus::Created);
            }

            let (status, body) = Self::error_parts(response).await;
            let err = ForgeError::Bucket { status, body };
            if err.is_conflict() {
                debug!(bucket = %bucket_key, "Bucket create returned conflict, treating as existing");
                return Ok(BucketStatus::AlreadyExists);
            }
            Err(err)
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use crate::test_support::{client_for, mount_token};
    use crate::BucketStatus;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_existing_bucket_is_noop() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/oss/v2/buckets/test-bucket/details"))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bucketKey": "test-bucket",
                "policyKey": "temporary"
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oss/v2/buckets"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.ensure_bucket_exists().await, BucketStatus::Exists);
    }

    #[tokio::test]
    async fn test_missing_bucket_created_with_temporary_policy() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/oss/v2/buckets/test-bucket/details"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oss/v2/buckets"))
            .and(body_json(serde_json::json!({
                "bucketKey": "test-bucket",
                "policyKey": "temporary"
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.ensure_bucket_exists().await, BucketStatus::Created);
    }

    #[tokio::test]
    async fn test_conflict_is_idempotent() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/oss/v2/buckets/test-bucket/details"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oss/v2/buckets"))
            .respond_with(ResponseTemplate::new(200))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oss/v2/buckets"))
            .respond_with(
                ResponseTemplate::new(409).set_body_string(r#"{"reason":"Bucket already exists"}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.ensure_bucket_exists().await, BucketStatus::Created);
        assert_eq!(client.ensure_bucket_exists().await, BucketStatus::AlreadyExists);
    }

    #[tokio::test]
    async fn test_other_failures_are_skipped() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/oss/v2/buckets/test-bucket/details"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/oss/v2/buckets"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        match client.ensure_bucket_exists().await {
            BucketStatus::Skipped { reason } => assert!(reason.contains("500")),
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_auth_failure_is_skipped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/authentication/v1/authenticate"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(matches!(
            client.ensure_bucket_exists().await,
            BucketStatus::Skipped { .. }
        ));
    }
}
