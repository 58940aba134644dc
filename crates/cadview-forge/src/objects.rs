//! Object upload.

use chrono::Utc;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tracing::info;

use crate::client::ForgeClient;
use crate::error::{ForgeError, ForgeResult};
use crate::types::{ObjectDetails, UploadedObject};

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Object key for an upload: `{timestamp_ms}_{sanitized name}`.
pub fn object_name(timestamp_ms: i64, original_name: &str) -> String {
    format!("{}_{}", timestamp_ms, sanitize_file_name(original_name))
}

impl ForgeClient {
    /// Upload `data` to the relay bucket under a fresh object name.
    ///
    /// The bucket is provisioned first; provisioning problems are logged and
    /// the PUT is attempted anyway.
    pub async fn upload(&self, data: Vec<u8>, original_name: &str) -> ForgeResult<UploadedObject> {
        let token = self.access_token().await?;
        self.ensure_bucket_exists().await;

        let name = object_name(Utc::now().timestamp_millis(), original_name);
        let bucket_key = self.bucket_key().to_string();
        let url = self.url(&format!(
            "/oss/v2/buckets/{}/objects/{}",
            urlencoding::encode(&bucket_key),
            urlencoding::encode(&name)
        ));
        let len = data.len();

        info!(file = %original_name, object = %name, bytes = len, "Uploading object");

        self.execute_request("upload_object", async {
            let response = self
                .http
                .put(&url)
                .bearer_auth(&token.value)
                .header(CONTENT_TYPE, "application/octet-stream")
                .header(CONTENT_LENGTH, len)
                .body(data)
                .send()
                .await?;

            if !response.status().is_success() {
                let (status, body) = Self::error_parts(response).await;
                return Err(ForgeError::Upload { status, body });
            }

            let details: ObjectDetails = response.json().await?;
            info!(object_id = %details.object_id, size = details.size, "Object uploaded");

            Ok(UploadedObject {
                object_id: details.object_id,
                object_key: details.object_key,
                bucket_key: bucket_key.clone(),
                size: details.size,
            })
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{client_for, mount_token};
    use wiremock::matchers::{body_bytes, header, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_sanitize_replaces_unsafe_chars() {
        assert_eq!(sanitize_file_name("My File#1.DWG"), "My_File_1.DWG");
        assert_eq!(sanitize_file_name("part-2.v3.stl"), "part-2.v3.stl");
        assert_eq!(sanitize_file_name("a/b\\c:d"), "a_b_c_d");
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(sanitize_file_name("pieza_ñ.step"), "pieza__.step");
    }

    #[test]
    fn test_object_name_format() {
        let name = object_name(1_700_000_000_123, "My File#1.DWG");
        assert_eq!(name, "1700000000123_My_File_1.DWG");

        let (ts, rest) = name.split_once('_').unwrap();
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(rest, "My_File_1.DWG");
    }

    #[tokio::test]
    async fn test_upload_puts_binary_payload() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/oss/v2/buckets/test-bucket/details"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path_regex(r"^/oss/v2/buckets/test-bucket/objects/\d+_part\.stl$"))
            .and(header("content-type", "application/octet-stream"))
            .and(header("content-length", "10"))
            .and(body_bytes(b"0123456789".to_vec()))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "bucketKey": "test-bucket",
                "objectId": "urn:adsk.objects:os.object:test-bucket/1_part.stl",
                "objectKey": "1_part.stl",
                "size": 10,
                "contentType": "application/octet-stream"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let uploaded = client.upload(b"0123456789".to_vec(), "part.stl").await.unwrap();

        assert_eq!(
            uploaded,
            UploadedObject {
                object_id: "urn:adsk.objects:os.object:test-bucket/1_part.stl".to_string(),
                object_key: "1_part.stl".to_string(),
                bucket_key: "test-bucket".to_string(),
                size: 10,
            }
        );
    }

    #[tokio::test]
    async fn test_upload_failure_carries_status_and_body() {
        let server = MockServer::start().await;
        mount_token(&server).await;
        Mock::given(method("GET"))
            .and(path("/oss/v2/buckets/test-bucket/details"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let client = client_for(&server);
        let err = client.upload(vec![1, 2, 3], "x.dwg").await.unwrap_err();
        assert!(matches!(
            err,
            ForgeError::Upload { status: 403, ref body } if body == "forbidden"
        ));
    }
}
