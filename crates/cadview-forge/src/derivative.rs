//! Model Derivative: translation jobs, manifests and metadata.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde_json::Value;
use tracing::{debug, info};

use crate::client::ForgeClient;
use crate::error::{ForgeError, ForgeResult};
use crate::types::{JobRequest, JobResponse, Manifest, TranslationJob};

/// Header asking Forge to re-translate even when derivatives already exist.
const FORCE_HEADER: &str = "x-ads-force";

/// Encode an object id as a design URN (base64url, no padding).
pub fn encode_urn(object_id: &str) -> String {
    URL_SAFE_NO_PAD.encode(object_id.as_bytes())
}

/// Decode a design URN back to the object id.
///
/// Trailing `=` padding is tolerated so URNs produced by other tools work too.
pub fn decode_urn(urn: &str) -> Option<String> {
    let bytes = URL_SAFE_NO_PAD.decode(urn.trim_end_matches('=')).ok()?;
    String::from_utf8(bytes).ok()
}

/// Cheap syntactic check before a URN is spliced into an upstream path.
pub fn is_valid_urn(urn: &str) -> bool {
    let body = urn.trim_end_matches('=');
    !body.is_empty()
        && body
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

impl ForgeClient {
    /// Submit a translation job for an uploaded object.
    ///
    /// Returns as soon as Forge accepts the job; progress is observed through
    /// [`ForgeClient::manifest`].
    pub async fn translate(&self, object_id: &str) -> ForgeResult<TranslationJob> {
        let urn = encode_urn(object_id);
        let url = self.url("/modelderivative/v2/designdata/job");
        let body = JobRequest::for_urn(urn.clone(), self.config.output_format.clone());

        info!(urn = %urn, format = %self.config.output_format, "Submitting translation job");

        self.execute_request("translate", async {
            let token = self.access_token().await?;
            let response = self
                .http
                .post(&url)
                .bearer_auth(&token.value)
                .header(FORCE_HEADER, "true")
                .json(&body)
                .send()
                .await?;

            if !response.status().is_success() {
                let (status, body) = Self::error_parts(response).await;
                return Err(ForgeError::Translation { status, body });
            }

            let job: JobResponse = response.json().await?;
            debug!(urn = %urn, "Translation job accepted");

            Ok(TranslationJob {
                urn: urn.clone(),
                derivatives: job.derivatives,
            })
        })
        .await
    }

    /// Fetch the translation manifest for `urn`.
    pub async fn manifest(&self, urn: &str) -> ForgeResult<Manifest> {
        let url = self.url(&format!("/modelderivative/v2/designdata/{}/manifest", urn));

        self.execute_request("manifest", async {
            let token = self.access_token().await?;
            let response = self.http.get(&url).bearer_auth(&token.value).send().await?;

            if !response.status().is_success() {
                let (status, body) = Self::error_parts(response).await;
                return Err(ForgeError::Status { status, body });
            }

            Ok(response.json().await?)
        })
        .await
    }

    /// Fetch the model views metadata for `urn`, unparsed.
    pub async fn metadata(&self, urn: &str) -> ForgeResult<Value> {
        let url = self.url(&format!("/modelderivative/v2/designdata/{}/metadata", urn));

        self.execute_request("metadata", async {
            let token = self.access_token().await?;
            let response = self.http.get(&url).bearer_auth(&token.value).send().await?;

            if !response.status().is_success() {
                let (status, body) = Self::error_parts(response).await;
                return Err(ForgeError::Metadata { status, body });
            }

            Ok(response.json().await?)
        })
        .await
    }
}
