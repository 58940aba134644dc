//! Forge wire types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// OSS
// =============================================================================

/// Retention policy for the relay bucket; objects expire after 24 hours.
pub const BUCKET_POLICY_TEMPORARY: &str = "temporary";

/// Body of `POST /oss/v2/buckets`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBucketRequest<'a> {
    pub bucket_key: &'a str,
    pub policy_key: &'a str,
}

/// Outcome of [`ForgeClient::ensure_bucket_exists`](crate::ForgeClient::ensure_bucket_exists).
///
/// Provisioning never fails the caller; an upstream error is reported as
/// `Skipped` so the upload can still be attempted against an existing bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BucketStatus {
    /// Details lookup succeeded.
    Exists,
    /// Bucket was created by this call.
    Created,
    /// Create returned 409, someone else created it first.
    AlreadyExists,
    /// Provisioning failed and was ignored.
    Skipped { reason: String },
}

impl BucketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BucketStatus::Exists => "exists",
            BucketStatus::Created => "created",
            BucketStatus::AlreadyExists => "already_exists",
            BucketStatus::Skipped { .. } => "skipped",
        }
    }
}

/// Response of `PUT /oss/v2/buckets/{key}/objects/{name}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ObjectDetails {
    pub object_id: String,
    pub object_key: String,
    #[serde(default)]
    pub size: u64,
}

/// An object stored in the relay bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedObject {
    pub object_id: String,
    pub object_key: String,
    pub bucket_key: String,
    pub size: u64,
}

// =============================================================================
// Model Derivative
// =============================================================================

/// Body of `POST /modelderivative/v2/designdata/job`.
#[derive(Debug, Serialize)]
pub struct JobRequest {
    pub input: JobInput,
    pub output: JobOutput,
}

#[derive(Debug, Serialize)]
pub struct JobInput {
    pub urn: String,
}

#[derive(Debug, Serialize)]
pub struct JobOutput {
    pub formats: Vec<OutputFormat>,
}

#[derive(Debug, Serialize)]
pub struct OutputFormat {
    #[serde(rename = "type")]
    pub kind: String,
    pub views: Vec<String>,
}

impl JobRequest {
    /// Request `format` with both 2d and 3d views for `urn`.
    pub fn for_urn(urn: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            input: JobInput { urn: urn.into() },
            output: JobOutput {
                formats: vec![OutputFormat {
                    kind: format.into(),
                    views: vec!["2d".to_string(), "3d".to_string()],
                }],
            },
        }
    }
}

/// Response of the job endpoint. Only `derivatives` is surfaced.
#[derive(Debug, Deserialize)]
pub(crate) struct JobResponse {
    #[serde(default)]
    pub derivatives: Vec<Value>,
}

/// A submitted translation job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationJob {
    pub urn: String,
    pub derivatives: Vec<Value>,
}

/// Translation manifest as reported by Forge.
///
/// Status moves `pending` → `inprogress` → `success` | `failed` | `timeout`;
/// the relay only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub progress: String,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub derivatives: Vec<Value>,
}

impl Manifest {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// No further transitions will happen.
    pub fn is_terminal(&self) -> bool {
        matches!(self.status.as_str(), "success" | "failed" | "timeout")
    }
}
