//! Forge error types.

use thiserror::Error;

/// Result type for Forge operations.
pub type ForgeResult<T> = Result<T, ForgeError>;

/// Errors that can occur while talking to Forge.
///
/// The upstream variants carry the HTTP status and response body verbatim.
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("Authentication failed: {status} {body}")]
    Authentication { status: u16, body: String },

    #[error("Bucket provisioning failed: {status} {body}")]
    Bucket { status: u16, body: String },

    #[error("Upload failed: {status} {body}")]
    Upload { status: u16, body: String },

    #[error("Translation request failed: {status} {body}")]
    Translation { status: u16, body: String },

    #[error("Translation status check failed: {status} {body}")]
    Status { status: u16, body: String },

    #[error("Metadata request failed: {status} {body}")]
    Metadata { status: u16, body: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ForgeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Upstream HTTP status, if the error came from a non-success response.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ForgeError::Authentication { status, .. }
            | ForgeError::Bucket { status, .. }
            | ForgeError::Upload { status, .. }
            | ForgeError::Translation { status, .. }
            | ForgeError::Status { status, .. }
            | ForgeError::Metadata { status, .. } => Some(*status),
            ForgeError::Network(e) => e.status().map(|s| s.as_u16()),
            ForgeError::Config(_) | ForgeError::Json(_) => None,
        }
    }

    /// True when the upstream reported the resource as missing (HTTP 404).
    ///
    /// Polling callers use this to tell an unknown URN apart from a job that
    /// is still processing, which reads successfully with a pending status.
    pub fn is_not_found(&self) -> bool {
        self.http_status() == Some(404)
    }

    /// True for a 409 from Forge, which bucket creation treats as success.
    pub fn is_conflict(&self) -> bool {
        self.http_status() == Some(409)
    }
}
