//! API error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cadview_forge::ForgeError;
use serde::Serialize;
use thiserror::Error;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("File too large. Maximum {0}MB.")]
    PayloadTooLarge(usize),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("{0}")]
    Forge(#[from] ForgeError),
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub(crate) fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            // An unknown URN must stay distinguishable from a job still in progress.
            ApiError::Forge(e @ (ForgeError::Status { .. } | ForgeError::Metadata { .. }))
                if e.is_not_found() =>
            {
                StatusCode::NOT_FOUND
            }
            ApiError::Forge(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Body served in place of any 500 when running in production.
pub(crate) fn masked_internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self, "Request failed");
        }

        (status, Json(ErrorResponse { error: self.to_string() })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::bad_request("x").status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::UnsupportedFormat(".txt".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::PayloadTooLarge(50).status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            ApiError::from(ForgeError::Upload { status: 500, body: "x".into() }).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_unknown_urn_maps_to_not_found() {
        let err = ApiError::from(ForgeError::Status { status: 404, body: String::new() });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::from(ForgeError::Metadata { status: 404, body: String::new() });
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);

        let err = ApiError::from(ForgeError::Status { status: 401, body: String::new() });
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_messages() {
        assert_eq!(ApiError::PayloadTooLarge(50).to_string(), "File too large. Maximum 50MB.");
        assert_eq!(
            ApiError::UnsupportedFormat(".txt".into()).to_string(),
            "Unsupported file format: .txt"
        );
    }
}
