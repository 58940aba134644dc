//! CAD upload handler.
//!
//! Accepts a multipart `file` field, stores it in the Forge bucket and starts
//! a translation job. The caller keeps the returned URN and polls
//! `/api/status/{urn}`.

use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::formats;
use crate::metrics;
use crate::state::AppState;

/// Name of the multipart field carrying the file.
const FILE_FIELD: &str = "file";

/// Upload response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub urn: String,
    pub object_id: String,
    pub filename: String,
    pub size: u64,
    pub message: String,
}

struct IncomingFile {
    name: String,
    extension: String,
    data: Vec<u8>,
}

/// `POST /api/upload`
pub async fn upload_file(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let file = read_file_field(multipart, state.config.max_upload_size).await?;

    info!(file = %file.name, bytes = file.data.len(), "Processing upload");
    metrics::record_upload(&file.extension, file.data.len());

    let uploaded = state.forge.upload(file.data, &file.name).await?;
    let job = state.forge.translate(&uploaded.object_id).await?;

    info!(file = %file.name, urn = %job.urn, "Upload stored, translation started");

    Ok(Json(UploadResponse {
        success: true,
        urn: job.urn,
        object_id: uploaded.object_id,
        filename: file.name,
        size: uploaded.size,
        message: "File uploaded and translation started".to_string(),
    }))
}

/// Pull the `file` field out of the form, validating name and size.
async fn read_file_field(mut multipart: Multipart, max_size: usize) -> ApiResult<IncomingFile> {
    let too_large = || ApiError::PayloadTooLarge(max_size / (1024 * 1024));

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_size))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let name = match field.file_name() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => return Err(ApiError::bad_request("No file provided")),
        };

        let extension = formats::extension_of(&name);
        if !formats::is_supported(&extension) {
            let shown = if extension.is_empty() { "(none)" } else { extension.as_str() };
            return Err(ApiError::UnsupportedFormat(shown.to_string()));
        }

        let data = field.bytes().await.map_err(|e| multipart_error(e, max_size))?;
        if data.len() > max_size {
            return Err(too_large());
        }

        return Ok(IncomingFile {
            name,
            extension,
            data: data.to_vec(),
        });
    }

    Err(ApiError::bad_request("No file provided"))
}

fn multipart_error(err: MultipartError, max_size: usize) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(max_size / (1024 * 1024))
    } else {
        ApiError::bad_request(err.body_text())
    }
}
