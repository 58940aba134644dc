//! Viewer token handler.

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::error::ApiResult;
use crate::state::AppState;

/// Token handed to the browser viewer.
#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the relay stops reusing this token.
    pub expires_in: i64,
}

/// `POST /api/auth/token`
pub async fn issue_token(State(state): State<AppState>) -> ApiResult<Json<TokenResponse>> {
    let token = state.forge.access_token().await?;

    Ok(Json(TokenResponse {
        expires_in: token.remaining_secs(Utc::now()),
        access_token: token.value,
        token_type: "Bearer".to_string(),
    }))
}
