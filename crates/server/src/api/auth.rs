use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::{ApiError, ErrorCode};

#[derive(Deserialize)]
pub struct LoginRequest {
    password: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    access_token: String,
    token_type: &'static str,
}

/// `POST /login`: exchange the shared password for a session token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    if request.password != *state.app_password {
        return Err(ApiError::new(ErrorCode::AuthInvalidToken, "incorrect password"));
    }

    let access_token = state.jwt.issue().map_err(ApiError::internal)?;
    Ok(Json(TokenResponse { access_token, token_type: "bearer" }))
}
