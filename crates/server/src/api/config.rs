use std::path::PathBuf;

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::AppState;
use crate::{
    config::AppConfig,
    error::{ApiError, ErrorCode},
    workspace::to_wire,
};

#[derive(Serialize)]
pub struct WorkspacePathResponse {
    path: String,
}

#[derive(Deserialize)]
pub struct WorkspaceUpdateRequest {
    path: String,
}

#[derive(Serialize)]
pub struct WorkspaceUpdatedResponse {
    message: &'static str,
    path: String,
}

/// `GET /api/config/workspace`: the live root.
pub async fn get_workspace(State(state): State<AppState>) -> Json<WorkspacePathResponse> {
    Json(WorkspacePathResponse { path: to_wire(&state.workspace.current()) })
}

/// `POST /api/config/workspace`: persist the record and swap the live
/// handle in one step, so subsequent requests immediately resolve against
/// the new root.
pub async fn set_workspace(
    State(state): State<AppState>,
    Json(request): Json<WorkspaceUpdateRequest>,
) -> Result<Json<WorkspaceUpdatedResponse>, ApiError> {
    let candidate = PathBuf::from(request.path.trim());
    if !candidate.is_dir() {
        return Err(ApiError::new(
            ErrorCode::ValidationFailed,
            format!("directory does not exist: {}", request.path),
        ));
    }

    state
        .config_store
        .save(&AppConfig { workspace_dir: to_wire(&candidate) })
        .map_err(ApiError::internal)?;

    let previous = state.workspace.swap(candidate.clone());
    info!(
        previous = %previous.display(),
        current = %candidate.display(),
        "workspace root updated"
    );

    Ok(Json(WorkspaceUpdatedResponse {
        message: "workspace updated",
        path: to_wire(&candidate),
    }))
}
