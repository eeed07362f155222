// File and directory handlers. Every client path is confined to the live
// workspace root by the content store before any filesystem call.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;
use vellum_common::types::{FileNode, HistorySnapshot};

use super::AppState;
use crate::{error::ApiError, store::tree};

#[derive(Deserialize)]
pub struct ListQuery {
    search: Option<String>,
}

#[derive(Serialize)]
pub struct FileContentResponse {
    content: String,
}

#[derive(Deserialize)]
pub struct SaveFileRequest {
    content: String,
}

#[derive(Serialize)]
pub struct SaveFileResponse {
    message: &'static str,
    history_file: Option<HistorySnapshot>,
}

#[derive(Serialize)]
pub struct MessageResponse {
    message: &'static str,
}

#[derive(Deserialize)]
pub struct DirectoryRequest {
    path: String,
}

#[derive(Deserialize)]
pub struct MoveRequest {
    source_path: String,
    target_path: String,
}

#[derive(Serialize)]
pub struct MoveResponse {
    message: &'static str,
    source: String,
    target: String,
}

/// `GET /api/files`: full tree, or a flat match list when `search` is set.
pub async fn list_files(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<FileNode>>, ApiError> {
    let root = state.workspace.current();
    let search = query.search.unwrap_or_default();

    let nodes = if search.is_empty() {
        tree::list(&root)
    } else {
        tree::search(&root, &search)
    }
    .map_err(ApiError::internal)?;

    Ok(Json(nodes))
}

/// `GET /api/file/{path}`: raw text content.
pub async fn read_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<FileContentResponse>, ApiError> {
    let root = state.workspace.current();
    let content = state.content.read(&root, &path)?;
    Ok(Json(FileContentResponse { content }))
}

/// `POST /api/file/{path}`: validate, snapshot, overwrite.
pub async fn save_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Json(request): Json<SaveFileRequest>,
) -> Result<Json<SaveFileResponse>, ApiError> {
    let root = state.workspace.current();
    let outcome = state.content.write(&root, &path, &request.content)?;

    info!(path = %path, "file saved");
    Ok(Json(SaveFileResponse {
        message: "file saved",
        history_file: outcome.into_recorded(),
    }))
}

/// `DELETE /api/file/{path}`: file, empty directory, or directory tree.
pub async fn delete_file(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let root = state.workspace.current();
    state.content.delete(&root, &path)?;

    info!(path = %path, "file deleted");
    Ok(Json(MessageResponse { message: "deleted" }))
}

/// `POST /api/directory`: idempotent, creates intermediate segments.
pub async fn create_directory(
    State(state): State<AppState>,
    Json(request): Json<DirectoryRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let root = state.workspace.current();
    state.content.create_dir(&root, &request.path)?;

    Ok(Json(MessageResponse { message: "directory created" }))
}

/// `POST /api/file/move`: both endpoints confined; no history snapshot.
pub async fn move_file(
    State(state): State<AppState>,
    Json(request): Json<MoveRequest>,
) -> Result<Json<MoveResponse>, ApiError> {
    let root = state.workspace.current();
    state.content.rename(&root, &request.source_path, &request.target_path)?;

    info!(source = %request.source_path, target = %request.target_path, "file moved");
    Ok(Json(MoveResponse {
        message: "file moved",
        source: request.source_path,
        target: request.target_path,
    }))
}
