use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use vellum_common::{path::normalize_path, types::HistorySnapshot};

use super::AppState;
use crate::{error::ApiError, store::history::parse_snapshot_name};

#[derive(Deserialize)]
pub struct HistoryQuery {
    file_path: Option<String>,
}

#[derive(Serialize)]
pub struct SnapshotContentResponse {
    content: String,
    name: String,
    timestamp: String,
}

/// `GET /api/history`: all files' newest snapshots, or one file's full
/// (retained) history when `file_path` is given. Newest first.
pub async fn list_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<HistorySnapshot>>, ApiError> {
    let root = state.workspace.current();
    let snapshots = state
        .history
        .list(&root, query.file_path.as_deref())
        .map_err(ApiError::internal)?;
    Ok(Json(snapshots))
}

/// `GET /api/history/{path}`: one snapshot's text, confined to the root
/// like every other read.
pub async fn read_snapshot(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<SnapshotContentResponse>, ApiError> {
    let root = state.workspace.current();
    let normalized = normalize_path(&path)?;
    let content = state.content.read(&root, &normalized)?;

    let name = normalized.rsplit('/').next().unwrap_or(&normalized).to_string();
    let timestamp =
        parse_snapshot_name(&name).map(|parsed| parsed.timestamp).unwrap_or_default();

    Ok(Json(SnapshotContentResponse { content, name, timestamp }))
}
