// Core domain types shared across the vellum crates.
//
// Wire shapes are pinned: `FileNode` serializes `isDirectory` in camelCase
// and `HistorySnapshot` stays snake_case, matching what the browser editor
// already consumes.

use serde::{Deserialize, Serialize};

/// One entry in the workspace tree, built fresh on every listing request.
///
/// `path` is always relative to the workspace root and slash-separated
/// regardless of host OS.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileNode {
    pub path: String,
    pub name: String,
    #[serde(rename = "isDirectory")]
    pub is_directory: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FileNode>>,
}

impl FileNode {
    pub fn file(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into(), is_directory: false, children: None }
    }

    pub fn directory(
        path: impl Into<String>,
        name: impl Into<String>,
        children: Vec<FileNode>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            is_directory: true,
            children: Some(children),
        }
    }
}

/// A timestamped copy of a content file's text, kept for manual rollback.
///
/// Identity is the stored file name `{base}_{timestamp}{ext}` with
/// `timestamp` formatted `YYYYMMDD_HHMMSS` in local time. Immutable once
/// created; removed only by retention pruning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistorySnapshot {
    pub original_path: String,
    pub history_path: String,
    pub name: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}
