// Write-history snapshots and retention.
//
// Every successful content write drops a timestamped copy into
// `<root>/history/` and prunes that file's older copies beyond the
// retention count. Versioning is best-effort by design: a failed snapshot
// or prune is logged and folded into the returned outcome, never allowed
// to block the authoritative write.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Local;
use tracing::warn;
use vellum_common::types::HistorySnapshot;

/// Subdirectory of the workspace root holding snapshots.
pub const HISTORY_DIR: &str = "history";

/// Snapshots kept per original file.
pub const DEFAULT_RETENTION: usize = 5;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Result of the best-effort snapshot taken during a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotOutcome {
    Recorded(HistorySnapshot),
    Skipped { reason: String },
}

impl SnapshotOutcome {
    pub fn recorded(&self) -> Option<&HistorySnapshot> {
        match self {
            Self::Recorded(snapshot) => Some(snapshot),
            Self::Skipped { .. } => None,
        }
    }

    pub fn into_recorded(self) -> Option<HistorySnapshot> {
        match self {
            Self::Recorded(snapshot) => Some(snapshot),
            Self::Skipped { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HistoryStore {
    retention: usize,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self { retention: DEFAULT_RETENTION }
    }
}

impl HistoryStore {
    pub fn new(retention: usize) -> Self {
        Self { retention }
    }

    /// Snapshot `content` for `relative_path` (slash-separated, already
    /// confined to the root). Same-second saves of the same file overwrite
    /// each other's snapshot; accepted limitation of the naming scheme.
    pub fn snapshot(&self, root: &Path, relative_path: &str, content: &str) -> SnapshotOutcome {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        self.snapshot_at(root, relative_path, content, &timestamp)
    }

    /// Timestamp-injectable seam so retention tests can fabricate distinct
    /// versions without real clock seconds passing.
    pub fn snapshot_at(
        &self,
        root: &Path,
        relative_path: &str,
        content: &str,
        timestamp: &str,
    ) -> SnapshotOutcome {
        match self.write_snapshot(root, relative_path, content, timestamp) {
            Ok(snapshot) => SnapshotOutcome::Recorded(snapshot),
            Err(error) => {
                warn!(
                    path = relative_path,
                    error = %error,
                    "history snapshot failed; the save itself continues"
                );
                SnapshotOutcome::Skipped { reason: error.to_string() }
            }
        }
    }

    fn write_snapshot(
        &self,
        root: &Path,
        relative_path: &str,
        content: &str,
        timestamp: &str,
    ) -> io::Result<HistorySnapshot> {
        let file_name = relative_path.rsplit('/').next().unwrap_or(relative_path);
        let (base, ext) = split_extension(file_name);
        let snapshot_name = format!("{base}_{timestamp}{ext}");

        let history_dir = root.join(HISTORY_DIR);
        fs::create_dir_all(&history_dir)?;
        fs::write(history_dir.join(&snapshot_name), content)?;

        self.prune(&history_dir, base);

        Ok(HistorySnapshot {
            original_path: relative_path.to_string(),
            history_path: format!("{HISTORY_DIR}/{snapshot_name}"),
            name: snapshot_name,
            timestamp: timestamp.to_string(),
            content: None,
        })
    }

    // Deletes this file's snapshots beyond the retention count, newest
    // (by modification time) surviving. Failures are logged and swallowed;
    // a failed prune never blocks a save.
    fn prune(&self, history_dir: &Path, base: &str) {
        let mut entries = match snapshot_entries(history_dir) {
            Ok(entries) => entries,
            Err(error) => {
                warn!(error = %error, "failed to list history directory for pruning");
                return;
            }
        };

        entries.retain(|entry| entry.parsed.as_ref().is_some_and(|p| p.base == base));
        sort_newest_first(&mut entries);

        for stale in entries.iter().skip(self.retention) {
            if let Err(error) = fs::remove_file(&stale.path) {
                warn!(
                    snapshot = %stale.name,
                    error = %error,
                    "failed to delete stale history snapshot"
                );
            }
        }
    }

    /// List snapshots newest-first.
    ///
    /// With `file_path`, only that file's versions. Without, the single
    /// newest snapshot per distinct original file.
    pub fn list(&self, root: &Path, file_path: Option<&str>) -> io::Result<Vec<HistorySnapshot>> {
        let history_dir = root.join(HISTORY_DIR);
        if !history_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut entries = snapshot_entries(&history_dir)?;
        sort_newest_first(&mut entries);

        if let Some(file_path) = file_path {
            let file_name = file_path.rsplit('/').next().unwrap_or(file_path);
            let (base, _) = split_extension(file_name);
            entries.retain(|entry| entry.parsed.as_ref().is_some_and(|p| p.base == base));
        } else {
            let mut seen = std::collections::HashSet::new();
            entries.retain(|entry| {
                let key = entry
                    .parsed
                    .as_ref()
                    .map(|p| p.base.clone())
                    .unwrap_or_else(|| entry.name.clone());
                seen.insert(key)
            });
        }

        Ok(entries
            .into_iter()
            .map(|entry| {
                let (original_path, timestamp) = match &entry.parsed {
                    Some(parsed) => (parsed.base.clone(), parsed.timestamp.clone()),
                    None => (entry.name.clone(), String::new()),
                };
                HistorySnapshot {
                    original_path,
                    history_path: format!("{HISTORY_DIR}/{}", entry.name),
                    name: entry.name,
                    timestamp,
                    content: None,
                }
            })
            .collect())
    }
}

struct HistoryEntry {
    name: String,
    path: PathBuf,
    modified: SystemTime,
    parsed: Option<SnapshotName>,
}

fn snapshot_entries(history_dir: &Path) -> io::Result<Vec<HistoryEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(history_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        let modified = entry.metadata()?.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let parsed = parse_snapshot_name(&name);
        entries.push(HistoryEntry { name, path: entry.path(), modified, parsed });
    }
    Ok(entries)
}

// Modification time descending; name descending as a deterministic tiebreak
// (names embed the timestamp, so newer sorts later lexically).
fn sort_newest_first(entries: &mut [HistoryEntry]) {
    entries.sort_by(|left, right| {
        right.modified.cmp(&left.modified).then_with(|| right.name.cmp(&left.name))
    });
}

/// Parsed form of a stored snapshot name `{base}_{YYYYMMDD}_{HHMMSS}{ext}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotName {
    /// Original file name without its extension.
    pub base: String,
    /// `YYYYMMDD_HHMMSS`.
    pub timestamp: String,
    /// Extension including the leading dot, possibly empty.
    pub ext: String,
}

/// Split `name` at its final extension separator. A leading dot does not
/// count as a separator, so `.drone` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) if index > 0 => name.split_at(index),
        _ => (name, ""),
    }
}

/// Reconstruct `{base, timestamp}` from a stored snapshot name.
///
/// The trailing `_{8 digits}_{6 digits}` suffix is required exactly; this is
/// stricter than splitting on `_`, so bases containing underscores round-trip
/// unless they themselves end in a timestamp look-alike.
pub fn parse_snapshot_name(name: &str) -> Option<SnapshotName> {
    let (stem, ext) = split_extension(name);

    let mut segments = stem.rsplitn(3, '_');
    let time = segments.next()?;
    let date = segments.next()?;
    let base = segments.next()?;

    if base.is_empty() {
        return None;
    }
    if date.len() != 8 || !date.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if time.len() != 6 || !time.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(SnapshotName {
        base: base.to_string(),
        timestamp: format!("{date}_{time}"),
        ext: ext.to_string(),
    })
}
