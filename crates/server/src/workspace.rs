// The live workspace root, shared by every handler.
//
// Owned by the app state and swapped atomically when the operator changes
// the configured root, so no request ever observes a half-updated path and
// no restart is needed.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

#[derive(Debug)]
pub struct WorkspaceHandle {
    root: RwLock<PathBuf>,
}

impl WorkspaceHandle {
    pub fn new(root: PathBuf) -> Self {
        Self { root: RwLock::new(root) }
    }

    /// Snapshot of the current root. Each request resolves paths against one
    /// consistent root even if a swap lands mid-flight.
    pub fn current(&self) -> PathBuf {
        self.root.read().expect("workspace root lock should not be poisoned").clone()
    }

    /// Replace the root, returning the previous value.
    pub fn swap(&self, new_root: PathBuf) -> PathBuf {
        let mut guard =
            self.root.write().expect("workspace root lock should not be poisoned");
        std::mem::replace(&mut *guard, new_root)
    }
}

/// Render a root path for JSON responses: forward slashes on every host OS.
pub fn to_wire(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}
