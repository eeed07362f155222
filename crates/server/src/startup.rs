// One-shot directory initialization before the listener starts.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::store::history::HISTORY_DIR;

/// Create the workspace root, its `history/` subdirectory, and the config
/// file's parent directory. Runs once at boot; a failure here aborts
/// startup.
pub fn initialize(workspace_dir: &Path, config_path: &Path) -> Result<()> {
    fs::create_dir_all(workspace_dir).with_context(|| {
        format!("failed to create workspace directory `{}`", workspace_dir.display())
    })?;

    let history_dir = workspace_dir.join(HISTORY_DIR);
    fs::create_dir_all(&history_dir).with_context(|| {
        format!("failed to create history directory `{}`", history_dir.display())
    })?;

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory `{}`", parent.display())
            })?;
        }
    }

    ensure_shared_dir(workspace_dir);
    ensure_shared_dir(&history_dir);

    info!(
        workspace = %workspace_dir.display(),
        config = %config_path.display(),
        "workspace initialized"
    );
    Ok(())
}

// The editor's workspace must stay readable by deployment tooling running
// as other users, so directories get 0o755 rather than owner-only modes.
// Best-effort: an unsupported filesystem only logs a warning.
fn ensure_shared_dir(path: &Path) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let metadata = match fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(error) => {
                tracing::warn!(path = %path.display(), error = %error, "failed to stat directory");
                return;
            }
        };

        let mode = metadata.permissions().mode() & 0o777;
        if mode != 0o755 {
            if let Err(error) = fs::set_permissions(path, fs::Permissions::from_mode(0o755)) {
                tracing::warn!(
                    path = %path.display(),
                    error = %error,
                    "failed to set directory mode"
                );
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }
}
