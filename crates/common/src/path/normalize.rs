// Client path canonicalization: NFKC normalization, traversal rejection,
// 1024 char max.

use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

/// Maximum allowed path length in characters.
const MAX_PATH_CHARS: usize = 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("path is empty")]
    Empty,

    #[error("path exceeds maximum length of {MAX_PATH_CHARS} characters")]
    TooLong,

    #[error("path contains directory traversal component: {0}")]
    Traversal(String),

    #[error("path contains null byte")]
    NullByte,

    #[error("path contains invalid component: {0}")]
    InvalidComponent(String),

    #[error("path escapes the workspace root")]
    OutsideRoot,
}

/// Normalize a client-supplied workspace-relative path.
///
/// Rules:
/// - Apply Unicode NFKC normalization
/// - Convert all separators to `/`
/// - Collapse consecutive `/` into one
/// - Strip leading and trailing `/`
/// - Reject `.` and `..` path components (traversal)
/// - Reject null bytes
/// - Reject empty paths
/// - Enforce max 1024 character limit (after normalization)
///
/// The returned string always uses forward slashes; conversion to the host
/// separator happens only at the filesystem boundary in
/// [`super::resolve_under_root`].
pub fn normalize_path(input: &str) -> Result<String, PathError> {
    if input.is_empty() {
        return Err(PathError::Empty);
    }

    if input.contains('\0') {
        return Err(PathError::NullByte);
    }

    // Apply Unicode NFKC normalization
    let normalized: String = input.nfkc().collect();

    // Convert backslashes to forward slashes
    let unified = normalized.replace('\\', "/");

    // Split into components, filter empty segments (from consecutive slashes)
    let components: Vec<&str> = unified.split('/').filter(|s| !s.is_empty()).collect();

    if components.is_empty() {
        return Err(PathError::Empty);
    }

    // Validate each component
    for component in &components {
        if *component == "." {
            return Err(PathError::Traversal(".".to_string()));
        }
        if *component == ".." {
            return Err(PathError::Traversal("..".to_string()));
        }
        // Reject components that are only whitespace
        if component.trim().is_empty() {
            return Err(PathError::InvalidComponent(
                "(whitespace-only component)".to_string(),
            ));
        }
    }

    let result = components.join("/");

    if result.chars().count() > MAX_PATH_CHARS {
        return Err(PathError::TooLong);
    }

    Ok(result)
}
