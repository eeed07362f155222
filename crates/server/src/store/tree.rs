// Workspace tree enumeration.
//
// Both operations read only from the pre-validated workspace root; client
// paths never reach this module. Trees are built fresh per request, never
// cached.

use std::fs;
use std::io;
use std::path::Path;

use vellum_common::types::FileNode;

use super::is_content_file;

/// Full recursive listing: every subdirectory appears (with its own
/// recursively-built children); only recognized content files appear. Other
/// files are silently omitted.
///
/// Sort order at every level: directories before files, then
/// case-insensitive name.
pub fn list(root: &Path) -> io::Result<Vec<FileNode>> {
    list_dir(root, "")
}

fn list_dir(dir: &Path, relative_prefix: &str) -> io::Result<Vec<FileNode>> {
    let mut nodes = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = join_relative(relative_prefix, &name);
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            let children = list_dir(&entry.path(), &relative)?;
            nodes.push(FileNode::directory(relative, name, children));
        } else if file_type.is_file() && is_content_file(&name) {
            nodes.push(FileNode::file(relative, name));
        }
    }

    sort_nodes(&mut nodes);
    Ok(nodes)
}

/// Search: walk the entire tree (no depth limit, directories never pruned),
/// case-insensitive substring match against file names only. Returns a flat
/// list with no directory entries and no children.
pub fn search(root: &Path, query: &str) -> io::Result<Vec<FileNode>> {
    let needle = query.to_lowercase();
    let mut matches = Vec::new();
    search_dir(root, "", &needle, &mut matches)?;
    Ok(matches)
}

fn search_dir(
    dir: &Path,
    relative_prefix: &str,
    needle: &str,
    matches: &mut Vec<FileNode>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let relative = join_relative(relative_prefix, &name);
        let file_type = entry.file_type()?;

        if file_type.is_dir() {
            search_dir(&entry.path(), &relative, needle, matches)?;
        } else if file_type.is_file()
            && is_content_file(&name)
            && name.to_lowercase().contains(needle)
        {
            matches.push(FileNode::file(relative, name));
        }
    }

    Ok(())
}

// Relative paths are built with forward slashes on every host OS.
fn join_relative(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

fn sort_nodes(nodes: &mut [FileNode]) {
    nodes.sort_by(|left, right| {
        right
            .is_directory
            .cmp(&left.is_directory)
            .then_with(|| left.name.to_lowercase().cmp(&right.name.to_lowercase()))
    });
}
