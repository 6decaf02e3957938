//! Import root resolution.
//!
//! Protobuf compilers resolve files by import-root-relative path, not by
//! absolute path: a file compiled as `api/v1/user.proto` is only importable
//! as `import "api/v1/user.proto"`. This module normalizes the configured
//! import search paths into absolute directories and re-expresses every
//! discovered source file relative to the first root that contains it.

use std::path::{Path, PathBuf};

use crate::error::ProjectError;

/// Normalize configured import paths into absolute root directories.
///
/// Absolute entries are used as-is; relative entries are joined with the
/// project root. An empty configuration falls back to the project root
/// itself, so every discovered file has a candidate home. Duplicates are
/// dropped while preserving configured order, since the first matching
/// root wins during relativization.
pub fn resolve_import_roots(project_root: &Path, import_paths: &[String]) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    for entry in import_paths {
        let path = Path::new(entry);
        let abs = if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_root.join(path)
        };
        if !roots.contains(&abs) {
            roots.push(abs);
        }
    }
    if roots.is_empty() {
        roots.push(project_root.to_path_buf());
    }
    roots
}

/// Re-express each source file relative to its home import root.
///
/// Roots are tried in configured order; the first one the file sits under
/// (no upward `..` escape) is selected. Separators are normalized to `/`,
/// matching the path form protobuf `import` statements use. A file under
/// no root is a hard `ImportUnresolved` error naming the file and every
/// attempted root; silently dropping it would yield an artifact missing
/// expected declarations.
pub fn relativize_sources(
    files: &[PathBuf],
    roots: &[PathBuf],
) -> Result<Vec<String>, ProjectError> {
    files
        .iter()
        .map(|file| {
            roots
                .iter()
                .find_map(|root| file.strip_prefix(root).ok())
                .map(to_import_path)
                .ok_or_else(|| ProjectError::ImportUnresolved {
                    file: file.clone(),
                    roots: roots.to_vec(),
                })
        })
        .collect()
}

/// Render a root-relative path with `/` separators.
fn to_import_path(rel: &Path) -> String {
    rel.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
