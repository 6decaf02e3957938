//! Proto source discovery from configured glob patterns.
//!
//! Turns a project root plus the `proto_files` / `ignore_patterns` lists
//! into a deduplicated, lexicographically ordered set of absolute file
//! paths. The ordering is load-bearing: downstream compilation and schema
//! output must be reproducible across runs on the same inputs.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::ProjectConfig;
use crate::discovery::patterns::{glob_files, matches_ignore, validate_pattern};
use crate::error::ProjectError;

/// Resolve the configured source patterns into concrete proto files.
///
/// Each pattern contributes its matches to a union; a file matched by
/// multiple patterns appears once. Ignore patterns are applied to the
/// union, then the set is returned sorted by absolute path.
///
/// Any malformed pattern (source or ignore) fails the whole call with
/// `InvalidPatterns` naming every offender.
pub fn resolve_proto_files(
    project_root: &Path,
    config: &ProjectConfig,
) -> Result<Vec<PathBuf>, ProjectError> {
    let mut bad_patterns = Vec::new();
    for pattern in config.proto_files.iter().chain(&config.ignore_patterns) {
        if let Err(reason) = validate_pattern(pattern) {
            bad_patterns.push(format!("{pattern:?}: {reason}"));
        }
    }
    if !bad_patterns.is_empty() {
        return Err(ProjectError::InvalidPatterns {
            details: bad_patterns,
        });
    }

    let mut matched = BTreeSet::new();
    for pattern in &config.proto_files {
        for path in expand_pattern(project_root, pattern) {
            matched.insert(path);
        }
    }

    let before = matched.len();
    let files: Vec<PathBuf> = matched
        .into_iter()
        .filter(|path| {
            let rel = path.strip_prefix(project_root).unwrap_or(path);
            !matches_ignore(rel, &config.ignore_patterns)
        })
        .collect();

    debug!(
        matched = before,
        ignored = before - files.len(),
        "resolved proto files"
    );
    Ok(files)
}

/// Expand a single source pattern.
///
/// Patterns containing `**` are split at the first occurrence into a
/// base directory and a suffix; the tree under the base directory is
/// walked recursively and each regular file's base name is tested
/// against the suffix. Recursive patterns intentionally match on the
/// filename only, not the full relative path. A missing base directory
/// contributes zero matches.
///
/// Patterns without `**` go through a direct segmented filesystem glob.
/// Absolute patterns are used verbatim; relative ones are resolved from
/// the project root.
fn expand_pattern(project_root: &Path, pattern: &str) -> Vec<PathBuf> {
    let absolute = Path::new(pattern).is_absolute();

    if let Some(idx) = pattern.find("**") {
        let base_part = pattern[..idx].trim_end_matches('/');
        let suffix = pattern[idx + 2..].trim_start_matches('/');
        let base_dir = if absolute {
            PathBuf::from(base_part)
        } else {
            project_root.join(base_part)
        };
        if !base_dir.is_dir() {
            return Vec::new();
        }
        return walk_matching(&base_dir, suffix);
    }

    let full = if absolute {
        PathBuf::from(pattern)
    } else {
        project_root.join(pattern)
    };
    glob_files(&full)
}

/// Walk a directory tree, collecting regular files whose base name
/// matches `suffix`.
///
/// An empty suffix (pattern ended in a bare `**`) matches every file of
/// any extension. This deliberately differs from single-level matching,
/// where an empty pattern matches nothing: a trailing `**` reads as
/// "everything under this directory", and source patterns written that
/// way stay consistent with `tmp/**`-style ignore patterns.
fn walk_matching(base_dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let mut matches = Vec::new();
    for entry in WalkDir::new(base_dir)
        .follow_links(false)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if suffix.is_empty() || glob_match::glob_match(suffix, &name) {
            matches.push(entry.into_path());
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(proto_files: &[&str], ignore: &[&str]) -> ProjectConfig {
        ProjectConfig {
            proto_files: proto_files.iter().map(|s| s.to_string()).collect(),
            import_paths: Vec::new(),
            ignore_patterns: ignore.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, "syntax = \"proto3\";\n").unwrap();
    }

    #[test]
    fn test_union_and_dedup_across_patterns() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.proto");
        touch(dir.path(), "sub/b.proto");

        let files =
            resolve_proto_files(dir.path(), &config(&["*.proto", "**/*.proto"], &[])).unwrap();
        assert_eq!(
            files,
            vec![dir.path().join("a.proto"), dir.path().join("sub/b.proto")]
        );
    }

    #[test]
    fn test_recursive_pattern_matches_any_depth() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "proto/user.proto");
        touch(dir.path(), "proto/api/v1/order.proto");
        touch(dir.path(), "proto/readme.md");

        let files =
            resolve_proto_files(dir.path(), &config(&["proto/**/*.proto"], &[])).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("proto/api/v1/order.proto"),
                dir.path().join("proto/user.proto"),
            ]
        );
    }

    #[test]
    fn test_bare_recursive_pattern_matches_all_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "vendor/a.proto");
        touch(dir.path(), "vendor/deep/b.proto");
        std::fs::write(dir.path().join("vendor/notes.txt"), "").unwrap();

        let files = resolve_proto_files(dir.path(), &config(&["vendor/**"], &[])).unwrap();
        assert_eq!(
            files,
            vec![
                dir.path().join("vendor/a.proto"),
                dir.path().join("vendor/deep/b.proto"),
                dir.path().join("vendor/notes.txt"),
            ]
        );
    }

    #[test]
    fn test_missing_base_dir_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.proto");
        let files = resolve_proto_files(
            dir.path(),
            &config(&["*.proto", "missing/**/*.proto"], &[]),
        )
        .unwrap();
        assert_eq!(files, vec![dir.path().join("a.proto")]);
    }

    #[test]
    fn test_ignore_takes_precedence_over_source_match() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "user.proto");
        touch(dir.path(), "user_test.proto");

        let files = resolve_proto_files(
            dir.path(),
            &config(&["*.proto"], &["*_test.proto"]),
        )
        .unwrap();
        assert_eq!(files, vec![dir.path().join("user.proto")]);
    }

    #[test]
    fn test_directory_scoped_ignore_pattern() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "proto/user.proto");
        touch(dir.path(), "tmp/scratch.proto");

        let files = resolve_proto_files(
            dir.path(),
            &config(&["**/*.proto"], &["tmp/**"]),
        )
        .unwrap();
        assert_eq!(files, vec![dir.path().join("proto/user.proto")]);
    }

    #[test]
    fn test_malformed_pattern_fails_closed() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "a.proto");

        let err = resolve_proto_files(dir.path(), &config(&["*.proto", "[bad"], &[]))
            .unwrap_err();
        match err {
            ProjectError::InvalidPatterns { details } => {
                assert_eq!(details.len(), 1);
                assert!(details[0].contains("[bad"));
            }
            other => panic!("expected InvalidPatterns, got {other:?}"),
        }
    }

    #[test]
    fn test_absolute_pattern_used_verbatim() {
        let dir = TempDir::new().unwrap();
        let other = TempDir::new().unwrap();
        touch(other.path(), "shared.proto");

        let pattern = other.path().join("*.proto").to_string_lossy().into_owned();
        let files = resolve_proto_files(dir.path(), &config(&[&pattern], &[])).unwrap();
        assert_eq!(files, vec![other.path().join("shared.proto")]);
    }

    #[test]
    fn test_deterministic_ordering() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "z.proto");
        touch(dir.path(), "a.proto");
        touch(dir.path(), "m/inner.proto");

        let cfg = config(&["**/*.proto"], &[]);
        let first = resolve_proto_files(dir.path(), &cfg).unwrap();
        let second = resolve_proto_files(dir.path(), &cfg).unwrap();
        assert_eq!(first, second);
        let mut sorted = first.clone();
        sorted.sort();
        assert_eq!(first, sorted);
    }
}
