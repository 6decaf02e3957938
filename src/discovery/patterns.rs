//! Glob pattern validation and matching primitives.
//!
//! Matching itself is delegated to the `glob_match` crate (`*`, `?`,
//! character classes, brace groups, `**`). This module adds the two
//! pieces the crate does not provide: up-front syntax validation so a
//! malformed pattern fails resolution instead of silently matching
//! nothing, and a segmented filesystem glob for patterns without `**`.

use std::path::{Component, Path, PathBuf};

use glob_match::glob_match;

/// Check a pattern for malformed glob syntax.
///
/// `glob_match` never reports errors; an unclosed class or group simply
/// fails to match. Resolution is fail-closed, so unbalanced `[` or `{`
/// must be caught here and surfaced per-pattern.
pub fn validate_pattern(pattern: &str) -> Result<(), String> {
    let mut in_class = false;
    let mut group_depth = 0usize;
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                // Escapes the next character, nothing to balance.
                chars.next();
            }
            '[' if !in_class => in_class = true,
            ']' if in_class => in_class = false,
            '{' if !in_class => group_depth += 1,
            '}' if !in_class => {
                group_depth = group_depth
                    .checked_sub(1)
                    .ok_or_else(|| "unmatched `}`".to_string())?;
            }
            _ => {}
        }
    }

    if in_class {
        return Err("unclosed character class".to_string());
    }
    if group_depth > 0 {
        return Err("unclosed brace group".to_string());
    }
    Ok(())
}

/// Whether a pattern segment contains glob metacharacters.
fn is_glob_segment(segment: &str) -> bool {
    segment.contains(['*', '?', '[', '{'])
}

/// Expand a non-recursive glob pattern against the filesystem.
///
/// The pattern path is processed segment by segment: literal segments
/// are joined directly, wildcard segments are expanded one directory
/// level at a time against the actual directory entries. Only regular
/// files that survive the final segment are returned. Non-existent
/// intermediate directories contribute zero matches.
pub fn glob_files(pattern: &Path) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = vec![PathBuf::new()];

    for component in pattern.components() {
        match component {
            Component::Prefix(p) => {
                candidates = vec![PathBuf::from(p.as_os_str())];
            }
            Component::RootDir => {
                for c in &mut candidates {
                    c.push(Component::RootDir);
                }
            }
            Component::CurDir => {}
            Component::ParentDir => {
                for c in &mut candidates {
                    c.push(Component::ParentDir);
                }
            }
            Component::Normal(seg) => {
                let seg = seg.to_string_lossy();
                if is_glob_segment(&seg) {
                    candidates = expand_segment(&candidates, &seg);
                } else {
                    for c in &mut candidates {
                        c.push(seg.as_ref());
                    }
                }
                if candidates.is_empty() {
                    return Vec::new();
                }
            }
        }
    }

    candidates.retain(|p| p.is_file());
    candidates
}

/// Expand one wildcard segment against the entries of each candidate dir.
fn expand_segment(candidates: &[PathBuf], segment: &str) -> Vec<PathBuf> {
    let mut next = Vec::new();
    for dir in candidates {
        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            // Unreadable or missing directories contribute no matches.
            Err(_) => continue,
        };
        for entry in entries.flatten() {
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if glob_match(segment, &name) {
                next.push(entry.path());
            }
        }
    }
    next
}

/// Test a project-relative path against the configured ignore patterns.
///
/// Two pattern shapes are recognized: a pattern containing `/` is matched
/// against the full relative path with `**` support, and a bare pattern
/// is matched against the base filename at any depth. Path separators are
/// normalized to `/` before matching.
pub fn matches_ignore(rel_path: &Path, patterns: &[String]) -> bool {
    if patterns.is_empty() {
        return false;
    }
    let path_str = rel_path
        .to_string_lossy()
        .replace(std::path::MAIN_SEPARATOR, "/");
    let file_name = rel_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    patterns.iter().any(|pattern| {
        if pattern.contains('/') {
            glob_match(pattern, &path_str)
        } else {
            glob_match(pattern, &file_name)
        }
    })
}
