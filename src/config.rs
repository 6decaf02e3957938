//! Project configuration loading from `.protomap.yml`.
//!
//! A project is "initialized" when its root directory contains a
//! `.protomap.yml` file. The file declares which proto sources belong to
//! the project and how `import` statements are resolved:
//!
//! ```yaml
//! proto_files:
//!   - "proto/**/*.proto"
//! import_paths:
//!   - proto
//! ignore_patterns:
//!   - "*_test.proto"
//! ```
//!
//! All three fields are pattern/path lists evaluated in order; results are
//! unioned and de-duplicated, never concatenated with duplicates.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ProjectError;

/// Name of the per-project configuration file.
pub const CONFIG_FILE_NAME: &str = ".protomap.yml";

/// Commented configuration template written by `protomap init` and the
/// onboarding tool. Kept as a literal so the comments survive; a plain
/// serde round-trip would strip them.
const CONFIG_TEMPLATE: &str = r#"# protomap project configuration
#
# proto_files: glob patterns selecting the .proto sources of this project.
# Patterns are resolved from this directory; `**` matches any depth.
proto_files:
  - "proto/**/*.proto"

# import_paths: directories used to resolve `import "x/y.proto"` statements.
# Relative entries are resolved from this directory. When the list is empty,
# the project root itself is used. Well-known google/protobuf imports resolve
# without any entry here.
import_paths: []

# ignore_patterns: files to exclude even when a proto_files pattern matches.
# A pattern containing `/` is matched against the project-relative path
# (so `tmp/**` works); a bare pattern matches the filename at any depth
# (so `*_test.proto` works).
ignore_patterns: []
"#;

/// Configuration for a protobuf project, as stored in `.protomap.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Glob patterns selecting proto source files.
    pub proto_files: Vec<String>,
    /// Import search paths, absolute or project-relative.
    pub import_paths: Vec<String>,
    /// Glob patterns excluding files from the resolved set.
    pub ignore_patterns: Vec<String>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            proto_files: vec!["proto/**/*.proto".to_string()],
            import_paths: Vec::new(),
            ignore_patterns: Vec::new(),
        }
    }
}

impl ProjectConfig {
    /// Path of the configuration file inside `project_root`.
    pub fn path_in(project_root: &Path) -> PathBuf {
        project_root.join(CONFIG_FILE_NAME)
    }

    /// Whether a project has been initialized in `project_root`.
    ///
    /// Used to distinguish "not yet initialized" (onboarding guidance)
    /// from "initialized but broken" (configuration errors).
    pub fn exists(project_root: &Path) -> bool {
        Self::path_in(project_root).is_file()
    }

    /// Load the configuration from `project_root`.
    ///
    /// Returns `ConfigurationMissing` when the file does not exist and
    /// `ConfigurationInvalid` when it cannot be parsed.
    pub fn load(project_root: &Path) -> Result<Self, ProjectError> {
        let path = Self::path_in(project_root);
        let raw = match std::fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(source) if source.kind() == std::io::ErrorKind::NotFound => {
                return Err(ProjectError::ConfigurationMissing {
                    root: project_root.to_path_buf(),
                })
            }
            Err(source) => return Err(ProjectError::Io { path, source }),
        };

        let processed = quote_bare_globs(&raw);
        serde_yaml::from_str(&processed)
            .map_err(|source| ProjectError::ConfigurationInvalid { path, source })
    }

    /// Save the configuration to `project_root` as plain YAML.
    pub fn save(&self, project_root: &Path) -> Result<(), ProjectError> {
        let path = Self::path_in(project_root);
        let yaml = serde_yaml::to_string(self)
            .map_err(|e| ProjectError::Internal(format!("failed to serialize config: {e}")))?;
        std::fs::write(&path, yaml).map_err(|source| ProjectError::Io { path, source })
    }

    /// Write the commented default configuration template to `project_root`.
    pub fn write_template(project_root: &Path) -> Result<(), ProjectError> {
        let path = Self::path_in(project_root);
        std::fs::write(&path, CONFIG_TEMPLATE).map_err(|source| ProjectError::Io { path, source })
    }
}

/// Quote unquoted glob scalars in YAML list items.
///
/// Hand-written configs often contain entries like `- *.proto`, which YAML
/// would otherwise read as an alias. Items that already carry quotes are
/// left untouched.
fn quote_bare_globs(yaml: &str) -> String {
    let mut out = Vec::new();
    for line in yaml.lines() {
        if let Some((head, item)) = line.split_once("- ") {
            let item = item.trim();
            let quoted = item.starts_with('"') || item.starts_with('\'');
            if !quoted && item.contains('*') {
                out.push(format!("{head}- \"{item}\""));
                continue;
            }
        }
        out.push(line.to_string());
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_distinguished() {
        let dir = TempDir::new().unwrap();
        assert!(!ProjectConfig::exists(dir.path()));
        match ProjectConfig::load(dir.path()) {
            Err(ProjectError::ConfigurationMissing { root }) => {
                assert_eq!(root, dir.path());
            }
            other => panic!("expected ConfigurationMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig {
            proto_files: vec!["api/**/*.proto".to_string(), "common.proto".to_string()],
            import_paths: vec!["api".to_string(), "/usr/include".to_string()],
            ignore_patterns: vec!["*_internal.proto".to_string()],
        };
        config.save(dir.path()).unwrap();
        let loaded = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_unquoted_glob_patterns_parse() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            ProjectConfig::path_in(dir.path()),
            "proto_files:\n  - proto/**/*.proto\n  - *.proto\n",
        )
        .unwrap();
        let loaded = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(
            loaded.proto_files,
            vec!["proto/**/*.proto".to_string(), "*.proto".to_string()]
        );
        assert!(loaded.import_paths.is_empty());
    }

    #[test]
    fn test_invalid_yaml_reports_path() {
        let dir = TempDir::new().unwrap();
        std::fs::write(ProjectConfig::path_in(dir.path()), "proto_files: {nope").unwrap();
        match ProjectConfig::load(dir.path()) {
            Err(ProjectError::ConfigurationInvalid { path, .. }) => {
                assert!(path.ends_with(CONFIG_FILE_NAME));
            }
            other => panic!("expected ConfigurationInvalid, got {other:?}"),
        }
    }

    #[test]
    fn test_template_parses_to_default() {
        let dir = TempDir::new().unwrap();
        ProjectConfig::write_template(dir.path()).unwrap();
        let loaded = ProjectConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, ProjectConfig::default());
    }
}
