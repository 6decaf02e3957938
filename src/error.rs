//! Error taxonomy for project activation and schema queries.
//!
//! Every failure mode a caller can act on gets its own variant with the
//! offending paths embedded in the message. The MCP layer converts these
//! into `success = false` results; nothing in the documented flows is
//! allowed to crash the server.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::CONFIG_FILE_NAME;

/// Errors produced while loading configuration, resolving proto files,
/// or compiling a project.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// No configuration file exists in the project root.
    #[error("project not initialized in {}: no {CONFIG_FILE_NAME} found (run `protomap init` or the onboarding tool first)", root.display())]
    ConfigurationMissing { root: PathBuf },

    /// The configuration file exists but could not be parsed.
    #[error("invalid project configuration at {}: {source}", path.display())]
    ConfigurationInvalid {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// One or more glob patterns are malformed. Resolution is all-or-nothing:
    /// a single bad pattern fails the whole resolve so callers get a clear
    /// "fix your config" signal instead of a silently incomplete file set.
    #[error("invalid glob pattern(s): {}", details.join("; "))]
    InvalidPatterns { details: Vec<String> },

    /// The configured patterns matched no files at all.
    #[error("no proto files found under {} for patterns [{}]", root.display(), patterns.join(", "))]
    NoSourceFiles { root: PathBuf, patterns: Vec<String> },

    /// A resolved source file sits outside every configured import root.
    /// This is a hard error: dropping the file would produce a compiled
    /// artifact missing expected declarations.
    #[error("file {} could not be resolved under any import root: tried [{}]", file.display(), roots.iter().map(|r| r.display().to_string()).collect::<Vec<_>>().join(", "))]
    ImportUnresolved { file: PathBuf, roots: Vec<PathBuf> },

    /// The protobuf compiler rejected one or more files. The collaborator's
    /// own diagnostic text is preserved for debuggability.
    #[error("failed to compile proto files: {0}")]
    CompilationFailed(#[from] protox::Error),

    /// A source file is not valid UTF-8.
    #[error("proto source {} is not valid UTF-8", path.display())]
    InvalidSource { path: PathBuf },

    /// Filesystem I/O failure outside the documented flows.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Unexpected internal failure (thread pool construction and similar).
    #[error("internal error: {0}")]
    Internal(String),
}
