//! Project compilation and the active project handle.
//!
//! `ActiveProject` is the result of one activation: configuration loaded,
//! sources resolved, everything compiled into linked file descriptors.
//! The handle exclusively owns its compiled artifact; re-activation
//! always builds a fresh handle from source. There is no incremental
//! compilation and no cache, the tool is interactive and a full compile
//! of a typical project is well under a second.
//!
//! The actual lexing, parsing, and type resolution is delegated to
//! `protox`, which resolves the declared import graph itself and accepts
//! input files in arbitrary order. Inputs are still handed over in
//! deterministic lexicographic order, and the output artifact is
//! reordered to mirror the input order so repeated activations produce
//! byte-identical schema views.

use std::path::{Path, PathBuf};

use prost_types::FileDescriptorProto;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::compiler::imports::{relativize_sources, resolve_import_roots};
use crate::config::ProjectConfig;
use crate::discovery::resolve_proto_files;
use crate::error::ProjectError;

/// Environment variable overriding the source-loading parallelism ceiling.
pub const MAX_PARALLELISM_ENV: &str = "PROTOMAP_MAX_PARALLELISM";

/// Default parallelism ceiling for source preloading.
pub const DEFAULT_MAX_PARALLELISM: usize = 4;

/// Tunables for one compilation run.
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Upper bound on threads used to preload and check source files.
    pub max_parallelism: usize,
    /// Preserve source locations so leading comments survive into the
    /// schema projection.
    pub include_source_info: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            max_parallelism: DEFAULT_MAX_PARALLELISM,
            include_source_info: true,
        }
    }
}

impl CompilerOptions {
    /// Build options from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let max_parallelism = std::env::var(MAX_PARALLELISM_ENV)
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_PARALLELISM);
        Self {
            max_parallelism,
            ..Self::default()
        }
    }
}

/// Declaration counts reported after a successful activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectSummary {
    pub files: usize,
    pub messages: usize,
    pub services: usize,
    pub enums: usize,
}

/// A compiled protobuf project.
///
/// Created by [`ActiveProject::activate`] and threaded explicitly through
/// subsequent schema queries; there is no process-wide current project.
#[derive(Debug)]
pub struct ActiveProject {
    project_root: PathBuf,
    config: ProjectConfig,
    import_roots: Vec<PathBuf>,
    files: Vec<FileDescriptorProto>,
}

impl ActiveProject {
    /// Activate the project at `project_path`: load its configuration,
    /// resolve and compile its proto sources.
    pub fn activate(project_path: &Path) -> Result<Self, ProjectError> {
        let project_root = std::path::absolute(project_path).map_err(|source| ProjectError::Io {
            path: project_path.to_path_buf(),
            source,
        })?;
        let config = ProjectConfig::load(&project_root)?;
        Self::compile(&project_root, config, &CompilerOptions::from_env())
    }

    /// Compile a project from an already-loaded configuration.
    pub fn compile(
        project_root: &Path,
        config: ProjectConfig,
        options: &CompilerOptions,
    ) -> Result<Self, ProjectError> {
        let sources = resolve_proto_files(project_root, &config)?;
        if sources.is_empty() {
            return Err(ProjectError::NoSourceFiles {
                root: project_root.to_path_buf(),
                patterns: config.proto_files.clone(),
            });
        }

        let import_roots = resolve_import_roots(project_root, &config.import_paths);
        let relative = relativize_sources(&sources, &import_roots)?;
        debug!(
            files = relative.len(),
            roots = import_roots.len(),
            "compiling proto project"
        );

        preload_sources(&sources, options)?;

        let mut compiler = protox::Compiler::new(&import_roots)?;
        compiler.include_source_info(options.include_source_info);
        compiler.include_imports(false);
        compiler.open_files(&relative)?;
        let descriptor_set = compiler.file_descriptor_set();
        let files = order_like_inputs(descriptor_set.file, &relative);

        info!(
            root = %project_root.display(),
            files = files.len(),
            "project compiled"
        );
        Ok(Self {
            project_root: project_root.to_path_buf(),
            config,
            import_roots,
            files,
        })
    }

    /// Absolute root directory of the activated project.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Configuration this project was compiled with.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Import roots the compiler resolved `import` statements against.
    pub fn import_roots(&self) -> &[PathBuf] {
        &self.import_roots
    }

    /// Linked file descriptors, one per input source file, in input order.
    pub fn files(&self) -> &[FileDescriptorProto] {
        &self.files
    }

    /// Top-level declaration counts across the compiled artifact.
    pub fn summary(&self) -> ProjectSummary {
        ProjectSummary {
            files: self.files.len(),
            messages: self.files.iter().map(|f| f.message_type.len()).sum(),
            services: self.files.iter().map(|f| f.service.len()).sum(),
            enums: self.files.iter().map(|f| f.enum_type.len()).sum(),
        }
    }
}

/// Read every source file up front, bounded by the configured parallelism
/// ceiling, so unreadable or non-UTF-8 files surface as per-file errors
/// instead of opaque compiler diagnostics.
fn preload_sources(sources: &[PathBuf], options: &CompilerOptions) -> Result<(), ProjectError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(options.max_parallelism.max(1))
        .build()
        .map_err(|e| ProjectError::Internal(format!("failed to build thread pool: {e}")))?;

    pool.install(|| {
        sources.par_iter().try_for_each(|path| {
            let bytes = std::fs::read(path).map_err(|source| ProjectError::Io {
                path: path.clone(),
                source,
            })?;
            std::str::from_utf8(&bytes)
                .map(|_| ())
                .map_err(|_| ProjectError::InvalidSource { path: path.clone() })
        })
    })
}

/// Reorder the compiler's output to mirror the input file order.
///
/// The artifact order is part of the determinism contract: downstream
/// stats and filtered collections must be stable across identical calls,
/// whatever order the collaborator finished in.
fn order_like_inputs(
    mut compiled: Vec<FileDescriptorProto>,
    inputs: &[String],
) -> Vec<FileDescriptorProto> {
    let mut ordered = Vec::with_capacity(compiled.len());
    for input in inputs {
        if let Some(pos) = compiled.iter().position(|f| f.name() == input) {
            ordered.push(compiled.remove(pos));
        }
    }
    // Anything left over keeps its compiler-given order at the tail.
    ordered.extend(compiled);
    ordered
}
