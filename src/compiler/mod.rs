//! Project compilation.
//!
//! Resolves import roots, drives the protobuf compiler collaborator, and
//! owns the compiled artifact behind an explicit project handle.

pub mod imports;
mod project;

pub use project::{
    ActiveProject, CompilerOptions, ProjectSummary, DEFAULT_MAX_PARALLELISM, MAX_PARALLELISM_ENV,
};
