//! Proto source discovery.
//!
//! Expands configured glob patterns (including recursive `**`) against
//! the project root into a deduplicated, deterministically ordered list
//! of absolute file paths, with ignore-pattern exclusion applied.

mod files;
pub mod patterns;

pub use files::resolve_proto_files;
