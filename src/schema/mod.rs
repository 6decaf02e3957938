//! Schema projection.
//!
//! Walks a compiled project's descriptor tree and produces filtered,
//! statistics-annotated views for presentation to callers.

mod comments;
mod filter;
mod projector;

pub use filter::{DeclKind, SchemaFilter};
pub use projector::project_schema;
