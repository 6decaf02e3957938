//! protomap - Protobuf project intelligence over MCP
//!
//! Compiles a protobuf project's .proto sources into a descriptor
//! artifact and serves structured schema queries (services, messages,
//! enums) to MCP clients.
//!
//! # Architecture
//!
//! ```text
//! Config Load → File Discovery → Import Roots → Compilation → Projection
//!      ↓              ↓               ↓              ↓             ↓
//!  serde_yaml     glob-match      path rules       protox      filtered
//!   .protomap.yml  + walkdir      + dedup        descriptors   JSON views
//! ```
//!
//! Activation is all-or-nothing: a project either compiles completely
//! and becomes queryable, or the previous project (if any) stays active.

pub mod compiler;
pub mod config;
pub mod discovery;
pub mod error;
pub mod mcp;
pub mod schema;
pub mod types;

// Re-export core types
pub use compiler::{ActiveProject, CompilerOptions, ProjectSummary};
pub use config::ProjectConfig;
pub use error::ProjectError;
pub use schema::{DeclKind, SchemaFilter};
pub use types::{
    EnumInfo, EnumValueInfo, FieldInfo, FileInfo, MessageInfo, MethodInfo, SchemaInfo, SchemaStats,
    ServiceInfo,
};
