//! Serializable schema view types.
//!
//! These are the shapes returned to MCP callers: plain data, derived
//! fresh from the compiled artifact on every query. None of them cache
//! anything; filters vary per call, so views are always recomputed.

use serde::{Deserialize, Serialize};

/// Detailed information about a protobuf message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageInfo {
    pub name: String,
    pub full_name: String,
    pub fields: Vec<FieldInfo>,
    /// Import-root-relative path of the defining file.
    pub file: String,
    pub package: String,
    /// Leading comment on the declaration, trimmed. Empty when absent.
    pub description: String,
}

/// Information about one message field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    pub number: i32,
    /// Scalar kind name (`string`, `int32`, ...) or the fully-qualified
    /// type name for message and enum fields.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Whether the field tracks presence (proto3 `optional`, proto2
    /// optional, oneof members, singular message fields).
    pub optional: bool,
    pub repeated: bool,
    pub description: String,
}

/// Detailed information about a protobuf service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub name: String,
    pub full_name: String,
    pub methods: Vec<MethodInfo>,
    pub file: String,
    pub package: String,
    pub description: String,
}

/// Information about one service method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodInfo {
    pub name: String,
    /// Fully-qualified request type name, without the descriptor's
    /// leading dot.
    pub input_type: String,
    /// Fully-qualified response type name, without the leading dot.
    pub output_type: String,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub description: String,
}

/// Detailed information about a protobuf enum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumInfo {
    pub name: String,
    pub full_name: String,
    pub values: Vec<EnumValueInfo>,
    pub file: String,
    pub package: String,
    pub description: String,
}

/// Information about one enum value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumValueInfo {
    pub name: String,
    pub number: i32,
    pub description: String,
}

/// File-level metadata, emitted only when requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileInfo {
    /// Import-root-relative path.
    pub name: String,
    pub package: String,
    /// Declared dependencies, as import-root-relative paths.
    pub dependencies: Vec<String>,
}

/// Counts over a projected schema view.
///
/// Always computed from the emitted collection lengths, never tracked
/// separately, so they cannot drift from the collections they describe.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaStats {
    pub total_files: usize,
    pub total_messages: usize,
    pub total_services: usize,
    pub total_enums: usize,
    pub total_fields: usize,
    pub total_methods: usize,
    pub total_enum_values: usize,
}

/// A filtered projection of a compiled project's schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaInfo {
    pub messages: Vec<MessageInfo>,
    pub services: Vec<ServiceInfo>,
    pub enums: Vec<EnumInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileInfo>>,
    pub stats: SchemaStats,
}
