//! Schema projection from compiled descriptors.
//!
//! Walks the compiled artifact file by file, in artifact order, and
//! produces the filtered view the MCP tools return. The projection is
//! recomputed on each call; nothing here is cached, since filters vary
//! per query and the walk is cheap at interactive scale.

use prost_types::field_descriptor_proto::{Label, Type};
use prost_types::{FieldDescriptorProto, FileDescriptorProto};

use crate::compiler::ActiveProject;
use crate::schema::comments::CommentMap;
use crate::schema::filter::{DeclKind, SchemaFilter};
use crate::types::{
    EnumInfo, EnumValueInfo, FieldInfo, FileInfo, MessageInfo, MethodInfo, SchemaInfo, SchemaStats,
    ServiceInfo,
};

/// Project a filtered schema view from a compiled project.
pub fn project_schema(project: &ActiveProject, filter: &SchemaFilter) -> SchemaInfo {
    let mut messages = Vec::new();
    let mut services = Vec::new();
    let mut enums = Vec::new();
    let mut files = filter.include_file_info.then(Vec::new);

    for file in project.files() {
        let comments = CommentMap::new(file);
        let package = file.package().to_string();

        if let Some(files) = &mut files {
            files.push(FileInfo {
                name: file.name().to_string(),
                package: package.clone(),
                dependencies: file.dependency.clone(),
            });
        }

        if filter.scans(DeclKind::Message) {
            for (i, message) in file.message_type.iter().enumerate() {
                let full_name = qualified(&package, message.name());
                if filter.admits(DeclKind::Message, message.name(), &full_name) {
                    messages.push(project_message(file, i, &full_name, &comments));
                }
            }
        }

        if filter.scans(DeclKind::Service) {
            for (i, service) in file.service.iter().enumerate() {
                let full_name = qualified(&package, service.name());
                if filter.admits(DeclKind::Service, service.name(), &full_name) {
                    services.push(project_service(file, i, &full_name, &comments));
                }
            }
        }

        if filter.scans(DeclKind::Enum) {
            for (i, enum_type) in file.enum_type.iter().enumerate() {
                let full_name = qualified(&package, enum_type.name());
                if filter.admits(DeclKind::Enum, enum_type.name(), &full_name) {
                    enums.push(project_enum(file, i, &full_name, &comments));
                }
            }
        }
    }

    let stats = SchemaStats {
        total_files: project.files().len(),
        total_messages: messages.len(),
        total_services: services.len(),
        total_enums: enums.len(),
        total_fields: messages.iter().map(|m| m.fields.len()).sum(),
        total_methods: services.iter().map(|s| s.methods.len()).sum(),
        total_enum_values: enums.iter().map(|e| e.values.len()).sum(),
    };

    SchemaInfo {
        messages,
        services,
        enums,
        files,
        stats,
    }
}

fn project_message(
    file: &FileDescriptorProto,
    index: usize,
    full_name: &str,
    comments: &CommentMap,
) -> MessageInfo {
    let message = &file.message_type[index];
    let fields = message
        .field
        .iter()
        .enumerate()
        .map(|(j, field)| FieldInfo {
            name: field.name().to_string(),
            number: field.number(),
            type_name: field_type_name(field),
            optional: has_presence(field, file),
            repeated: field.label() == Label::Repeated,
            description: comments.field(index, j),
        })
        .collect();

    MessageInfo {
        name: message.name().to_string(),
        full_name: full_name.to_string(),
        fields,
        file: file.name().to_string(),
        package: file.package().to_string(),
        description: comments.message(index),
    }
}

fn project_service(
    file: &FileDescriptorProto,
    index: usize,
    full_name: &str,
    comments: &CommentMap,
) -> ServiceInfo {
    let service = &file.service[index];
    let methods = service
        .method
        .iter()
        .enumerate()
        .map(|(j, method)| MethodInfo {
            name: method.name().to_string(),
            input_type: trim_leading_dot(method.input_type()),
            output_type: trim_leading_dot(method.output_type()),
            client_streaming: method.client_streaming(),
            server_streaming: method.server_streaming(),
            description: comments.method(index, j),
        })
        .collect();

    ServiceInfo {
        name: service.name().to_string(),
        full_name: full_name.to_string(),
        methods,
        file: file.name().to_string(),
        package: file.package().to_string(),
        description: comments.service(index),
    }
}

fn project_enum(
    file: &FileDescriptorProto,
    index: usize,
    full_name: &str,
    comments: &CommentMap,
) -> EnumInfo {
    let enum_type = &file.enum_type[index];
    let values = enum_type
        .value
        .iter()
        .enumerate()
        .map(|(j, value)| EnumValueInfo {
            name: value.name().to_string(),
            number: value.number(),
            description: comments.enum_value(index, j),
        })
        .collect();

    EnumInfo {
        name: enum_type.name().to_string(),
        full_name: full_name.to_string(),
        values,
        file: file.name().to_string(),
        package: file.package().to_string(),
        description: comments.enum_type(index),
    }
}

/// Package-qualified name of a top-level declaration.
fn qualified(package: &str, name: &str) -> String {
    if package.is_empty() {
        name.to_string()
    } else {
        format!("{package}.{name}")
    }
}

/// Type references in descriptors carry a leading dot (`.pkg.Type`);
/// callers see the conventional form without it.
fn trim_leading_dot(type_name: &str) -> String {
    type_name.trim_start_matches('.').to_string()
}

/// Render the field type: scalar kind names for scalars, the
/// fully-qualified type name for message and enum fields.
fn field_type_name(field: &FieldDescriptorProto) -> String {
    match field.r#type() {
        Type::Message | Type::Enum | Type::Group => trim_leading_dot(field.type_name()),
        Type::Double => "double".to_string(),
        Type::Float => "float".to_string(),
        Type::Int64 => "int64".to_string(),
        Type::Uint64 => "uint64".to_string(),
        Type::Int32 => "int32".to_string(),
        Type::Fixed64 => "fixed64".to_string(),
        Type::Fixed32 => "fixed32".to_string(),
        Type::Bool => "bool".to_string(),
        Type::String => "string".to_string(),
        Type::Bytes => "bytes".to_string(),
        Type::Uint32 => "uint32".to_string(),
        Type::Sfixed32 => "sfixed32".to_string(),
        Type::Sfixed64 => "sfixed64".to_string(),
        Type::Sint32 => "sint32".to_string(),
        Type::Sint64 => "sint64".to_string(),
    }
}

/// Whether a field tracks presence.
///
/// Mirrors descriptor semantics: repeated fields never do; proto3
/// `optional`, oneof members, and singular message fields always do;
/// everything else depends on proto2 syntax.
fn has_presence(field: &FieldDescriptorProto, file: &FileDescriptorProto) -> bool {
    if field.label() == Label::Repeated {
        return false;
    }
    if field.proto3_optional() || field.oneof_index.is_some() {
        return true;
    }
    if matches!(field.r#type(), Type::Message | Type::Group) {
        return true;
    }
    let syntax = file.syntax();
    syntax.is_empty() || syntax == "proto2"
}
