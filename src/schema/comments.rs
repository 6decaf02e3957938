//! Leading-comment lookup from descriptor source locations.
//!
//! `SourceCodeInfo` addresses declarations by a path of field tags and
//! indexes into the `FileDescriptorProto` tree. The tags below come from
//! `descriptor.proto`: field 4 of a file is `message_type`, field 2 of a
//! message is `field`, and so on. Only the top-level declaration kinds
//! the projector emits are covered.

use std::collections::HashMap;

use prost_types::FileDescriptorProto;

const FILE_MESSAGE_TYPE: i32 = 4;
const FILE_ENUM_TYPE: i32 = 5;
const FILE_SERVICE: i32 = 6;
const MESSAGE_FIELD: i32 = 2;
const ENUM_VALUE: i32 = 2;
const SERVICE_METHOD: i32 = 2;

/// Trimmed leading comments for one file, keyed by source-location path.
pub struct CommentMap {
    by_path: HashMap<Vec<i32>, String>,
}

impl CommentMap {
    /// Index the leading comments of a compiled file. Files compiled
    /// without source info produce an empty map; every lookup then
    /// returns an empty description.
    pub fn new(file: &FileDescriptorProto) -> Self {
        let mut by_path = HashMap::new();
        if let Some(info) = &file.source_code_info {
            for location in &info.location {
                if let Some(comment) = &location.leading_comments {
                    let trimmed = comment.trim();
                    if !trimmed.is_empty() {
                        by_path.insert(location.path.clone(), trimmed.to_string());
                    }
                }
            }
        }
        Self { by_path }
    }

    fn get(&self, path: &[i32]) -> String {
        self.by_path.get(path).cloned().unwrap_or_default()
    }

    pub fn message(&self, index: usize) -> String {
        self.get(&[FILE_MESSAGE_TYPE, index as i32])
    }

    pub fn field(&self, message_index: usize, field_index: usize) -> String {
        self.get(&[
            FILE_MESSAGE_TYPE,
            message_index as i32,
            MESSAGE_FIELD,
            field_index as i32,
        ])
    }

    pub fn service(&self, index: usize) -> String {
        self.get(&[FILE_SERVICE, index as i32])
    }

    pub fn method(&self, service_index: usize, method_index: usize) -> String {
        self.get(&[
            FILE_SERVICE,
            service_index as i32,
            SERVICE_METHOD,
            method_index as i32,
        ])
    }

    pub fn enum_type(&self, index: usize) -> String {
        self.get(&[FILE_ENUM_TYPE, index as i32])
    }

    pub fn enum_value(&self, enum_index: usize, value_index: usize) -> String {
        self.get(&[
            FILE_ENUM_TYPE,
            enum_index as i32,
            ENUM_VALUE,
            value_index as i32,
        ])
    }
}
