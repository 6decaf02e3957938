//! Schema filtering.
//!
//! Two interaction modes are supported in one filter value. Machine
//! callers use exact allow-lists per declaration kind, where an empty
//! list means "include all", the most permissive default. Exploratory
//! callers use a free-text `name` substring matched case-insensitively
//! against both the short and fully-qualified name, optionally combined
//! with a `kind` gate that restricts which categories are scanned at
//! all. When several criteria are supplied, a declaration must pass all
//! of them.

use std::fmt;
use std::str::FromStr;

/// Top-level declaration kinds a filter can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    Message,
    Service,
    Enum,
}

impl DeclKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DeclKind::Message => "message",
            DeclKind::Service => "service",
            DeclKind::Enum => "enum",
        }
    }
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeclKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "message" => Ok(DeclKind::Message),
            "service" => Ok(DeclKind::Service),
            "enum" => Ok(DeclKind::Enum),
            other => Err(format!(
                "unknown type filter {other:?}: expected 'message', 'service', or 'enum'"
            )),
        }
    }
}

/// Criteria applied while projecting a schema view.
#[derive(Debug, Clone, Default)]
pub struct SchemaFilter {
    /// Exact short-name allow-list for messages; empty means all.
    pub message_types: Vec<String>,
    /// Exact short-name allow-list for services; empty means all.
    pub service_types: Vec<String>,
    /// Exact short-name allow-list for enums; empty means all.
    pub enum_types: Vec<String>,
    /// Case-insensitive substring matched on short and full names.
    pub name: Option<String>,
    /// Restrict scanning to a single declaration kind.
    pub kind: Option<DeclKind>,
    /// Emit per-file metadata alongside the declarations.
    pub include_file_info: bool,
}

impl SchemaFilter {
    /// Filter that scans services only and admits all of them.
    pub fn services_only() -> Self {
        Self {
            kind: Some(DeclKind::Service),
            ..Self::default()
        }
    }

    /// Whether a declaration category should be walked at all.
    pub fn scans(&self, kind: DeclKind) -> bool {
        self.kind.map_or(true, |k| k == kind)
    }

    /// Whether a declaration of `kind` with the given names is included.
    pub fn admits(&self, kind: DeclKind, name: &str, full_name: &str) -> bool {
        let allow_list = match kind {
            DeclKind::Message => &self.message_types,
            DeclKind::Service => &self.service_types,
            DeclKind::Enum => &self.enum_types,
        };
        if !allow_list.is_empty() && !allow_list.iter().any(|n| n == name) {
            return false;
        }
        if let Some(needle) = &self.name {
            let needle = needle.to_lowercase();
            return name.to_lowercase().contains(&needle)
                || full_name.to_lowercase().contains(&needle);
        }
        true
    }
}
