//! MCP server implementation for protomap.
//!
//! Exposes the protobuf project tools over the MCP protocol: activate a
//! project, list its services, and query its schema. Every tool returns
//! a JSON body with at least `success` and `message`; failures are
//! encoded in the result instead of raised as protocol errors, so one
//! broken activation never takes down the session or the previously
//! active project.

use std::borrow::Cow;
use std::future::Future;
use std::path::Path;
use std::sync::{Arc, RwLock};

use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ErrorCode, ErrorData as McpError, *},
    tool, tool_handler, tool_router,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::compiler::ActiveProject;
use crate::config::{ProjectConfig, CONFIG_FILE_NAME};
use crate::schema::{DeclKind, SchemaFilter};
use crate::types::{SchemaInfo, ServiceInfo};

/// Fixed guard message returned by queries issued before any successful
/// activation. Machine-checkable; callers match on it verbatim.
pub const NO_PROJECT_MESSAGE: &str = "No project activated. Use activate_project first.";

/// Protomap MCP server.
///
/// Holds the currently activated project behind a lock. Queries clone
/// the inner `Arc` and release the lock immediately, so a concurrent
/// re-activation swaps the handle atomically while in-flight readers
/// keep the artifact they started with.
#[derive(Debug, Clone)]
pub struct ProtomapServer {
    active: Arc<RwLock<Option<Arc<ActiveProject>>>>,
    tool_router: ToolRouter<ProtomapServer>,
}

/// Request parameters for the activate_project tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ActivateProjectRequest {
    /// Path to the protobuf project directory.
    #[schemars(description = "Path to the protobuf project directory")]
    pub project_path: String,
}

/// Response from activate_project.
#[derive(Debug, Serialize, Deserialize)]
pub struct ActivateProjectResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root: Option<String>,
    pub files: usize,
    pub services: usize,
    pub messages: usize,
    pub enums: usize,
}

impl ActivateProjectResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            project_root: None,
            files: 0,
            services: 0,
            messages: 0,
            enums: 0,
        }
    }
}

/// Response from list_services.
#[derive(Debug, Serialize, Deserialize)]
pub struct ListServicesResponse {
    pub success: bool,
    pub message: String,
    pub services: Vec<ServiceInfo>,
    pub count: usize,
}

impl ListServicesResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            services: Vec::new(),
            count: 0,
        }
    }
}

/// Request parameters for the get_schema tool.
#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
pub struct GetSchemaRequest {
    /// Free-text filter matched case-insensitively against short and
    /// fully-qualified names.
    #[schemars(description = "Filter by name (searches both name and full_name)")]
    pub name: Option<String>,

    /// Restrict the scan to one declaration kind.
    #[schemars(description = "Filter by type: 'message', 'service', or 'enum'")]
    pub kind: Option<String>,

    /// Exact message names to include. Empty or absent means all.
    #[schemars(description = "Exact message names to include (empty = all)")]
    pub message_types: Option<Vec<String>>,

    /// Exact service names to include. Empty or absent means all.
    #[schemars(description = "Exact service names to include (empty = all)")]
    pub service_types: Option<Vec<String>>,

    /// Exact enum names to include. Empty or absent means all.
    #[schemars(description = "Exact enum names to include (empty = all)")]
    pub enum_types: Option<Vec<String>>,

    /// Emit per-file metadata (name, package, dependencies).
    #[schemars(description = "Include per-file metadata in the response")]
    pub include_file_info: Option<bool>,
}

/// Response from get_schema.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetSchemaResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaInfo>,
    pub count: usize,
}

impl GetSchemaResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            schema: None,
            count: 0,
        }
    }
}

/// Request parameters for the onboarding tool.
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct OnboardingRequest {
    /// Path to the protobuf project directory.
    #[schemars(description = "Path to the protobuf project directory")]
    pub project_path: String,
}

/// Response from onboarding.
#[derive(Debug, Serialize, Deserialize)]
pub struct OnboardingResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_file: Option<String>,
}

#[tool_router]
impl ProtomapServer {
    /// Create a new protomap MCP server with no project activated.
    pub fn new() -> Self {
        Self {
            active: Arc::new(RwLock::new(None)),
            tool_router: Self::tool_router(),
        }
    }

    /// Activate a protobuf project: load its configuration, compile its
    /// proto files, and install the result as the current project.
    #[tool(
        name = "activate_project",
        description = "Activate a protobuf project by loading its configuration and compiling its proto files. Reports file and declaration counts on success."
    )]
    async fn activate_project_tool(
        &self,
        Parameters(request): Parameters<ActivateProjectRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.activate(&request.project_path))
    }

    /// List every service in the currently activated project.
    #[tool(
        name = "list_services",
        description = "List all services in the currently activated protobuf project, including their methods and streaming flags."
    )]
    async fn list_services_tool(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.list_services())
    }

    /// Query detailed schema information with optional filters.
    #[tool(
        name = "get_schema",
        description = "Get detailed schema information (messages, services, enums) from the activated protobuf project, with optional name, type, and allow-list filters."
    )]
    async fn get_schema_tool(
        &self,
        Parameters(request): Parameters<GetSchemaRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.get_schema(&request))
    }

    /// Initialize a project configuration and return setup guidance.
    #[tool(
        name = "onboarding",
        description = "Initialize protomap configuration for a project directory and provide setup guidance."
    )]
    async fn onboarding_tool(
        &self,
        Parameters(request): Parameters<OnboardingRequest>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&self.onboarding(&request.project_path))
    }
}

// Transport-independent tool implementations. These are the actual query
// surface; the async wrappers above only add MCP framing.
impl ProtomapServer {
    /// Activate the project at `project_path` and make it current.
    pub fn activate(&self, project_path: &str) -> ActivateProjectResponse {
        let root = match std::path::absolute(project_path) {
            Ok(root) => root,
            Err(e) => {
                return ActivateProjectResponse::failure(format!(
                    "Failed to resolve project path {project_path:?}: {e}"
                ))
            }
        };

        if !ProjectConfig::exists(&root) {
            return ActivateProjectResponse::failure(onboarding_prompt(&root));
        }

        match ActiveProject::activate(&root) {
            Ok(project) => {
                let summary = project.summary();
                match self.active.write() {
                    Ok(mut guard) => *guard = Some(Arc::new(project)),
                    Err(_) => {
                        return ActivateProjectResponse::failure(
                            "Project state lock poisoned; restart the server",
                        )
                    }
                }
                info!(root = %root.display(), "project activated");
                ActivateProjectResponse {
                    success: true,
                    message: "Project activated successfully".to_string(),
                    project_root: Some(root.display().to_string()),
                    files: summary.files,
                    services: summary.services,
                    messages: summary.messages,
                    enums: summary.enums,
                }
            }
            Err(err) => {
                ActivateProjectResponse::failure(format!("Failed to activate project: {err}"))
            }
        }
    }

    /// All services of the current project, unfiltered.
    pub fn list_services(&self) -> ListServicesResponse {
        let Some(project) = self.current() else {
            return ListServicesResponse::failure(NO_PROJECT_MESSAGE);
        };

        let view = crate::schema::project_schema(&project, &SchemaFilter::services_only());
        let count = view.services.len();
        ListServicesResponse {
            success: true,
            message: format!("Found {count} services"),
            services: view.services,
            count,
        }
    }

    /// Filtered schema view of the current project.
    pub fn get_schema(&self, request: &GetSchemaRequest) -> GetSchemaResponse {
        let Some(project) = self.current() else {
            return GetSchemaResponse::failure(NO_PROJECT_MESSAGE);
        };

        let kind = match &request.kind {
            Some(raw) => match raw.parse::<DeclKind>() {
                Ok(kind) => Some(kind),
                Err(e) => return GetSchemaResponse::failure(e),
            },
            None => None,
        };

        let filter = SchemaFilter {
            message_types: request.message_types.clone().unwrap_or_default(),
            service_types: request.service_types.clone().unwrap_or_default(),
            enum_types: request.enum_types.clone().unwrap_or_default(),
            name: request.name.clone().filter(|n| !n.is_empty()),
            kind,
            include_file_info: request.include_file_info.unwrap_or(false),
        };

        let view = crate::schema::project_schema(&project, &filter);
        let count = view.messages.len() + view.services.len() + view.enums.len();
        GetSchemaResponse {
            success: true,
            message: format!(
                "Retrieved schema information: {} messages, {} services, {} enums",
                view.messages.len(),
                view.services.len(),
                view.enums.len()
            ),
            schema: Some(view),
            count,
        }
    }

    /// Write the default configuration template and return guidance.
    pub fn onboarding(&self, project_path: &str) -> OnboardingResponse {
        let root = match std::path::absolute(project_path) {
            Ok(root) => root,
            Err(e) => {
                return OnboardingResponse {
                    success: false,
                    message: format!("Failed to resolve project path {project_path:?}: {e}"),
                    project_root: None,
                    config_file: None,
                }
            }
        };

        if ProjectConfig::exists(&root) {
            return OnboardingResponse {
                success: false,
                message: "Project already initialized. Configuration file already exists."
                    .to_string(),
                project_root: Some(root.display().to_string()),
                config_file: None,
            };
        }

        if let Err(err) = ProjectConfig::write_template(&root) {
            return OnboardingResponse {
                success: false,
                message: format!("Failed to create configuration file: {err}"),
                project_root: Some(root.display().to_string()),
                config_file: None,
            };
        }

        OnboardingResponse {
            success: true,
            message: onboarding_prompt(&root),
            project_root: Some(root.display().to_string()),
            config_file: Some(CONFIG_FILE_NAME.to_string()),
        }
    }

    /// Snapshot of the currently active project, if any.
    fn current(&self) -> Option<Arc<ActiveProject>> {
        self.active.read().ok().and_then(|guard| guard.clone())
    }
}

impl Default for ProtomapServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for ProtomapServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "protomap".into(),
                version: env!("CARGO_PKG_VERSION").into(),
            },
            instructions: Some(
                "Protobuf project intelligence. Use activate_project to compile \
                 a project's .proto files, then list_services and get_schema to \
                 query its services, messages, and enums."
                    .to_string(),
            ),
        }
    }
}

/// Setup guidance for a directory without a configuration file.
fn onboarding_prompt(root: &Path) -> String {
    format!(
        "No {config} found in {root}. This project is not initialized yet.\n\
         \n\
         To get started:\n\
         1. Run the `onboarding` tool (or `protomap init`) against this directory \
         to create a default {config}.\n\
         2. Edit `proto_files` so its glob patterns match your .proto sources \
         (the default is `proto/**/*.proto`).\n\
         3. Add `import_paths` entries for the directories your `import` \
         statements are written against.\n\
         4. Call `activate_project` again.",
        config = CONFIG_FILE_NAME,
        root = root.display(),
    )
}

/// Serialize a response struct into an MCP text result.
fn json_result<T: Serialize>(response: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(response).map_err(|e| McpError {
        code: ErrorCode(-32603),
        message: Cow::from(format!("JSON serialization failed: {e}")),
        data: None,
    })?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FIXTURE_PROTO: &str = r#"syntax = "proto3";

message Req {}
message Resp {}

service S {
  rpc M(Req) returns (Resp);
}
"#;

    fn initialized_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("proto")).unwrap();
        std::fs::write(dir.path().join("proto/s.proto"), FIXTURE_PROTO).unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "proto_files:\n  - \"proto/**/*.proto\"\nimport_paths:\n  - proto\n",
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_queries_before_activation_are_guarded() {
        let server = ProtomapServer::new();

        let list = server.list_services();
        assert!(!list.success);
        assert_eq!(list.message, "No project activated. Use activate_project first.");

        let schema = server.get_schema(&GetSchemaRequest::default());
        assert!(!schema.success);
        assert_eq!(schema.message, NO_PROJECT_MESSAGE);
    }

    #[test]
    fn test_activate_uninitialized_project_returns_onboarding_guidance() {
        let dir = TempDir::new().unwrap();
        let server = ProtomapServer::new();

        let response = server.activate(&dir.path().to_string_lossy());
        assert!(!response.success);
        assert!(response.message.contains(CONFIG_FILE_NAME));
        assert!(response.message.contains("onboarding"));
    }

    #[test]
    fn test_activate_then_round_trip_queries() {
        let dir = initialized_project();
        let server = ProtomapServer::new();

        let activated = server.activate(&dir.path().to_string_lossy());
        assert!(activated.success, "{}", activated.message);
        assert_eq!(activated.files, 1);
        assert_eq!(activated.services, 1);
        assert_eq!(activated.messages, 2);
        assert_eq!(activated.enums, 0);

        let list = server.list_services();
        assert!(list.success);
        assert_eq!(list.count, 1);
        let service = &list.services[0];
        assert_eq!(service.name, "S");
        assert_eq!(service.methods.len(), 1);
        assert_eq!(service.methods[0].name, "M");
        assert_eq!(service.methods[0].input_type, "Req");
        assert_eq!(service.methods[0].output_type, "Resp");
        assert!(!service.methods[0].client_streaming);
        assert!(!service.methods[0].server_streaming);
    }

    #[test]
    fn test_get_schema_allow_list_filter() {
        let dir = initialized_project();
        let server = ProtomapServer::new();
        assert!(server.activate(&dir.path().to_string_lossy()).success);

        let response = server.get_schema(&GetSchemaRequest {
            message_types: Some(vec!["Req".to_string()]),
            ..Default::default()
        });
        assert!(response.success);
        let schema = response.schema.unwrap();
        assert_eq!(schema.messages.len(), 1);
        assert_eq!(schema.messages[0].name, "Req");
        assert_eq!(schema.stats.total_messages, 1);
    }

    #[test]
    fn test_get_schema_rejects_unknown_kind() {
        let dir = initialized_project();
        let server = ProtomapServer::new();
        assert!(server.activate(&dir.path().to_string_lossy()).success);

        let response = server.get_schema(&GetSchemaRequest {
            kind: Some("rpc".to_string()),
            ..Default::default()
        });
        assert!(!response.success);
        assert!(response.message.contains("rpc"));
    }

    #[test]
    fn test_failed_activation_keeps_previous_project() {
        let dir = initialized_project();
        let server = ProtomapServer::new();
        assert!(server.activate(&dir.path().to_string_lossy()).success);

        let empty = TempDir::new().unwrap();
        std::fs::write(
            empty.path().join(CONFIG_FILE_NAME),
            "proto_files:\n  - \"proto/**/*.proto\"\n",
        )
        .unwrap();
        let failed = server.activate(&empty.path().to_string_lossy());
        assert!(!failed.success);

        // The earlier project is still queryable.
        let list = server.list_services();
        assert!(list.success);
        assert_eq!(list.count, 1);
    }

    #[test]
    fn test_onboarding_creates_config_and_refuses_reinit() {
        let dir = TempDir::new().unwrap();
        let server = ProtomapServer::new();

        let first = server.onboarding(&dir.path().to_string_lossy());
        assert!(first.success, "{}", first.message);
        assert_eq!(first.config_file.as_deref(), Some(CONFIG_FILE_NAME));
        assert!(ProjectConfig::exists(dir.path()));

        let second = server.onboarding(&dir.path().to_string_lossy());
        assert!(!second.success);
        assert!(second.message.contains("already initialized"));
    }

    #[test]
    fn test_server_info() {
        let server = ProtomapServer::new();
        let info = server.get_info();
        assert_eq!(info.server_info.name, "protomap");
    }
}
