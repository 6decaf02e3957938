//! MCP (Model Context Protocol) server for protomap.
//!
//! Exposes the protobuf project pipeline as MCP tools invocable by AI
//! assistants. The server runs over stdio and provides:
//!
//! - `activate_project`: compile a project's proto sources
//! - `list_services`: enumerate services of the active project
//! - `get_schema`: filtered schema views (messages, services, enums)
//! - `onboarding`: write a starter configuration file
//!
//! # Architecture
//!
//! ```text
//! MCP Request → protomap pipeline → MCP Response
//!     ↓               ↓                 ↓
//! JSON-RPC      config/discover     JSON-RPC
//! over stdio    compile/project     over stdio
//! ```
//!
//! # Usage
//!
//! ```bash
//! protomap serve
//! ```

mod server;

pub use server::{
    ActivateProjectRequest, ActivateProjectResponse, GetSchemaRequest, GetSchemaResponse,
    ListServicesResponse, OnboardingRequest, OnboardingResponse, ProtomapServer,
    NO_PROJECT_MESSAGE,
};
