//! End-to-end tests through the public crate API: initialize a project
//! on disk, activate it, and query it the way an MCP client would.

use std::fs;
use std::path::Path;

use tempfile::TempDir;

use protomap::mcp::{GetSchemaRequest, ProtomapServer, NO_PROJECT_MESSAGE};
use protomap::{ActiveProject, ProjectConfig, SchemaFilter};

const USER_PROTO: &str = r#"syntax = "proto3";

package shop.v1;

import "common/money.proto";

// A customer account.
message User {
  string id = 1;
  string email = 2;
  optional string display_name = 3;
  repeated common.Money balances = 4;
}

enum UserState {
  USER_STATE_UNSPECIFIED = 0;
  USER_STATE_ACTIVE = 1;
  USER_STATE_SUSPENDED = 2;
}

service UserService {
  // Look up a single user by id.
  rpc GetUser(GetUserRequest) returns (User);
  rpc WatchUsers(WatchUsersRequest) returns (stream User);
}

message GetUserRequest {
  string id = 1;
}

message WatchUsersRequest {}
"#;

const MONEY_PROTO: &str = r#"syntax = "proto3";

package common;

message Money {
  string currency = 1;
  int64 units = 2;
}
"#;

fn write_project(dir: &Path) {
    fs::create_dir_all(dir.join("proto/shop/v1")).unwrap();
    fs::create_dir_all(dir.join("vendor/common")).unwrap();
    fs::write(dir.join("proto/shop/v1/user.proto"), USER_PROTO).unwrap();
    fs::write(dir.join("vendor/common/money.proto"), MONEY_PROTO).unwrap();
    fs::write(
        dir.join(".protomap.yml"),
        "proto_files:\n  - \"proto/**/*.proto\"\n  - \"vendor/**/*.proto\"\nimport_paths:\n  - proto\n  - vendor\n",
    )
    .unwrap();
}

#[test]
fn activate_and_query_full_pipeline() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());

    let server = ProtomapServer::new();

    // Guarded before activation.
    let early = server.list_services();
    assert!(!early.success);
    assert_eq!(early.message, NO_PROJECT_MESSAGE);

    let activated = server.activate(&dir.path().to_string_lossy());
    assert!(activated.success, "{}", activated.message);
    assert_eq!(activated.files, 2);
    assert_eq!(activated.services, 1);
    assert_eq!(activated.messages, 4);
    assert_eq!(activated.enums, 1);

    let services = server.list_services();
    assert!(services.success);
    assert_eq!(services.count, 1);
    let svc = &services.services[0];
    assert_eq!(svc.name, "UserService");
    assert_eq!(svc.full_name, "shop.v1.UserService");
    assert_eq!(svc.methods.len(), 2);
    assert_eq!(svc.methods[0].description, "Look up a single user by id.");
    assert!(svc.methods[1].server_streaming);
    assert!(!svc.methods[1].client_streaming);
}

#[test]
fn get_schema_filters_compose() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());

    let server = ProtomapServer::new();
    assert!(server.activate(&dir.path().to_string_lossy()).success);

    // Name filter is case-insensitive and matches full names too.
    let by_name = server.get_schema(&GetSchemaRequest {
        name: Some("user".to_string()),
        ..Default::default()
    });
    assert!(by_name.success);
    let schema = by_name.schema.unwrap();
    assert!(schema.messages.iter().any(|m| m.name == "User"));
    assert!(schema.messages.iter().any(|m| m.name == "GetUserRequest"));
    assert!(schema.enums.iter().any(|e| e.name == "UserState"));
    assert_eq!(schema.services.len(), 1);

    // Kind filter restricts the scan to one category.
    let enums_only = server.get_schema(&GetSchemaRequest {
        kind: Some("enum".to_string()),
        ..Default::default()
    });
    assert!(enums_only.success);
    let schema = enums_only.schema.unwrap();
    assert!(schema.messages.is_empty());
    assert!(schema.services.is_empty());
    assert_eq!(schema.enums.len(), 1);
    assert_eq!(schema.stats.total_enums, 1);

    // Allow-lists are exact on short names.
    let money_only = server.get_schema(&GetSchemaRequest {
        message_types: Some(vec!["Money".to_string()]),
        ..Default::default()
    });
    let schema = money_only.schema.unwrap();
    assert_eq!(schema.messages.len(), 1);
    assert_eq!(schema.messages[0].full_name, "common.Money");
}

#[test]
fn field_details_survive_projection() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());

    let project = ActiveProject::activate(dir.path()).unwrap();
    let view = protomap::schema::project_schema(
        &project,
        &SchemaFilter {
            message_types: vec!["User".to_string()],
            ..Default::default()
        },
    );

    let user = &view.messages[0];
    assert_eq!(user.full_name, "shop.v1.User");
    assert_eq!(user.description, "A customer account.");

    let field = |name: &str| user.fields.iter().find(|f| f.name == name).unwrap();
    assert_eq!(field("id").type_name, "string");
    assert!(!field("id").repeated);
    assert!(!field("id").optional);
    assert!(field("display_name").optional);
    assert!(field("balances").repeated);
    assert_eq!(field("balances").type_name, "common.Money");
}

#[test]
fn activation_is_deterministic_across_runs() {
    let dir = TempDir::new().unwrap();
    write_project(dir.path());

    let first = ActiveProject::activate(dir.path()).unwrap();
    let second = ActiveProject::activate(dir.path()).unwrap();

    let names = |p: &ActiveProject| -> Vec<String> {
        p.files().iter().map(|f| f.name().to_string()).collect()
    };
    assert_eq!(names(&first), names(&second));

    let filter = SchemaFilter::default();
    let a = serde_json::to_string(&protomap::schema::project_schema(&first, &filter)).unwrap();
    let b = serde_json::to_string(&protomap::schema::project_schema(&second, &filter)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn init_then_activate_with_defaults() {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("proto")).unwrap();
    fs::write(
        dir.path().join("proto/ping.proto"),
        "syntax = \"proto3\";\nmessage Ping {}\n",
    )
    .unwrap();

    let server = ProtomapServer::new();
    let onboarded = server.onboarding(&dir.path().to_string_lossy());
    assert!(onboarded.success, "{}", onboarded.message);
    assert!(ProjectConfig::exists(dir.path()));

    // The written template's default glob picks up proto/.
    let activated = server.activate(&dir.path().to_string_lossy());
    assert!(activated.success, "{}", activated.message);
    assert_eq!(activated.files, 1);
    assert_eq!(activated.messages, 1);
}
