//! protomap CLI - protobuf project intelligence over MCP
//!
//! Entry point for the protomap server and its setup helper:
//!
//! 1. `protomap serve` (the default): run the MCP server over stdio.
//!    The server communicates via JSON-RPC and exposes the
//!    `activate_project`, `list_services`, `get_schema`, and
//!    `onboarding` tools.
//! 2. `protomap init [path]`: write a default `.protomap.yml`
//!    configuration into a project directory without starting a server.
//!
//! All diagnostics go to stderr; stdout is reserved for the MCP framing.

use anyhow::Result;
use clap::{Parser, Subcommand};
use rmcp::{transport::stdio, ServiceExt};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use protomap::mcp::ProtomapServer;

/// Protobuf project intelligence over MCP
///
/// protomap compiles a protobuf project's .proto sources into a
/// descriptor artifact and answers structured schema queries about its
/// services, messages, and enums.
///
/// Examples:
///   protomap                 # Serve MCP over stdio (default)
///   protomap serve           # Same, explicitly
///   protomap init            # Write .protomap.yml into the current directory
///   protomap init ./api      # Write .protomap.yml into ./api
#[derive(Parser, Debug)]
#[command(name = "protomap")]
#[command(version)]
#[command(about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the MCP server over stdio
    Serve,

    /// Initialize a project configuration file
    Init {
        /// Project directory to initialize
        ///
        /// A default .protomap.yml is written here. Refuses to
        /// overwrite an existing configuration.
        #[arg(value_name = "PATH", default_value = ".")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs must not touch stdout: that stream carries the MCP framing.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve().await,
        Command::Init { path } => init(&path),
    }
}

/// Run the MCP server until the client disconnects.
async fn serve() -> Result<()> {
    let service = ProtomapServer::new().serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

/// Write the default configuration template into `path`.
fn init(path: &PathBuf) -> Result<()> {
    let server = ProtomapServer::new();
    let response = server.onboarding(&path.to_string_lossy());
    if response.success {
        println!("{}", response.message);
        Ok(())
    } else {
        Err(anyhow::anyhow!(response.message))
    }
}
