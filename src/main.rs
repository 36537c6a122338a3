//! KEGG MCP - Main Server
//!
//! Runs the pathway tools either as the web UI / JSON API or as an MCP
//! server over stdio.

use anyhow::Result;
use clap::{Parser, Subcommand};
use kegg_mcp::{mcp::McpServer, Config, Services};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "kegg-mcp")]
#[command(about = "KEGG pathway analysis tools over MCP and HTTP")]
#[command(version)]
struct Cli {
    /// Path to a YAML config file (defaults to ./config.yaml)
    #[arg(long, env = "KEGG_MCP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web UI and JSON API
    Serve {
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory with template overrides
        #[arg(long)]
        templates_dir: Option<PathBuf>,
    },

    /// Run the MCP server over stdio
    Mcp,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // MCP mode owns stdout, so logs always go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,kegg_mcp=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::from_yaml_and_env(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve {
            port,
            templates_dir,
        } => {
            if let Some(port) = port {
                config.server_port = port;
            }
            if let Some(dir) = templates_dir {
                config.templates_dir = Some(dir);
            }
            kegg_mcp::start_server(config).await
        }
        Commands::Mcp => {
            let services = Arc::new(Services::new(config)?);
            McpServer::new(services).run().await
        }
    }
}
