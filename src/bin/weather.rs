//! MCP Server Binary
//!
//! Runs the KEGG pathway tools, together with the NWS weather tools, as an
//! MCP server over stdio.
//!
//! # Usage
//!
//! ```bash
//! # Run directly
//! ./weather
//!
//! # Against a KEGG mirror, for mouse
//! KEGG_API_BASE=http://localhost:9000 KEGG_ORGANISM=mmu ./weather
//!
//! # With debug logging
//! RUST_LOG=debug ./weather
//! ```
//!
//! # MCP client integration
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "kegg": {
//!       "command": "/path/to/weather",
//!       "env": { "KEGG_ORGANISM": "hsa" }
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use clap::Parser;
use kegg_mcp::mcp::McpServer;
use kegg_mcp::{Config, Services};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// MCP server for KEGG pathway analysis
#[derive(Parser, Debug)]
#[command(name = "weather")]
#[command(about = "MCP server exposing KEGG, Gene Ontology, UniProt and NWS tools")]
#[command(version)]
struct Args {
    /// YAML config file (defaults to ./config.yaml)
    #[arg(long, env = "KEGG_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Name advertised to MCP clients
    #[arg(long, env = "MCP_SERVER_NAME")]
    server_name: Option<String>,

    /// KEGG organism code
    #[arg(long, env = "KEGG_ORGANISM")]
    organism: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Initialize logging (to stderr to keep stdout clean for MCP)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("kegg_mcp=info".parse()?))
        .init();

    let args = Args::parse();

    let mut config = Config::from_yaml_and_env(args.config.as_deref())?;
    if let Some(name) = args.server_name {
        config.server_name = name;
    }
    if let Some(organism) = args.organism {
        config.organism = organism;
    }

    warn!(
        "Entry point 'weather' serves the {} package (known name mismatch)",
        env!("CARGO_PKG_NAME")
    );
    info!("Server name: {}", config.server_name);
    info!("KEGG: {} (organism {})", config.kegg_api_base, config.organism);

    let services = match Services::new(config) {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to create upstream clients: {}", e);
            return Err(e);
        }
    };

    let mut server = McpServer::new(services);

    if let Err(e) = server.run().await {
        error!("MCP server error: {}", e);
        return Err(e);
    }

    Ok(())
}
