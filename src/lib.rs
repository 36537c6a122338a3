//! KEGG MCP
//!
//! Pathway analysis tools exposed over the Model Context Protocol:
//! - KEGG REST for pathway lookup, gene listing and UniProt mapping
//! - Gene Ontology annotations for functional similarity
//! - UniProt cross references for drug targets
//! - NWS weather alerts and forecasts, bundled with the `weather` entry point
//! - A small HTML UI over the same queries

pub mod analysis;
pub mod api;
pub mod http;
pub mod kegg;
pub mod mcp;
pub mod ontology;
pub mod templates;
pub mod uniprot;
pub mod weather;

#[cfg(test)]
pub(crate) mod test_helpers;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub upstream: UpstreamYamlConfig,
    pub kegg: KeggYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    pub port: u16,
    /// Name advertised to MCP clients in `initialize`
    pub name: String,
    pub templates_dir: Option<PathBuf>,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            name: "weather".into(),
            templates_dir: None,
        }
    }
}

/// Upstream service endpoints
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamYamlConfig {
    pub kegg: String,
    pub mygene: String,
    pub gene_ontology: String,
    pub uniprot: String,
    pub nws: String,
    pub timeout_secs: u64,
}

impl Default for UpstreamYamlConfig {
    fn default() -> Self {
        Self {
            kegg: "https://rest.kegg.jp".into(),
            mygene: "http://mygene.info/v3".into(),
            gene_ontology: "http://api.geneontology.org/api".into(),
            uniprot: "https://rest.uniprot.org/uniprotkb".into(),
            nws: "https://api.weather.gov".into(),
            timeout_secs: 30,
        }
    }
}

/// KEGG query defaults
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeggYamlConfig {
    /// KEGG organism code
    pub organism: String,
}

impl Default for KeggYamlConfig {
    fn default() -> Self {
        Self {
            organism: "hsa".into(),
        }
    }
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub kegg_api_base: String,
    pub mygene_api_base: String,
    pub go_api_base: String,
    pub uniprot_api_base: String,
    pub nws_api_base: String,
    pub organism: String,
    pub request_timeout_secs: u64,
    pub server_name: String,
    pub server_port: u16,
    pub templates_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_yaml(YamlConfig::default())
    }
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries "config.yaml" in CWD. If the file doesn't
    /// exist, falls back to pure env var / defaults.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let base = Self::from_yaml(Self::load_yaml(yaml_path));

        let request_timeout_secs = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(raw) => raw
                .parse()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS must be an integer, got {raw:?}"))?,
            Err(_) => base.request_timeout_secs,
        };

        Ok(Self {
            kegg_api_base: std::env::var("KEGG_API_BASE").unwrap_or(base.kegg_api_base),
            mygene_api_base: std::env::var("MYGENE_API_BASE").unwrap_or(base.mygene_api_base),
            go_api_base: std::env::var("GO_API_BASE").unwrap_or(base.go_api_base),
            uniprot_api_base: std::env::var("UNIPROT_API_BASE").unwrap_or(base.uniprot_api_base),
            nws_api_base: std::env::var("NWS_API_BASE").unwrap_or(base.nws_api_base),
            organism: std::env::var("KEGG_ORGANISM").unwrap_or(base.organism),
            request_timeout_secs,
            server_name: std::env::var("MCP_SERVER_NAME").unwrap_or(base.server_name),
            server_port: std::env::var("SERVER_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(base.server_port),
            templates_dir: std::env::var("TEMPLATES_DIR")
                .ok()
                .map(PathBuf::from)
                .or(base.templates_dir),
        })
    }

    fn from_yaml(yaml: YamlConfig) -> Self {
        Self {
            kegg_api_base: yaml.upstream.kegg,
            mygene_api_base: yaml.upstream.mygene,
            go_api_base: yaml.upstream.gene_ontology,
            uniprot_api_base: yaml.upstream.uniprot,
            nws_api_base: yaml.upstream.nws,
            organism: yaml.kegg.organism,
            request_timeout_secs: yaml.upstream.timeout_secs,
            server_name: yaml.server.name,
            server_port: yaml.server.port,
            templates_dir: yaml.server.templates_dir,
        }
    }

    /// Try to load and parse a YAML config file. Returns defaults on any failure.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let default_path = Path::new("config.yaml");
        let path = yaml_path.unwrap_or(default_path);

        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_yaml::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    YamlConfig::default()
                }
            },
            Err(_) => {
                tracing::debug!(
                    "No config file at {}, using env vars / defaults",
                    path.display()
                );
                YamlConfig::default()
            }
        }
    }
}

/// Upstream clients shared by the MCP server and the web UI
pub struct Services {
    pub kegg: kegg::KeggClient,
    pub go: ontology::GoClient,
    pub uniprot: uniprot::UniprotClient,
    pub nws: weather::NwsClient,
    pub config: Arc<Config>,
}

impl Services {
    /// Build all clients over one pooled HTTP client
    pub fn new(config: Config) -> Result<Self> {
        let http = http::build_client(Duration::from_secs(config.request_timeout_secs))?;

        Ok(Self {
            kegg: kegg::KeggClient::new(http.clone(), config.kegg_api_base.clone()),
            go: ontology::GoClient::new(
                http.clone(),
                config.mygene_api_base.clone(),
                config.go_api_base.clone(),
            ),
            uniprot: uniprot::UniprotClient::new(http.clone(), config.uniprot_api_base.clone()),
            nws: weather::NwsClient::new(http, config.nws_api_base.clone()),
            config: Arc::new(config),
        })
    }
}

/// Start the web UI / JSON API server
pub async fn start_server(config: Config) -> Result<()> {
    let port = config.server_port;
    let templates = templates::TemplateEngine::with_overrides(config.templates_dir.as_deref())
        .context("Failed to load templates")?;
    let services = Arc::new(Services::new(config)?);

    let state = Arc::new(api::handlers::ServerState {
        services,
        templates,
    });
    let app = api::create_router(state);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    tracing::info!("Web UI listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
