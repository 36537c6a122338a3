//! Test helper factories
//!
//! Builds `Services` whose upstream clients all point at one mock server,
//! each under its own path prefix.

use crate::{Config, Services};
use std::sync::Arc;

/// Config pointing every upstream at `base`:
/// `/kegg`, `/mygene`, `/go`, `/uniprot` and `/nws`
pub fn config_for(base: &str) -> Config {
    Config {
        kegg_api_base: format!("{base}/kegg"),
        mygene_api_base: format!("{base}/mygene"),
        go_api_base: format!("{base}/go"),
        uniprot_api_base: format!("{base}/uniprot"),
        nws_api_base: format!("{base}/nws"),
        organism: "hsa".to_string(),
        request_timeout_secs: 5,
        server_name: "weather".to_string(),
        server_port: 0,
        templates_dir: None,
    }
}

/// Services for a mock upstream at `base`
pub fn services_for(base: &str) -> Arc<Services> {
    Arc::new(Services::new(config_for(base)).expect("build test services"))
}
