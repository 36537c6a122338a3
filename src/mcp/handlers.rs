//! MCP Tool handlers
//!
//! Implements the actual logic for each MCP tool.

use crate::analysis;
use crate::kegg::{self, KeggClient};
use crate::ontology::{GoClient, DEFAULT_MAX_TERMS};
use crate::Services;
use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::sync::Arc;

/// Handles MCP tool calls
pub struct ToolHandler {
    services: Arc<Services>,
}

impl ToolHandler {
    pub fn new(services: Arc<Services>) -> Self {
        Self { services }
    }

    fn kegg(&self) -> &KeggClient {
        &self.services.kegg
    }

    fn go(&self) -> &GoClient {
        &self.services.go
    }

    fn organism(&self) -> &str {
        &self.services.config.organism
    }

    /// Handle a tool call and return the result as JSON
    ///
    /// Plain-text reports come back as `Value::String`.
    pub async fn handle(&self, name: &str, args: Option<Value>) -> Result<Value> {
        let args = args.unwrap_or(json!({}));

        match name {
            // KEGG
            "kegg_pathway_proteins" => self.kegg_pathway_proteins(args).await,
            "get_pathway_proteins_from_kegg" => self.get_pathway_proteins_from_kegg(args).await,
            "get_kegg_pathway_id" => self.get_kegg_pathway_id(args).await,

            // Genes / proteins
            "go_functional_similarity" => self.go_functional_similarity(args).await,
            // Earlier clients call this by its misspelled name
            "get_proteins_that_are_in_two_lists" | "get_proteins_that_are_in_too_lists" => {
                self.proteins_in_two_lists(args)
            }
            "check_uniprot_drug_links" => self.check_uniprot_drug_links(args).await,

            // Weather
            "get_alerts" => self.get_alerts(args).await,
            "get_forecast" => self.get_forecast(args).await,

            _ => Err(anyhow!("Unknown tool: {}", name)),
        }
    }

    // ========================================================================
    // KEGG Handlers
    // ========================================================================

    async fn kegg_pathway_proteins(&self, args: Value) -> Result<Value> {
        let pathway_name = required_str(&args, "pathway_name")?;

        let lookup = self
            .kegg()
            .pathway_proteins(pathway_name, self.organism())
            .await?;

        Ok(Value::String(kegg::format_pathway_lookup(&lookup)))
    }

    async fn get_pathway_proteins_from_kegg(&self, args: Value) -> Result<Value> {
        let pathway_name = required_str(&args, "pathway_name")?;

        let result = self
            .kegg()
            .pathway_uniprot(pathway_name, self.organism())
            .await?;

        Ok(serde_json::to_value(result)?)
    }

    async fn get_kegg_pathway_id(&self, args: Value) -> Result<Value> {
        let pathway_name = required_str(&args, "pathway_name")?;

        let pathway_id = self
            .kegg()
            .resolve_reference_pathway(pathway_name, self.organism())
            .await?;

        Ok(Value::String(pathway_id))
    }

    // ========================================================================
    // Gene / Protein Handlers
    // ========================================================================

    async fn go_functional_similarity(&self, args: Value) -> Result<Value> {
        let gene_name = required_str(&args, "gene_name")?;
        let genes = self.go().similar_genes(gene_name, DEFAULT_MAX_TERMS).await;
        Ok(json!(genes))
    }

    fn proteins_in_two_lists(&self, args: Value) -> Result<Value> {
        let list_1 = required_str_list(&args, "protein_list_1")?;
        let list_2 = required_str_list(&args, "protein_list_2")?;
        Ok(json!(analysis::common_proteins(&list_1, &list_2)))
    }

    async fn check_uniprot_drug_links(&self, args: Value) -> Result<Value> {
        let ids = required_str_list(&args, "uniprot_ids")?;
        let links = self.services.uniprot.drug_links(&ids).await;
        Ok(serde_json::to_value(links)?)
    }

    // ========================================================================
    // Weather Handlers
    // ========================================================================

    async fn get_alerts(&self, args: Value) -> Result<Value> {
        let state = required_str(&args, "state")?;
        Ok(Value::String(self.services.nws.alerts(state).await))
    }

    async fn get_forecast(&self, args: Value) -> Result<Value> {
        let latitude = required_f64(&args, "latitude")?;
        let longitude = required_f64(&args, "longitude")?;
        Ok(Value::String(self.services.nws.forecast(latitude, longitude).await))
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn required_str<'a>(args: &'a Value, field: &str) -> Result<&'a str> {
    args.get(field)
        .and_then(|v| v.as_str())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| anyhow!("{} is required", field))
}

fn required_f64(args: &Value, field: &str) -> Result<f64> {
    let value = args
        .get(field)
        .ok_or_else(|| anyhow!("{} is required", field))?;

    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| anyhow!("{} must be a number", field))
}

fn required_str_list(args: &Value, field: &str) -> Result<Vec<String>> {
    let items = args
        .get(field)
        .ok_or_else(|| anyhow!("{} is required", field))?
        .as_array()
        .ok_or_else(|| anyhow!("{} must be an array of strings", field))?;

    items
        .iter()
        .map(|v| {
            v.as_str()
                .map(|s| s.to_string())
                .ok_or_else(|| anyhow!("{} must be an array of strings", field))
        })
        .collect()
}
