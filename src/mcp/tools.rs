//! MCP Tool definitions

use super::protocol::{InputSchema, ToolDefinition};
use serde_json::json;

/// Generate all tool definitions
pub fn all_tools() -> Vec<ToolDefinition> {
    let mut tools = Vec::new();
    tools.extend(kegg_tools());
    tools.extend(gene_tools());
    tools.extend(weather_tools());
    tools
}

fn schema(properties: serde_json::Value, required: &[&str]) -> InputSchema {
    InputSchema {
        schema_type: "object".to_string(),
        properties: Some(properties),
        required: Some(required.iter().map(|s| s.to_string()).collect()),
    }
}

// ============================================================================
// KEGG Tools (3)
// ============================================================================

fn kegg_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "kegg_pathway_proteins".to_string(),
            description: "Get proteins in a biological pathway from KEGG".to_string(),
            input_schema: schema(
                json!({
                    "pathway_name": {"type": "string", "description": "Name of the pathway (e.g., apoptosis)"}
                }),
                &["pathway_name"],
            ),
        },
        ToolDefinition {
            name: "get_pathway_proteins_from_kegg".to_string(),
            description: "Resolve a pathway name to its KEGG pathway for the configured organism and list its proteins mapped to UniProt accessions"
                .to_string(),
            input_schema: schema(
                json!({
                    "pathway_name": {"type": "string", "description": "Human-readable pathway name (e.g., N-glycan biosynthesis)"}
                }),
                &["pathway_name"],
            ),
        },
        ToolDefinition {
            name: "get_kegg_pathway_id".to_string(),
            description: "Resolve a pathway name to the organism-specific KEGG pathway id (e.g., hsa00510)"
                .to_string(),
            input_schema: schema(
                json!({
                    "pathway_name": {"type": "string", "description": "Human-readable pathway name"}
                }),
                &["pathway_name"],
            ),
        },
    ]
}

// ============================================================================
// Gene / Protein Tools (3)
// ============================================================================

fn gene_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "go_functional_similarity".to_string(),
            description: "Gets a list of genes that are similar to gene name according to their gene ontology"
                .to_string(),
            input_schema: schema(
                json!({
                    "gene_name": {"type": "string", "description": "Gene name to query the functional similarity"}
                }),
                &["gene_name"],
            ),
        },
        ToolDefinition {
            name: "get_proteins_that_are_in_two_lists".to_string(),
            description: "Return the proteins present in both input protein lists (case-insensitive)"
                .to_string(),
            input_schema: schema(
                json!({
                    "protein_list_1": {"type": "array", "items": {"type": "string"}, "description": "First protein list"},
                    "protein_list_2": {"type": "array", "items": {"type": "string"}, "description": "Second protein list"}
                }),
                &["protein_list_1", "protein_list_2"],
            ),
        },
        ToolDefinition {
            name: "check_uniprot_drug_links".to_string(),
            description: "Check whether proteins (UniProt accessions) are targeted by DrugBank drugs"
                .to_string(),
            input_schema: schema(
                json!({
                    "uniprot_ids": {"type": "array", "items": {"type": "string"}, "description": "UniProt accessions"}
                }),
                &["uniprot_ids"],
            ),
        },
    ]
}

// ============================================================================
// Weather Tools (2)
// ============================================================================

fn weather_tools() -> Vec<ToolDefinition> {
    vec![
        ToolDefinition {
            name: "get_alerts".to_string(),
            description: "Get weather alerts for a US state".to_string(),
            input_schema: schema(
                json!({
                    "state": {"type": "string", "description": "Two-letter US state code (e.g. CA, NY)"}
                }),
                &["state"],
            ),
        },
        ToolDefinition {
            name: "get_forecast".to_string(),
            description: "Get weather forecast for a location".to_string(),
            input_schema: schema(
                json!({
                    "latitude": {"type": "number", "description": "Latitude of the location"},
                    "longitude": {"type": "number", "description": "Longitude of the location"}
                }),
                &["latitude", "longitude"],
            ),
        },
    ]
}
