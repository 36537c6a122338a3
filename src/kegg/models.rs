//! Data models for KEGG query results

use serde::{Deserialize, Serialize};

/// A pathway entry resolved from a human-readable name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayMatch {
    /// KEGG pathway identifier (e.g. `path:hsa04210` or `hsa04210`)
    pub id: String,
    /// Pathway description as listed by KEGG
    pub description: String,
}

/// A gene entry parsed from a KEGG flat-file record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneRecord {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Outcome of looking up the genes of a pathway by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PathwayLookup {
    /// No pathway of the organism matched the name
    NotFound { query: String, organism: String },
    /// The pathway exists but KEGG links no genes to it
    NoGenes { pathway: PathwayMatch },
    /// Pathway with its gene records
    Found(PathwayProteins),
}

/// Genes/proteins belonging to a pathway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayProteins {
    pub pathway: PathwayMatch,
    pub organism: String,
    pub genes: Vec<GeneRecord>,
}

/// KEGG gene id with its UniProt accession
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProteinMapping {
    pub kegg_id: String,
    pub uniprot_id: String,
}

/// Proteins of a reference pathway mapped to UniProt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathwayUniprot {
    pub pathway_name: String,
    pub pathway_id: String,
    pub proteins: Vec<ProteinMapping>,
    pub uniprot_ids: Vec<String>,
}

/// Placeholder for genes without a UniProt cross reference
pub const UNKNOWN_UNIPROT: &str = "Unknown";
