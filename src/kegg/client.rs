//! KEGG REST client

use super::models::*;
use super::parse;
use crate::http::{get_text, join_url, UpstreamError, UpstreamResult};
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Number of entries KEGG accepts per `get` / `conv` request
pub const BATCH_SIZE: usize = 10;

/// In-flight requests when fanning out over batches or orthology groups
const FAN_OUT: usize = 4;

/// Client for the KEGG REST API (`https://rest.kegg.jp`)
#[derive(Clone)]
pub struct KeggClient {
    http: reqwest::Client,
    base_url: String,
}

impl KeggClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn get(&self, path: &str) -> UpstreamResult<String> {
        let url = join_url(&self.base_url, path);
        debug!(url = %url, "KEGG request");
        get_text(&self.http, &url).await
    }

    // ========================================================================
    // Pathway lookup by organism listing
    // ========================================================================

    /// Resolve a pathway name against the organism's pathway list
    pub async fn find_pathway(
        &self,
        name: &str,
        organism: &str,
    ) -> UpstreamResult<Option<PathwayMatch>> {
        let text = self.get(&format!("list/pathway/{}", organism)).await?;
        Ok(parse::find_pathway_in_list(text.trim(), name))
    }

    /// Gene ids (`hsa:10018`, ...) linked to a pathway
    pub async fn pathway_gene_ids(
        &self,
        pathway_id: &str,
        organism: &str,
    ) -> UpstreamResult<Vec<String>> {
        let text = self
            .get(&format!("link/{}/{}", organism, pathway_id))
            .await?;
        Ok(parse::parse_tab_pairs(&text)
            .into_iter()
            .map(|(_, gene)| gene)
            .collect())
    }

    /// Fetch flat-file records for genes, `BATCH_SIZE` ids per request.
    ///
    /// A failing batch is logged and skipped; order of the input is kept.
    pub async fn gene_records(&self, gene_ids: &[String]) -> Vec<GeneRecord> {
        let batches: Vec<String> = gene_ids
            .chunks(BATCH_SIZE)
            .map(|chunk| chunk.join("+"))
            .collect();

        let results: Vec<Vec<GeneRecord>> = stream::iter(batches)
            .map(|batch| async move {
                match self.get(&format!("get/{}", batch)).await {
                    Ok(text) => parse::parse_gene_entries(&text),
                    Err(e) => {
                        warn!("Skipping gene batch {}: {}", batch, e);
                        Vec::new()
                    }
                }
            })
            .buffered(FAN_OUT)
            .collect()
            .await;

        results.into_iter().flatten().collect()
    }

    /// Look up a pathway by name and collect its genes with their names
    pub async fn pathway_proteins(
        &self,
        name: &str,
        organism: &str,
    ) -> UpstreamResult<PathwayLookup> {
        let Some(pathway) = self.find_pathway(name, organism).await? else {
            info!("No pathway matching '{}' for {}", name, organism);
            return Ok(PathwayLookup::NotFound {
                query: name.to_string(),
                organism: organism.to_string(),
            });
        };

        let gene_ids = self.pathway_gene_ids(&pathway.id, organism).await?;
        info!("Pathway {} links {} genes", pathway.id, gene_ids.len());

        if gene_ids.is_empty() {
            return Ok(PathwayLookup::NoGenes { pathway });
        }

        let genes = self.gene_records(&gene_ids).await;
        if genes.is_empty() {
            return Ok(PathwayLookup::NoGenes { pathway });
        }

        Ok(PathwayLookup::Found(PathwayProteins {
            pathway,
            organism: organism.to_string(),
            genes,
        }))
    }

    // ========================================================================
    // Reference pathway -> orthology -> organism genes -> UniProt
    // ========================================================================

    /// Resolve a pathway name through `find/pathway` to an organism pathway id
    pub async fn resolve_reference_pathway(
        &self,
        name: &str,
        organism: &str,
    ) -> UpstreamResult<String> {
        let encoded = urlencoding::encode(name);
        let text = self.get(&format!("find/pathway/{}", encoded)).await?;
        parse::reference_to_organism(text.trim(), organism)
            .ok_or_else(|| UpstreamError::PathwayNotFound(name.to_string()))
    }

    /// Organism genes of a pathway, reached through its KEGG orthology groups.
    ///
    /// Orthology groups whose lookup fails are skipped.
    pub async fn pathway_genes_via_orthology(
        &self,
        pathway_id: &str,
        organism: &str,
    ) -> UpstreamResult<Vec<String>> {
        let map_id = parse::organism_to_reference(pathway_id, organism);
        let text = self.get(&format!("link/ko/{}", map_id)).await?;

        let ko_ids: Vec<String> = parse::parse_tab_pairs(&text)
            .into_iter()
            .map(|(_, ko)| ko)
            .collect();

        if ko_ids.is_empty() {
            warn!("No KO terms found for {}", map_id);
            return Ok(Vec::new());
        }

        let per_ko: Vec<Vec<String>> = stream::iter(ko_ids)
            .map(|ko| async move {
                match self.get(&format!("link/{}/{}", organism, ko)).await {
                    Ok(text) => parse::parse_tab_pairs(&text)
                        .into_iter()
                        .map(|(_, gene)| gene)
                        .collect(),
                    Err(e) => {
                        debug!("No {} genes for {}: {}", organism, ko, e);
                        Vec::new()
                    }
                }
            })
            .buffered(FAN_OUT)
            .collect()
            .await;

        Ok(per_ko.into_iter().flatten().collect())
    }

    /// Map KEGG gene ids to UniProt accessions, `BATCH_SIZE` ids per request.
    ///
    /// Returns the mapping keyed by the bare gene id (no organism prefix) and
    /// the accessions in response order.
    pub async fn convert_to_uniprot(
        &self,
        gene_ids: &[String],
    ) -> (HashMap<String, String>, Vec<String>) {
        let batches: Vec<String> = gene_ids
            .chunks(BATCH_SIZE)
            .map(|chunk| chunk.join("+"))
            .collect();

        let results: Vec<Vec<(String, String)>> = stream::iter(batches)
            .map(|batch| async move {
                match self.get(&format!("conv/uniprot/{}", batch)).await {
                    Ok(text) => parse::parse_uniprot_conv(&text),
                    Err(e) => {
                        warn!("Skipping UniProt conversion batch {}: {}", batch, e);
                        Vec::new()
                    }
                }
            })
            .buffered(FAN_OUT)
            .collect()
            .await;

        let mut mapping = HashMap::new();
        let mut accessions = Vec::new();
        for (kegg_id, uniprot_id) in results.into_iter().flatten() {
            accessions.push(uniprot_id.clone());
            mapping.insert(kegg_id, uniprot_id);
        }

        (mapping, accessions)
    }

    /// Resolve a pathway name and list its proteins with UniProt accessions
    pub async fn pathway_uniprot(
        &self,
        name: &str,
        organism: &str,
    ) -> UpstreamResult<PathwayUniprot> {
        let pathway_id = self.resolve_reference_pathway(name, organism).await?;
        info!("Resolved '{}' to {}", name, pathway_id);

        let gene_ids = self
            .pathway_genes_via_orthology(&pathway_id, organism)
            .await?;
        info!("Retrieved {} gene ids for {}", gene_ids.len(), pathway_id);

        let (mapping, uniprot_ids) = self.convert_to_uniprot(&gene_ids).await;
        info!("Mapped {} genes to UniProt", mapping.len());

        let prefix = format!("{}:", organism);
        let proteins = gene_ids
            .into_iter()
            .map(|kegg_id| {
                let bare = kegg_id.strip_prefix(&prefix).unwrap_or(&kegg_id);
                let uniprot_id = mapping
                    .get(bare)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_UNIPROT.to_string());
                ProteinMapping {
                    kegg_id,
                    uniprot_id,
                }
            })
            .collect();

        Ok(PathwayUniprot {
            pathway_name: name.to_string(),
            pathway_id,
            proteins,
            uniprot_ids,
        })
    }
}
