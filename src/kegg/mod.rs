//! KEGG pathway queries
//!
//! Resolves pathway names to KEGG identifiers and collects the genes/proteins
//! linked to them, either directly for an organism (`list` + `link` + `get`)
//! or through the reference map's orthology groups with UniProt mapping
//! (`find` + `link/ko` + `conv`).

pub mod client;
pub mod models;
pub mod parse;

pub use client::KeggClient;
pub use models::*;

/// Render a pathway lookup as the plain-text report returned to MCP clients
pub fn format_pathway_lookup(lookup: &PathwayLookup) -> String {
    match lookup {
        PathwayLookup::NotFound { query, organism } => format!(
            "No pathway found matching '{}' for organism {}",
            query, organism
        ),
        PathwayLookup::NoGenes { pathway } => format!(
            "No genes found in pathway {} ({})",
            pathway.description, pathway.id
        ),
        PathwayLookup::Found(result) => format_pathway_proteins(result),
    }
}

fn format_pathway_proteins(result: &PathwayProteins) -> String {
    let lines: Vec<String> = result
        .genes
        .iter()
        .map(|gene| match &gene.name {
            Some(name) => format!("{}: {}", gene.id, name),
            None => gene.id.clone(),
        })
        .collect();

    format!(
        "Pathway: {} ({})\nNumber of genes/proteins: {}\n\nProteins:\n{}",
        result.pathway.description,
        result.pathway.id,
        result.genes.len(),
        lines.join("\n")
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apoptosis() -> PathwayMatch {
        PathwayMatch {
            id: "path:hsa04210".into(),
            description: "Apoptosis - Homo sapiens (human)".into(),
        }
    }

    #[test]
    fn test_format_found() {
        let lookup = PathwayLookup::Found(PathwayProteins {
            pathway: apoptosis(),
            organism: "hsa".into(),
            genes: vec![
                GeneRecord {
                    id: "10018".into(),
                    name: Some("BCL2L11, BIM".into()),
                },
                GeneRecord {
                    id: "1439".into(),
                    name: None,
                },
            ],
        });

        assert_eq!(
            format_pathway_lookup(&lookup),
            "Pathway: Apoptosis - Homo sapiens (human) (path:hsa04210)\n\
Number of genes/proteins: 2\n\nProteins:\n10018: BCL2L11, BIM\n1439"
        );
    }

    #[test]
    fn test_format_not_found() {
        let lookup = PathwayLookup::NotFound {
            query: "ferroptosis".into(),
            organism: "hsa".into(),
        };
        assert_eq!(
            format_pathway_lookup(&lookup),
            "No pathway found matching 'ferroptosis' for organism hsa"
        );
    }

    #[test]
    fn test_format_no_genes() {
        let lookup = PathwayLookup::NoGenes {
            pathway: apoptosis(),
        };
        assert_eq!(
            format_pathway_lookup(&lookup),
            "No genes found in pathway Apoptosis - Homo sapiens (human) (path:hsa04210)"
        );
    }
}
