//! Parsers for KEGG REST text responses
//!
//! KEGG answers `list`, `find`, `link` and `conv` with tab separated pairs and
//! `get` with flat-file records keyed by a left-aligned field name.

use super::models::{GeneRecord, PathwayMatch};

/// Split non-empty lines into trimmed `(first, second)` column pairs.
///
/// Lines with fewer than two tab-separated columns are skipped.
pub fn parse_tab_pairs(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut parts = line.split('\t');
            let first = parts.next()?;
            let second = parts.next()?;
            Some((first.trim().to_string(), second.trim().to_string()))
        })
        .collect()
}

/// Find the first pathway of a `list/pathway/{org}` response whose line
/// contains `name`, case-insensitively.
pub fn find_pathway_in_list(text: &str, name: &str) -> Option<PathwayMatch> {
    let needle = name.to_lowercase();

    text.lines()
        .filter(|line| !line.is_empty() && line.to_lowercase().contains(&needle))
        .find_map(|line| {
            let mut parts = line.split('\t');
            let id = parts.next()?.trim();
            let description = parts.next()?.trim();
            Some(PathwayMatch {
                id: id.to_string(),
                description: description.to_string(),
            })
        })
}

/// Parse `ENTRY` / `NAME` fields out of concatenated flat-file gene records.
pub fn parse_gene_entries(text: &str) -> Vec<GeneRecord> {
    let mut records = Vec::new();
    let mut current: Option<GeneRecord> = None;

    for line in text.lines() {
        if line.starts_with("ENTRY") {
            if let Some(done) = current.take() {
                records.push(done);
            }
            current = line.split_whitespace().nth(1).map(|id| GeneRecord {
                id: id.to_string(),
                name: None,
            });
        } else if let Some(rest) = line.strip_prefix("NAME") {
            if let Some(record) = current.as_mut() {
                record.name = Some(rest.trim().to_string());
            }
        }
    }

    if let Some(done) = current {
        records.push(done);
    }

    records
}

/// Turn the first `path:mapNNNNN` hit of a `find/pathway` response into the
/// organism-specific pathway id (`hsaNNNNN`).
pub fn reference_to_organism(text: &str, organism: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let first = line.split('\t').next()?;
        let (_, number) = first.split_once("path:map")?;
        let number = number.trim();
        if number.is_empty() {
            return None;
        }
        Some(format!("{}{}", organism, number))
    })
}

/// Map an organism pathway id back to its reference map id (`hsa00510` -> `map00510`).
pub fn organism_to_reference(pathway_id: &str, organism: &str) -> String {
    let bare = pathway_id.strip_prefix("path:").unwrap_or(pathway_id);
    match bare.strip_prefix(organism) {
        Some(number) => format!("map{}", number),
        None => bare.to_string(),
    }
}

/// Parse a `conv/uniprot` response into `(kegg_id, uniprot_id)` pairs with
/// database prefixes removed (`hsa:10` -> `10`, `up:P12345` -> `P12345`).
pub fn parse_uniprot_conv(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('\t').collect();
            if parts.len() != 2 {
                return None;
            }
            let kegg = strip_db_prefix(parts[0].trim())?;
            let uniprot = strip_db_prefix(parts[1].trim())?;
            Some((kegg.to_string(), uniprot.to_string()))
        })
        .collect()
}

fn strip_db_prefix(value: &str) -> Option<&str> {
    value.split_once(':').map(|(_, id)| id)
}
