//! UniProt drug target lookup
//!
//! Reports which proteins are targeted by drugs, according to the DrugBank
//! cross references of their UniProtKB entries.

use crate::http::{join_url, read_json, send_checked};
use futures::stream::{self, StreamExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

const FAN_OUT: usize = 4;

/// Drug information for a single UniProt accession
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrugLinks {
    pub targeted: bool,
    pub drugs: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct UniprotEntry {
    #[serde(rename = "uniProtKBCrossReferences", default)]
    cross_references: Vec<CrossReference>,
}

#[derive(Debug, Deserialize)]
struct CrossReference {
    database: Option<String>,
    #[serde(default)]
    properties: Vec<Property>,
}

#[derive(Debug, Deserialize)]
struct Property {
    key: Option<String>,
    value: Option<String>,
}

impl UniprotEntry {
    fn drugbank_names(self) -> Vec<String> {
        self.cross_references
            .into_iter()
            .filter(|r| r.database.as_deref() == Some("DrugBank"))
            .flat_map(|r| r.properties)
            .filter(|p| p.key.as_deref() == Some("GenericName"))
            .filter_map(|p| p.value)
            .collect()
    }
}

/// Client for the UniProtKB REST API
#[derive(Clone)]
pub struct UniprotClient {
    http: reqwest::Client,
    base_url: String,
}

impl UniprotClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// DrugBank drugs targeting one accession; any upstream failure counts as untargeted
    pub async fn drug_links_for(&self, accession: &str) -> DrugLinks {
        let url = join_url(&self.base_url, &format!("{}.json", accession));

        let entry: UniprotEntry = match send_checked(self.http.get(&url), &url).await {
            Ok(response) => match read_json(response, &url).await {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("Unreadable UniProt entry {}: {}", accession, e);
                    return DrugLinks::default();
                }
            },
            Err(e) => {
                debug!("UniProt lookup failed for {}: {}", accession, e);
                return DrugLinks::default();
            }
        };

        let drugs = entry.drugbank_names();
        DrugLinks {
            targeted: !drugs.is_empty(),
            drugs,
        }
    }

    /// Drug links for each accession, keyed by accession in input order
    pub async fn drug_links(&self, accessions: &[String]) -> IndexMap<String, DrugLinks> {
        stream::iter(accessions.iter().cloned())
            .map(|accession| async move {
                let links = self.drug_links_for(&accession).await;
                (accession, links)
            })
            .buffered(FAN_OUT)
            .collect()
            .await
    }
}
