//! Gene Ontology functional similarity
//!
//! A gene is resolved to its HGNC identifier through MyGene.info, its GO
//! annotations are fetched from the Gene Ontology API, and the genes sharing
//! the first few annotations are reported as functionally similar.

use crate::http::{join_url, read_json, send_checked, UpstreamResult};
use futures::stream::{self, StreamExt};
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// GO terms consulted per query
pub const DEFAULT_MAX_TERMS: usize = 3;

/// Genes requested per GO term
pub const DEFAULT_GENES_PER_TERM: usize = 100;

#[derive(Debug, Deserialize)]
struct MyGeneQuery {
    #[serde(default)]
    hits: Vec<MyGeneHit>,
}

#[derive(Debug, Deserialize)]
struct MyGeneHit {
    #[serde(rename = "HGNC")]
    hgnc: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct Associations {
    #[serde(default)]
    associations: Vec<Association>,
}

#[derive(Debug, Deserialize)]
struct Association {
    object: Option<Entity>,
    subject: Option<Entity>,
}

#[derive(Debug, Deserialize)]
struct Entity {
    id: Option<String>,
    label: Option<String>,
}

/// Client for MyGene.info and the Gene Ontology API
#[derive(Clone)]
pub struct GoClient {
    http: reqwest::Client,
    mygene_base: String,
    go_base: String,
}

impl GoClient {
    pub fn new(
        http: reqwest::Client,
        mygene_base: impl Into<String>,
        go_base: impl Into<String>,
    ) -> Self {
        Self {
            http,
            mygene_base: mygene_base.into(),
            go_base: go_base.into(),
        }
    }

    /// HGNC identifier (`HGNC:11998`) for a human gene symbol
    pub async fn hgnc_id(&self, symbol: &str) -> UpstreamResult<Option<String>> {
        let url = join_url(&self.mygene_base, "query");
        let request = self.http.get(&url).query(&[
            ("q", symbol),
            ("species", "human"),
            ("fields", "HGNC"),
        ]);
        let response = send_checked(request, &url).await?;
        let body: MyGeneQuery = read_json(response, &url).await?;

        let id = body
            .hits
            .into_iter()
            .next()
            .and_then(|hit| hit.hgnc)
            .and_then(|value| match value {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .map(|id| format!("HGNC:{}", id));

        Ok(id)
    }

    /// GO term ids annotated to a gene
    pub async fn go_terms(&self, gene_id: &str) -> UpstreamResult<Vec<String>> {
        let url = join_url(&self.go_base, &format!("bioentity/gene/{}/function", gene_id));
        let response = send_checked(self.http.get(&url), &url).await?;
        let body: Associations = read_json(response, &url).await?;

        Ok(body
            .associations
            .into_iter()
            .filter_map(|a| a.object.and_then(|o| o.id))
            .collect())
    }

    /// Gene symbols annotated with a GO term
    pub async fn genes_for_term(&self, term: &str, limit: usize) -> UpstreamResult<Vec<String>> {
        let url = join_url(&self.go_base, &format!("bioentity/function/{}/genes", term));
        let rows = limit.to_string();
        let request = self
            .http
            .get(&url)
            .query(&[("rows", rows.as_str()), ("facet", "false")]);
        let response = send_checked(request, &url).await?;
        let body: Associations = read_json(response, &url).await?;

        Ok(body
            .associations
            .into_iter()
            .filter_map(|a| a.subject.and_then(|s| s.label))
            .collect())
    }

    /// Genes sharing any of the first `max_terms` GO annotations of `symbol`.
    ///
    /// The result is sorted, deduplicated and excludes `symbol` itself.
    /// Upstream failures are logged and yield fewer (or no) genes.
    pub async fn similar_genes(&self, symbol: &str, max_terms: usize) -> Vec<String> {
        info!("Finding genes functionally similar to {}", symbol);

        let gene_id = match self.hgnc_id(symbol).await {
            Ok(Some(id)) => id,
            Ok(None) => {
                warn!("Could not find HGNC ID for {}", symbol);
                return Vec::new();
            }
            Err(e) => {
                warn!("Error fetching gene ID for {}: {}", symbol, e);
                return Vec::new();
            }
        };

        let terms = match self.go_terms(&gene_id).await {
            Ok(terms) => terms,
            Err(e) => {
                warn!("Error fetching GO terms for {}: {}", gene_id, e);
                return Vec::new();
            }
        };
        info!("Found {} GO terms associated with {}", terms.len(), symbol);

        let per_term: Vec<Vec<String>> = stream::iter(terms.into_iter().take(max_terms))
            .map(|term| async move {
                debug!("Fetching genes for GO term {}", term);
                match self.genes_for_term(&term, DEFAULT_GENES_PER_TERM).await {
                    Ok(genes) => genes,
                    Err(e) => {
                        warn!("Error fetching genes for {}: {}", term, e);
                        Vec::new()
                    }
                }
            })
            .buffered(max_terms.max(1))
            .collect()
            .await;

        let mut genes: BTreeSet<String> = per_term.into_iter().flatten().collect();
        genes.remove(symbol);
        genes.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::build_client;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GoClient {
        GoClient::new(
            build_client(Duration::from_secs(5)).unwrap(),
            format!("{}/v3", server.uri()),
            format!("{}/api", server.uri()),
        )
    }

    async fn mount_term(server: &MockServer, term: &str, genes: &[&str]) {
        let associations: Vec<_> = genes
            .iter()
            .map(|g| json!({"subject": {"id": format!("HGNC:{}", g), "label": g}}))
            .collect();
        Mock::given(method("GET"))
            .and(path(format!("/api/bioentity/function/{}/genes", term)))
            .and(query_param("rows", "100"))
            .and(query_param("facet", "false"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "associations": associations
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_similar_genes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/query"))
            .and(query_param("q", "TP53"))
            .and(query_param("species", "human"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": [{"HGNC": "11998", "_id": "7157"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/bioentity/gene/HGNC:11998/function"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "associations": [
                    {"object": {"id": "GO:0001"}},
                    {"object": {"id": "GO:0002"}},
                    {"object": {"label": "no id"}},
                    {"object": {"id": "GO:0003"}},
                    {"object": {"id": "GO:0004"}}
                ]
            })))
            .mount(&server)
            .await;
        mount_term(&server, "GO:0001", &["MDM2", "TP53", "ATM"]).await;
        mount_term(&server, "GO:0002", &["ATM", "CHEK2"]).await;
        mount_term(&server, "GO:0003", &["BAX"]).await;
        // Beyond max_terms; must not be consulted
        mount_term(&server, "GO:0004", &["SHOULD_NOT_APPEAR"]).await;

        let client = client_for(&server);
        let genes = client.similar_genes("TP53", DEFAULT_MAX_TERMS).await;
        assert_eq!(genes, vec!["ATM", "BAX", "CHEK2", "MDM2"]);
    }

    #[tokio::test]
    async fn test_unknown_symbol_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"hits": []})))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.similar_genes("NOPE", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_numeric_hgnc_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/query"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"hits": [{"HGNC": 6407}]})),
            )
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(
            client.hgnc_id("KRAS").await.unwrap().as_deref(),
            Some("HGNC:6407")
        );
    }

    #[tokio::test]
    async fn test_go_terms_failure_degrades_to_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v3/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "hits": [{"HGNC": "11998"}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/bioentity/gene/HGNC:11998/function"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert!(client.similar_genes("TP53", 3).await.is_empty());
    }
}
