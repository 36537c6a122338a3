//! API request handlers

use crate::analysis;
use crate::http::UpstreamError;
use crate::kegg::{PathwayLookup, PathwayProteins};
use crate::ontology::DEFAULT_MAX_TERMS;
use crate::templates::{self, TemplateEngine};
use crate::Services;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    Json,
};
use minijinja::context;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared server state
pub struct ServerState {
    pub services: Arc<Services>,
    pub templates: TemplateEngine,
}

/// Shared web UI state
pub type ApiState = Arc<ServerState>;

// ============================================================================
// Health
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// HTML pages
// ============================================================================

pub async fn index(State(state): State<ApiState>) -> Result<Html<String>, AppError> {
    let config = &state.services.config;
    let html = state.templates.render(
        templates::INDEX,
        context! {
            server_name => &config.server_name,
            organism => &config.organism,
        },
    )?;
    Ok(Html(html))
}

#[derive(Debug, Deserialize)]
pub struct PathwayPageQuery {
    pub name: Option<String>,
}

pub async fn pathway_page(
    State(state): State<ApiState>,
    Query(query): Query<PathwayPageQuery>,
) -> Result<Html<String>, AppError> {
    let name = query
        .name
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("name is required".to_string()))?;

    let organism = &state.services.config.organism;
    let lookup = state.services.kegg.pathway_proteins(name, organism).await?;

    let html = match &lookup {
        PathwayLookup::Found(result) => state.templates.render(
            templates::PATHWAY,
            context! {
                query => name,
                organism => organism,
                pathway => &result.pathway,
                genes => &result.genes,
            },
        )?,
        PathwayLookup::NoGenes { pathway } => state.templates.render(
            templates::PATHWAY,
            context! {
                query => name,
                organism => organism,
                message => crate::kegg::format_pathway_lookup(&lookup),
                pathway => pathway,
                genes => Vec::<()>::new(),
            },
        )?,
        PathwayLookup::NotFound { .. } => state.templates.render(
            templates::PATHWAY,
            context! {
                query => name,
                organism => organism,
                message => crate::kegg::format_pathway_lookup(&lookup),
            },
        )?,
    };

    Ok(Html(html))
}

// ============================================================================
// JSON API
// ============================================================================

pub async fn pathway_proteins(
    State(state): State<ApiState>,
    Path(name): Path<String>,
) -> Result<Json<PathwayProteins>, AppError> {
    let organism = &state.services.config.organism;
    match state.services.kegg.pathway_proteins(&name, organism).await? {
        PathwayLookup::Found(result) => Ok(Json(result)),
        other => Err(AppError::NotFound(crate::kegg::format_pathway_lookup(&other))),
    }
}

pub async fn similar_genes(
    State(state): State<ApiState>,
    Path(symbol): Path<String>,
) -> Json<Vec<String>> {
    Json(
        state
            .services
            .go
            .similar_genes(&symbol, DEFAULT_MAX_TERMS)
            .await,
    )
}

#[derive(Debug, Deserialize)]
pub struct CommonProteinsRequest {
    pub protein_list_1: Vec<String>,
    pub protein_list_2: Vec<String>,
}

pub async fn common_proteins(Json(req): Json<CommonProteinsRequest>) -> Json<Vec<String>> {
    Json(analysis::common_proteins(
        &req.protein_list_1,
        &req.protein_list_2,
    ))
}

// ============================================================================
// Errors
// ============================================================================

/// API error type
#[derive(Debug)]
pub enum AppError {
    Internal(anyhow::Error),
    Upstream(UpstreamError),
    NotFound(String),
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, format!("{:#}", e)),
            AppError::Upstream(e) => (StatusCode::BAD_GATEWAY, e.to_string()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        if status.is_server_error() {
            tracing::error!("{}", message);
        }

        let body = Json(serde_json::json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl From<UpstreamError> for AppError {
    fn from(err: UpstreamError) -> Self {
        AppError::Upstream(err)
    }
}

impl From<minijinja::Error> for AppError {
    fn from(err: minijinja::Error) -> Self {
        AppError::Internal(err.into())
    }
}
