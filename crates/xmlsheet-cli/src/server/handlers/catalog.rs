//! Catalog loading, status and restore handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use xmlsheet::input::fetch_url;
use xmlsheet::{CatalogStatus, CustomColumn, LabelMap, ParsedCatalog, TableView, WorkingRecord};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Response containing the current table.
#[derive(Serialize)]
pub struct CatalogResponse {
    pub loaded: bool,
    pub record_tag: Option<String>,
    pub labels: LabelMap,
    pub custom_columns: Vec<CustomColumn>,
    pub view: TableView,
    /// Working records after the view's sort and filters.
    pub records: Vec<WorkingRecord>,
    pub total_records: usize,
}

/// Summary returned after a successful load.
#[derive(Serialize)]
pub struct LoadResponse {
    pub record_tag: String,
    pub record_count: usize,
    pub field_names: Vec<String>,
    pub dropped_fields: Vec<String>,
}

impl From<&ParsedCatalog> for LoadResponse {
    fn from(parsed: &ParsedCatalog) -> Self {
        Self {
            record_tag: parsed.schema.record_tag.clone(),
            record_count: parsed.records.len(),
            field_names: parsed.schema.field_names.clone(),
            dropped_fields: parsed.schema.dropped_fields.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct LoadUrlRequest {
    pub url: String,
}

/// Get the current table with the overlay applied.
pub async fn get_catalog(State(state): State<AppState>) -> Json<CatalogResponse> {
    let catalog = state.catalog.read().await;

    Json(CatalogResponse {
        loaded: catalog.parsed().is_some(),
        record_tag: catalog.parsed().map(|p| p.schema.record_tag.clone()),
        labels: catalog.labels(),
        custom_columns: catalog.view().custom_columns().to_vec(),
        view: catalog.view().clone(),
        records: catalog.visible_records(),
        total_records: catalog.records().len(),
    })
}

/// Load XML text sent as the request body.
pub async fn load_xml(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<LoadResponse>, ApiError> {
    let mut catalog = state.catalog.write().await;
    let parsed = catalog.load_xml(body)?;
    Ok(Json(LoadResponse::from(parsed)))
}

/// Fetch XML from a URL and load it.
pub async fn load_url(
    State(state): State<AppState>,
    Json(request): Json<LoadUrlRequest>,
) -> Result<Json<LoadResponse>, ApiError> {
    let loader = state.loader.clone();
    let source = tokio::task::spawn_blocking(move || fetch_url(&request.url, &loader))
        .await
        .map_err(|e| ApiError::Internal(format!("Fetch task failed: {}", e)))??;

    let mut catalog = state.catalog.write().await;
    let parsed = catalog.load(source)?;
    Ok(Json(LoadResponse::from(parsed)))
}

/// Overlay and catalog summary.
pub async fn get_status(State(state): State<AppState>) -> Json<CatalogStatus> {
    Json(state.catalog.read().await.status())
}

/// Drop every edit and re-parse the original document.
pub async fn restore(State(state): State<AppState>) -> Result<Json<CatalogStatus>, ApiError> {
    let mut catalog = state.catalog.write().await;
    catalog.clear_all_data()?;
    Ok(Json(catalog.status()))
}
