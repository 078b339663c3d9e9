//! Export handlers.

use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Export the visible table as XML.
pub async fn export_xml(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.catalog.read().await.export_xml()?;
    Ok(([(header::CONTENT_TYPE, "application/xml; charset=utf-8")], body))
}

/// Export the visible table as CSV.
pub async fn export_csv(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let body = state.catalog.read().await.export_csv()?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"export.csv\""),
        ],
        body,
    ))
}
