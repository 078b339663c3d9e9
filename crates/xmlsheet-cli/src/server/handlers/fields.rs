//! Custom field, group and column handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use xmlsheet::schema::is_slot_key;
use xmlsheet::{Catalog, CustomColumn, CustomField};

use crate::server::error::ApiError;
use crate::server::state::AppState;

#[derive(Serialize)]
pub struct FieldsResponse {
    pub record_id: String,
    pub fields: Vec<CustomField>,
}

#[derive(Deserialize)]
pub struct SetFieldRequest {
    pub name: String,
    /// Defaults to the source label for slot keys and to the name otherwise.
    pub label: Option<String>,
    pub value: String,
}

#[derive(Serialize)]
pub struct RemoveFieldResponse {
    pub removed: bool,
}

#[derive(Deserialize)]
pub struct CreateGroupRequest {
    pub label: String,
    pub record_ids: Vec<String>,
}

#[derive(Serialize)]
pub struct CreateGroupResponse {
    #[serde(flatten)]
    pub column: CustomColumn,
    /// Number of distinct records tagged.
    pub records: usize,
}

#[derive(Serialize)]
pub struct DeleteColumnResponse {
    pub column: String,
    /// Number of records that carried the column.
    pub records: usize,
}

fn fields_of(catalog: &Catalog, record_id: &str) -> Result<FieldsResponse, ApiError> {
    if catalog.record(record_id).is_none() {
        return Err(ApiError::NotFound(format!("Record {}", record_id)));
    }
    Ok(FieldsResponse {
        record_id: record_id.to_string(),
        fields: catalog.store().get_fields(record_id).to_vec(),
    })
}

/// List the custom fields of a record.
pub async fn get_fields(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FieldsResponse>, ApiError> {
    let catalog = state.catalog.read().await;
    Ok(Json(fields_of(&catalog, &id)?))
}

/// Add or replace a custom field on a record.
pub async fn set_field(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<SetFieldRequest>,
) -> Result<Json<FieldsResponse>, ApiError> {
    let mut catalog = state.catalog.write().await;
    if catalog.record(&id).is_none() {
        return Err(ApiError::NotFound(format!("Record {}", id)));
    }

    let name = request.name.trim();
    let label = match request.label {
        Some(label) => label,
        None if is_slot_key(name) => catalog
            .labels()
            .label(name)
            .unwrap_or(name)
            .to_string(),
        None => name.to_string(),
    };

    catalog.add_custom_field(&id, name, &label, &request.value)?;
    Ok(Json(fields_of(&catalog, &id)?))
}

/// Remove a custom field from a record.
pub async fn remove_field(
    State(state): State<AppState>,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<RemoveFieldResponse>, ApiError> {
    let mut catalog = state.catalog.write().await;
    let removed = catalog.remove_custom_field(&id, &name)?;
    Ok(Json(RemoveFieldResponse { removed }))
}

/// Tag records with a new group column.
pub async fn create_group(
    State(state): State<AppState>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<CreateGroupResponse>), ApiError> {
    let mut catalog = state.catalog.write().await;
    let (column, records) = catalog.create_group(&request.label, &request.record_ids)?;
    Ok((StatusCode::CREATED, Json(CreateGroupResponse { column, records })))
}

/// Delete a custom column everywhere.
pub async fn delete_column(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<DeleteColumnResponse>, ApiError> {
    let mut catalog = state.catalog.write().await;
    let records = catalog.delete_column(&name)?;
    Ok(Json(DeleteColumnResponse {
        column: name,
        records,
    }))
}
