//! Table view handlers.

use axum::{Json, extract::State};
use indexmap::IndexMap;
use serde::Deserialize;

use xmlsheet::TableView;
use xmlsheet::view::{GroupSortConfig, SortConfig};

use crate::server::error::ApiError;
use crate::server::state::AppState;

/// Changes to the table view. Omitted parts stay as they are.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ViewUpdate {
    pub show: Vec<String>,
    pub hide: Vec<String>,
    /// Replaces every filter when present.
    pub filters: Option<IndexMap<String, Vec<String>>>,
    pub sort: Option<SortConfig>,
    pub group_sort: Option<GroupSortConfig>,
    pub deactivate: Vec<String>,
    pub activate: Vec<String>,
}

impl ViewUpdate {
    /// Apply the update; the view is left untouched on error.
    pub fn apply(self, view: &mut TableView) -> xmlsheet::Result<()> {
        let mut next = view.clone();

        for name in &self.show {
            next.set_visible(name, true);
        }
        for name in &self.hide {
            next.set_visible(name, false);
        }

        if let Some(filters) = self.filters {
            next.clear_filters();
            for (field, values) in filters {
                next.set_filter(&field, values);
            }
        }

        if let Some(sort) = self.sort {
            next.set_sort(sort)?;
        }
        if let Some(group_sort) = self.group_sort {
            next.set_group_sort(group_sort.enabled, group_sort.direction);
        }

        next.deactivate(self.deactivate);
        next.activate(self.activate);

        *view = next;
        Ok(())
    }
}

/// Get the table view.
pub async fn get_view(State(state): State<AppState>) -> Json<TableView> {
    Json(state.catalog.read().await.view().clone())
}

/// Update visibility, filters, sorting and deactivated rows.
pub async fn update_view(
    State(state): State<AppState>,
    Json(update): Json<ViewUpdate>,
) -> Result<Json<TableView>, ApiError> {
    let mut catalog = state.catalog.write().await;
    update.apply(catalog.view_mut())?;
    Ok(Json(catalog.view().clone()))
}
