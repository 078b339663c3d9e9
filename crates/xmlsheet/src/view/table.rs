//! Table view state: visible columns, filters, sorting and deactivated rows.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{Result, XmlSheetError};
use crate::export::ExportView;
use crate::merge::WorkingRecord;
use crate::overlay::{CustomColumn, normalize_column_name};
use crate::schema::{ID_KEY, RecordId, all_field_keys, is_slot_key};

use super::sort::{GroupSortConfig, SortConfig, SortDirection, compare_directed, compare_groups};

/// How the working records are presented.
///
/// The view never touches the overlay store; operations that also write
/// custom fields live on [`Catalog`](crate::Catalog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableView {
    visible_fields: IndexSet<String>,
    custom_columns: Vec<CustomColumn>,
    filters: IndexMap<String, IndexSet<String>>,
    sort: SortConfig,
    group_sort: GroupSortConfig,
    deactivated: IndexSet<RecordId>,
}

impl TableView {
    /// All slots visible, sorted by `id` ascending, no filters.
    pub fn new() -> Self {
        Self {
            visible_fields: all_field_keys().into_iter().collect(),
            custom_columns: Vec::new(),
            filters: IndexMap::new(),
            sort: SortConfig::default(),
            group_sort: GroupSortConfig::default(),
            deactivated: IndexSet::new(),
        }
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    /// Whether a field is shown.
    pub fn is_visible(&self, name: &str) -> bool {
        self.visible_fields.contains(name)
    }

    /// Visible field names.
    pub fn visible_fields(&self) -> impl Iterator<Item = &str> {
        self.visible_fields.iter().map(String::as_str)
    }

    /// Show a hidden field or hide a visible one. Returns the new visibility.
    pub fn toggle_field(&mut self, name: &str) -> bool {
        if self.visible_fields.shift_remove(name) {
            false
        } else {
            self.visible_fields.insert(name.to_string());
            true
        }
    }

    /// Show or hide a field.
    pub fn set_visible(&mut self, name: &str, visible: bool) {
        if visible {
            self.visible_fields.insert(name.to_string());
        } else {
            self.visible_fields.shift_remove(name);
        }
    }

    /// Registered custom columns, in registration order.
    pub fn custom_columns(&self) -> &[CustomColumn] {
        &self.custom_columns
    }

    /// Whether a custom column is registered under the name.
    pub fn has_custom_column(&self, name: &str) -> bool {
        self.custom_columns.iter().any(|column| column.name == name)
    }

    /// Register a custom column and show it. Returns false if it already existed.
    pub fn add_custom_column(&mut self, column: CustomColumn) -> bool {
        if self.has_custom_column(&column.name) {
            return false;
        }
        self.visible_fields.insert(column.name.clone());
        self.custom_columns.push(column);
        true
    }

    /// Register a group column from a user-typed label.
    pub fn add_group_column(&mut self, label: &str) -> Result<CustomColumn> {
        let name = normalize_column_name(label);
        if name.is_empty() {
            return Err(XmlSheetError::Validation(
                "Group name must not be empty".to_string(),
            ));
        }
        if is_slot_key(&name) || name == ID_KEY {
            return Err(XmlSheetError::Validation(format!(
                "'{}' is reserved for source fields",
                name
            )));
        }

        let column = CustomColumn::new(name, label.trim());
        self.add_custom_column(column.clone());
        Ok(column)
    }

    /// Unregister a custom column, hide it and drop its filter.
    pub fn remove_custom_column(&mut self, name: &str) -> bool {
        let before = self.custom_columns.len();
        self.custom_columns.retain(|column| column.name != name);
        self.visible_fields.shift_remove(name);
        self.filters.shift_remove(name);
        self.custom_columns.len() != before
    }

    // -------------------------------------------------------------------------
    // Filters
    // -------------------------------------------------------------------------

    /// Accept only rows whose value for `field` is one of `values`.
    ///
    /// An empty set removes the filter.
    pub fn set_filter<I, S>(&mut self, field: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: IndexSet<String> = values.into_iter().map(Into::into).collect();
        if values.is_empty() {
            self.filters.shift_remove(field);
        } else {
            self.filters.insert(field.to_string(), values);
        }
    }

    /// Remove every filter.
    pub fn clear_filters(&mut self) {
        self.filters.clear();
    }

    /// Active filters.
    pub fn filters(&self) -> &IndexMap<String, IndexSet<String>> {
        &self.filters
    }

    fn accepts(&self, record: &WorkingRecord) -> bool {
        self.filters.iter().all(|(field, accepted)| {
            if accepted.is_empty() {
                return true;
            }
            if field == ID_KEY || is_slot_key(field) {
                accepted.contains(record.get(field).unwrap_or_default())
            } else {
                record
                    .custom_field(field)
                    .is_some_and(|custom| accepted.contains(&custom.value))
            }
        })
    }

    // -------------------------------------------------------------------------
    // Sorting
    // -------------------------------------------------------------------------

    /// Sort by a column. Sorting by the current column flips the direction.
    ///
    /// Only `id` and slot keys are sortable. Disables group sort.
    pub fn sort_by(&mut self, field: &str) -> Result<()> {
        check_sortable(field)?;
        let direction = if self.sort.field == field && self.sort.direction == SortDirection::Asc {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
        self.set_sort(SortConfig {
            field: field.to_string(),
            direction,
        })
    }

    /// Sort by a column in the given direction. Disables group sort.
    pub fn set_sort(&mut self, sort: SortConfig) -> Result<()> {
        check_sortable(&sort.field)?;
        self.sort = sort;
        self.group_sort = GroupSortConfig::default();
        Ok(())
    }

    /// Current column sort.
    pub fn sort(&self) -> &SortConfig {
        &self.sort
    }

    /// Sort by group tags; takes precedence over the column sort while enabled.
    pub fn set_group_sort(&mut self, enabled: bool, direction: SortDirection) {
        self.group_sort = GroupSortConfig { enabled, direction };
    }

    /// Current group sort.
    pub fn group_sort(&self) -> GroupSortConfig {
        self.group_sort
    }

    fn group_values<'a>(&self, record: &'a WorkingRecord) -> Vec<&'a str> {
        let mut values: Vec<&str> = record
            .custom_fields
            .iter()
            .filter(|field| self.has_custom_column(&field.name))
            .map(|field| field.value.as_str())
            .collect();
        values.sort_unstable();
        values
    }

    // -------------------------------------------------------------------------
    // Rows
    // -------------------------------------------------------------------------

    /// Flag records as deactivated. They stay in the table and in exports.
    pub fn deactivate<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deactivated.extend(ids.into_iter().map(Into::into));
    }

    /// Clear the deactivated flag.
    pub fn activate<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.deactivated.shift_remove(id.as_ref());
        }
    }

    /// Whether a record is deactivated.
    pub fn is_deactivated(&self, record_id: &str) -> bool {
        self.deactivated.contains(record_id)
    }

    /// Distinct values of a column across all records, sorted.
    ///
    /// Custom columns only contribute values from records that carry them.
    pub fn distinct_values(&self, records: &[WorkingRecord], field: &str) -> Vec<String> {
        let mut values: Vec<String> = records
            .iter()
            .filter_map(|record| {
                if field == ID_KEY || is_slot_key(field) {
                    Some(record.get(field).unwrap_or_default())
                } else {
                    record.custom_field(field).map(|custom| custom.value.as_str())
                }
            })
            .collect::<IndexSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        values.sort();
        values
    }

    /// Sort then filter the records. The sort is stable.
    pub fn apply(&self, records: &[WorkingRecord]) -> Vec<WorkingRecord> {
        let mut rows: Vec<&WorkingRecord> = records.iter().collect();

        if self.group_sort.enabled {
            rows.sort_by(|a, b| {
                compare_groups(
                    &self.group_values(a),
                    &self.group_values(b),
                    self.group_sort.direction,
                )
            });
        } else if self.sort.field == ID_KEY || is_slot_key(&self.sort.field) {
            let field = self.sort.field.as_str();
            rows.sort_by(|a, b| {
                compare_directed(
                    a.get(field).unwrap_or_default(),
                    b.get(field).unwrap_or_default(),
                    self.sort.direction,
                )
            });
        }

        rows.into_iter()
            .filter(|record| self.accepts(record))
            .cloned()
            .collect()
    }

    /// Column and row flags for the export serializers.
    pub fn export_view(&self) -> ExportView {
        ExportView {
            visible_fields: self.visible_fields.clone(),
            custom_columns: self.custom_columns.clone(),
            deactivated: self.deactivated.clone(),
        }
    }
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

fn check_sortable(field: &str) -> Result<()> {
    if field == ID_KEY || is_slot_key(field) {
        Ok(())
    } else {
        Err(XmlSheetError::Validation(format!(
            "Cannot sort by '{}': only id and slot columns are sortable",
            field
        )))
    }
}
