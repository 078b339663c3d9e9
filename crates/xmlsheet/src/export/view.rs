//! Which columns and rows an export includes.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::merge::WorkingRecord;
use crate::overlay::CustomColumn;
use crate::schema::{RecordId, all_field_keys};

/// Column visibility, registered custom columns and deactivated rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportView {
    /// Visible field names: `id`, slot keys and custom column names.
    pub visible_fields: IndexSet<String>,
    /// Registered custom columns, in registration order.
    pub custom_columns: Vec<CustomColumn>,
    /// Records flagged as deactivated.
    pub deactivated: IndexSet<RecordId>,
}

impl ExportView {
    /// `id` and every slot visible, no custom columns, nothing deactivated.
    pub fn new() -> Self {
        Self {
            visible_fields: all_field_keys().into_iter().collect(),
            custom_columns: Vec::new(),
            deactivated: IndexSet::new(),
        }
    }

    /// A view showing every slot and every custom field the records carry.
    pub fn for_records(records: &[WorkingRecord]) -> Self {
        let mut view = Self::new();
        for record in records {
            for field in &record.custom_fields {
                view.add_custom_column(CustomColumn::new(&field.name, &field.label));
            }
        }
        view
    }

    /// Register a custom column and make it visible. Known names are kept as is.
    pub fn add_custom_column(&mut self, column: CustomColumn) {
        if !self.custom_columns.iter().any(|c| c.name == column.name) {
            self.visible_fields.insert(column.name.clone());
            self.custom_columns.push(column);
        }
    }

    /// Set the visible fields.
    pub fn with_visible_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.visible_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    /// Set the deactivated record ids.
    pub fn with_deactivated<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.deactivated = ids.into_iter().map(Into::into).collect();
        self
    }

    /// Whether a field is shown.
    pub fn is_visible(&self, name: &str) -> bool {
        self.visible_fields.contains(name)
    }

    /// Whether a record is flagged as deactivated.
    pub fn is_deactivated(&self, record_id: &str) -> bool {
        self.deactivated.contains(record_id)
    }

    /// Registered custom columns that are visible, in registration order.
    pub fn visible_custom_columns(&self) -> impl Iterator<Item = &CustomColumn> {
        self.custom_columns
            .iter()
            .filter(|column| self.is_visible(&column.name))
    }
}

impl Default for ExportView {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::CustomField;
    use crate::schema::SourceRecord;

    #[test]
    fn test_default_view_shows_all_slots() {
        let view = ExportView::new();
        assert!(view.is_visible("id"));
        assert!(view.is_visible("slot_20"));
        assert!(!view.is_visible("notes"));
    }

    #[test]
    fn test_for_records_registers_custom_fields_once() {
        let mut first = WorkingRecord::from_source(SourceRecord::from_values("1", ["a"]));
        first.custom_fields.push(CustomField::new("notes", "Notes", "x"));
        let mut second = WorkingRecord::from_source(SourceRecord::from_values("2", ["b"]));
        second.custom_fields.push(CustomField::new("notes", "Notes", "y"));
        second.custom_fields.push(CustomField::new("big_cats", "Big Cats", "Big Cats"));

        let view = ExportView::for_records(&[first, second]);
        let names: Vec<_> = view.visible_custom_columns().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["notes", "big_cats"]);
    }
}
