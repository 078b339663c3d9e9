//! Record-level schema: which element is a record and what its fields are.

use serde::{Deserialize, Serialize};

/// How records were located in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordLayout {
    /// The document element itself is the one record; its children are the fields.
    SingleRecord,
    /// Records are the elements carrying the most frequent record-shaped tag.
    Repeated,
}

/// Inferred record schema for one parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordSchema {
    /// Tag name of the record elements.
    pub record_tag: String,
    /// How records were located.
    pub layout: RecordLayout,
    /// Field tag names in slot order (slot 1 first).
    pub field_names: Vec<String>,
    /// Field tag names beyond the slot limit, in discovery order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dropped_fields: Vec<String>,
    /// Number of records found.
    pub record_count: usize,
}

impl RecordSchema {
    /// Number of slots in use.
    pub fn slot_count(&self) -> usize {
        self.field_names.len()
    }

    /// Slot position (1-based) of a field tag name.
    pub fn position_of(&self, field_name: &str) -> Option<usize> {
        self.field_names
            .iter()
            .position(|name| name == field_name)
            .map(|index| index + 1)
    }
}
