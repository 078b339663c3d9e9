//! Working records: what the table shows and exports.

use serde::{Deserialize, Serialize};

use crate::overlay::CustomField;
use crate::schema::SourceRecord;

/// A source record with slot overrides applied and extra fields attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkingRecord {
    /// `id` and slot values, overrides applied.
    #[serde(flatten)]
    pub record: SourceRecord,

    /// Fields that are not slot overrides, in stored order.
    #[serde(rename = "customFields", default)]
    pub custom_fields: Vec<CustomField>,
}

impl WorkingRecord {
    /// Wrap a source record with no custom fields.
    pub fn from_source(record: SourceRecord) -> Self {
        Self {
            record,
            custom_fields: Vec::new(),
        }
    }

    /// The record id.
    pub fn id(&self) -> &str {
        self.record.id()
    }

    /// Value of `id` or a slot.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.record.get(key)
    }

    /// A custom field by name.
    pub fn custom_field(&self, name: &str) -> Option<&CustomField> {
        self.custom_fields.iter().find(|field| field.name == name)
    }

    /// Value of a slot or custom field, whichever the key names.
    pub fn value_of(&self, key: &str) -> Option<&str> {
        self.record
            .get(key)
            .or_else(|| self.custom_field(key).map(|field| field.value.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_of_prefers_slots() {
        let mut working = WorkingRecord::from_source(SourceRecord::from_values("1", ["Lion"]));
        working
            .custom_fields
            .push(CustomField::new("notes", "Notes", "nocturnal"));

        assert_eq!(working.value_of("slot_1"), Some("Lion"));
        assert_eq!(working.value_of("notes"), Some("nocturnal"));
        assert_eq!(working.value_of("missing"), None);
    }

    #[test]
    fn test_serializes_flat_with_custom_fields() {
        let mut working = WorkingRecord::from_source(SourceRecord::from_values("1", ["Lion"]));
        working
            .custom_fields
            .push(CustomField::new("notes", "Notes", "nocturnal"));

        let json = serde_json::to_value(&working).unwrap();
        assert_eq!(json["id"], "1");
        assert_eq!(json["slot_1"], "Lion");
        assert_eq!(json["customFields"][0]["value"], "nocturnal");
    }
}
