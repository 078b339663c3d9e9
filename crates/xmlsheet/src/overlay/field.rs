//! Custom fields: user-entered values layered over source records.

use serde::{Deserialize, Serialize};

use crate::error::{Result, XmlSheetError};
use crate::schema::is_slot_key;

/// A user-entered field attached to one record.
///
/// When `name` is a slot key the field overrides that slot's value; any other
/// name adds a new column.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomField {
    /// Slot key or column identifier.
    pub name: String,
    /// Display label.
    pub label: String,
    /// The value.
    pub value: String,
}

impl CustomField {
    /// Create a custom field.
    pub fn new(name: impl Into<String>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            value: value.into(),
        }
    }

    /// Whether this field overrides a positional slot.
    pub fn is_slot_override(&self) -> bool {
        is_slot_key(&self.name)
    }

    /// Check the field can be stored.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(XmlSheetError::Validation(
                "Custom field name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A registered custom column: a name and its display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CustomColumn {
    pub name: String,
    pub label: String,
}

impl CustomColumn {
    /// Create a column.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// Normalize a user-typed group or column name: lowercase, whitespace runs become `_`.
pub fn normalize_column_name(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_override_detection() {
        assert!(CustomField::new("slot_1", "NAME", "Panthera leo").is_slot_override());
        assert!(!CustomField::new("notes", "Notes", "nocturnal").is_slot_override());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert!(CustomField::new("  ", "Blank", "x").validate().is_err());
        assert!(CustomField::new("notes", "", "").validate().is_ok());
    }

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("Big Cats"), "big_cats");
        assert_eq!(normalize_column_name("  Night   Hunters "), "night_hunters");
        assert_eq!(normalize_column_name("reptiles"), "reptiles");
    }
}
