//! Flat source records and the slot label dictionary.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::types::{ID_KEY, ID_LABEL, slot_key};

/// Identifier of a record: its 1-based ordinal as a string.
pub type RecordId = String;

/// One flattened record: `id` followed by `slot_1..slot_N`, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceRecord {
    fields: IndexMap<String, String>,
}

impl SourceRecord {
    /// Create a record holding only its id.
    pub fn new(id: impl Into<String>) -> Self {
        let mut fields = IndexMap::new();
        fields.insert(ID_KEY.to_string(), id.into());
        Self { fields }
    }

    /// Build a record from its id and slot values in slot order.
    pub fn from_values<I, S>(id: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut record = Self::new(id);
        for (index, value) in values.into_iter().enumerate() {
            record.fields.insert(slot_key(index + 1), value.into());
        }
        record
    }

    /// The record id.
    pub fn id(&self) -> &str {
        self.fields.get(ID_KEY).map(String::as_str).unwrap_or_default()
    }

    /// Value of a field (`id` or a slot key).
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Whether the record carries the given key.
    pub fn has_field(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Replace the value of an existing field. Unknown keys are ignored.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> bool {
        match self.fields.get_mut(key) {
            Some(slot) => {
                *slot = value.into();
                true
            }
            None => false,
        }
    }

    pub(crate) fn insert(&mut self, key: String, value: String) {
        self.fields.insert(key, value);
    }

    /// All fields in order, `id` first.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of slots, not counting `id`.
    pub fn slot_count(&self) -> usize {
        self.fields.len().saturating_sub(1)
    }
}

/// Mapping from slot key (including `id`) to the original tag name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    labels: IndexMap<String, String>,
}

impl LabelMap {
    /// A label map containing only `id → "ID"`.
    pub fn new() -> Self {
        let mut labels = IndexMap::new();
        labels.insert(ID_KEY.to_string(), ID_LABEL.to_string());
        Self { labels }
    }

    /// Build from field names in slot order.
    pub fn from_field_names<S: AsRef<str>>(names: &[S]) -> Self {
        let mut map = Self::new();
        for (index, name) in names.iter().enumerate() {
            map.labels.insert(slot_key(index + 1), name.as_ref().to_string());
        }
        map
    }

    /// Label for a key.
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels.get(key).map(String::as_str)
    }

    /// Entries in slot order, `id` first.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.labels.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Keys in slot order, `id` first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Number of entries including `id`.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false: `id` is always present.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl Default for LabelMap {
    fn default() -> Self {
        Self::new()
    }
}
