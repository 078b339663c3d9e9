//! The overlay store: persisted user edits keyed by record id.

use std::path::Path;

use chrono::{DateTime, Utc};
use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::merge::{MergeEngine, WorkingRecord};
use crate::schema::{RecordId, SourceRecord};

use super::field::CustomField;
use super::persistence::{JsonFileBackend, MemoryBackend, StorageBackend};

/// Current version of the overlay store format.
pub const OVERLAY_VERSION: &str = "1.0.0";

/// Serialized shape of the overlay store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayState {
    /// Format version.
    pub version: String,
    /// When the store was last synchronized with a source document.
    pub last_sync: DateTime<Utc>,
    /// Custom fields per record, in insertion order.
    pub custom_fields: IndexMap<RecordId, Vec<CustomField>>,
}

impl OverlayState {
    /// An empty state stamped now.
    pub fn fresh() -> Self {
        Self {
            version: OVERLAY_VERSION.to_string(),
            last_sync: Utc::now(),
            custom_fields: IndexMap::new(),
        }
    }

    /// Fields stored for a record.
    pub fn fields_for(&self, record_id: &str) -> &[CustomField] {
        self.custom_fields
            .get(record_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total number of stored fields across all records.
    pub fn field_count(&self) -> usize {
        self.custom_fields.values().map(Vec::len).sum()
    }
}

/// Replace the field with the same name in place, or append it.
fn upsert_into(fields: &mut Vec<CustomField>, field: CustomField) {
    match fields.iter_mut().find(|existing| existing.name == field.name) {
        Some(existing) => *existing = field,
        None => fields.push(field),
    }
}

/// Persisted map of record id to custom fields.
///
/// Every mutation is written through the backend before it becomes visible:
/// a failed write leaves the in-memory state as it was.
pub struct OverlayStore {
    state: OverlayState,
    backend: Box<dyn StorageBackend>,
}

impl OverlayStore {
    /// Open a store on a backend, initializing and persisting a fresh state if
    /// nothing was saved yet.
    pub fn open(backend: Box<dyn StorageBackend>) -> Result<Self> {
        let state = match backend.load()? {
            Some(state) => {
                debug!(
                    store = %backend.describe(),
                    records = state.custom_fields.len(),
                    "opened overlay store"
                );
                state
            }
            None => {
                let state = OverlayState::fresh();
                backend.save(&state)?;
                info!(store = %backend.describe(), "initialized overlay store");
                state
            }
        };

        Ok(Self { state, backend })
    }

    /// Open a store backed by a JSON file.
    pub fn open_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Box::new(JsonFileBackend::new(path.as_ref())))
    }

    /// Open a store that lives only in memory.
    pub fn in_memory() -> Self {
        Self {
            state: OverlayState::fresh(),
            backend: Box::new(MemoryBackend::new()),
        }
    }

    /// Current state.
    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    /// Format version of the store.
    pub fn version(&self) -> &str {
        &self.state.version
    }

    /// When the store was last synchronized.
    pub fn last_sync(&self) -> DateTime<Utc> {
        self.state.last_sync
    }

    /// Where the store is persisted.
    pub fn location(&self) -> String {
        self.backend.describe()
    }

    /// Fields stored for a record; empty if the record has none.
    pub fn get_fields(&self, record_id: &str) -> &[CustomField] {
        self.state.fields_for(record_id)
    }

    /// Insert a field, replacing any field with the same name on that record.
    pub fn upsert_field(&mut self, record_id: &str, field: CustomField) -> Result<()> {
        field.validate()?;

        let mut next = self.state.clone();
        upsert_into(
            next.custom_fields.entry(record_id.to_string()).or_default(),
            field,
        );
        self.commit(next)
    }

    /// Upsert the same field on many records with a single write.
    ///
    /// Returns the number of distinct records written.
    pub fn upsert_many<I, S>(&mut self, record_ids: I, field: CustomField) -> Result<usize>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        field.validate()?;

        let mut next = self.state.clone();
        let mut written = 0;
        let mut seen = IndexSet::new();
        for record_id in record_ids {
            let record_id = record_id.as_ref();
            if !seen.insert(record_id.to_string()) {
                continue;
            }
            upsert_into(
                next.custom_fields.entry(record_id.to_string()).or_default(),
                field.clone(),
            );
            written += 1;
        }

        if written == 0 {
            return Ok(0);
        }
        self.commit(next)?;
        Ok(written)
    }

    /// Remove a field from a record. Returns whether anything was removed.
    pub fn remove_field(&mut self, record_id: &str, name: &str) -> Result<bool> {
        let present = self
            .get_fields(record_id)
            .iter()
            .any(|field| field.name == name);
        if !present {
            return Ok(false);
        }

        let mut next = self.state.clone();
        if let Some(fields) = next.custom_fields.get_mut(record_id) {
            fields.retain(|field| field.name != name);
            if fields.is_empty() {
                next.custom_fields.shift_remove(record_id);
            }
        }
        self.commit(next)?;
        Ok(true)
    }

    /// Remove a field from every record. Returns the number of records touched.
    pub fn remove_field_everywhere(&mut self, name: &str) -> Result<usize> {
        let mut next = self.state.clone();
        let mut touched = 0;
        for fields in next.custom_fields.values_mut() {
            let before = fields.len();
            fields.retain(|field| field.name != name);
            if fields.len() != before {
                touched += 1;
            }
        }

        if touched == 0 {
            return Ok(0);
        }
        next.custom_fields.retain(|_, fields| !fields.is_empty());
        self.commit(next)?;
        Ok(touched)
    }

    /// Project source records through the stored overlay.
    pub fn merge_with_source(&self, records: &[SourceRecord]) -> Vec<WorkingRecord> {
        MergeEngine::new().merge(&self.state, records)
    }

    /// Drop every stored field. The version is kept and the timestamp refreshed.
    pub fn clear(&mut self) -> Result<()> {
        self.backend.snapshot(&self.state)?;

        let next = OverlayState {
            version: self.state.version.clone(),
            last_sync: Utc::now(),
            custom_fields: IndexMap::new(),
        };
        self.commit(next)?;
        info!(store = %self.backend.describe(), "cleared overlay store");
        Ok(())
    }

    /// Record that the store was synchronized with a source document now.
    pub fn touch_sync(&mut self) -> Result<()> {
        let mut next = self.state.clone();
        next.last_sync = Utc::now();
        self.commit(next)
    }

    fn commit(&mut self, next: OverlayState) -> Result<()> {
        self.backend.save(&next)?;
        self.state = next;
        Ok(())
    }
}

impl std::fmt::Debug for OverlayStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayStore")
            .field("location", &self.backend.describe())
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XmlSheetError;

    struct FailingBackend;

    impl StorageBackend for FailingBackend {
        fn load(&self) -> Result<Option<OverlayState>> {
            Ok(Some(OverlayState::fresh()))
        }

        fn save(&self, _state: &OverlayState) -> Result<()> {
            Err(XmlSheetError::Persistence("disk full".to_string()))
        }

        fn describe(&self) -> String {
            "failing".to_string()
        }
    }

    fn names(store: &OverlayStore, id: &str) -> Vec<String> {
        store.get_fields(id).iter().map(|f| f.name.clone()).collect()
    }

    #[test]
    fn test_fresh_store() {
        let store = OverlayStore::in_memory();
        assert_eq!(store.version(), OVERLAY_VERSION);
        assert!(store.get_fields("1").is_empty());
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut store = OverlayStore::in_memory();
        store.upsert_field("1", CustomField::new("a", "A", "1")).unwrap();
        store.upsert_field("1", CustomField::new("b", "B", "2")).unwrap();
        store.upsert_field("1", CustomField::new("a", "A2", "3")).unwrap();

        assert_eq!(names(&store, "1"), vec!["a", "b"]);
        assert_eq!(store.get_fields("1")[0].value, "3");
        assert_eq!(store.get_fields("1")[0].label, "A2");
    }

    #[test]
    fn test_upsert_rejects_blank_name() {
        let mut store = OverlayStore::in_memory();
        let err = store.upsert_field("1", CustomField::new("", "x", "y")).unwrap_err();
        assert!(matches!(err, XmlSheetError::Validation(_)));
        assert_eq!(store.state().field_count(), 0);
    }

    #[test]
    fn test_remove_field() {
        let mut store = OverlayStore::in_memory();
        store.upsert_field("1", CustomField::new("a", "A", "1")).unwrap();

        assert!(!store.remove_field("1", "missing").unwrap());
        assert!(!store.remove_field("2", "a").unwrap());
        assert!(store.remove_field("1", "a").unwrap());
        assert!(store.state().custom_fields.is_empty());
    }

    #[test]
    fn test_upsert_many_deduplicates() {
        let mut store = OverlayStore::in_memory();
        let field = CustomField::new("big_cats", "Big Cats", "Big Cats");
        let written = store.upsert_many(["1", "3", "1"], field).unwrap();

        assert_eq!(written, 2);
        assert_eq!(names(&store, "1"), vec!["big_cats"]);
        assert_eq!(names(&store, "3"), vec!["big_cats"]);
        assert!(store.get_fields("2").is_empty());
    }

    #[test]
    fn test_remove_field_everywhere() {
        let mut store = OverlayStore::in_memory();
        store.upsert_many(["1", "2"], CustomField::new("g", "G", "G")).unwrap();
        store.upsert_field("2", CustomField::new("notes", "Notes", "x")).unwrap();

        assert_eq!(store.remove_field_everywhere("g").unwrap(), 2);
        assert!(store.get_fields("1").is_empty());
        assert_eq!(names(&store, "2"), vec!["notes"]);
        assert_eq!(store.remove_field_everywhere("g").unwrap(), 0);
    }

    #[test]
    fn test_clear_keeps_version_and_refreshes_sync() {
        let mut store = OverlayStore::in_memory();
        store.upsert_field("1", CustomField::new("a", "A", "1")).unwrap();
        let before = store.last_sync();

        store.clear().unwrap();
        assert!(store.state().custom_fields.is_empty());
        assert_eq!(store.version(), OVERLAY_VERSION);
        assert!(store.last_sync() >= before);
    }

    #[test]
    fn test_failed_save_leaves_state_unchanged() {
        let mut store = OverlayStore::open(Box::new(FailingBackend)).unwrap();
        let result = store.upsert_field("1", CustomField::new("a", "A", "1"));

        assert!(matches!(result, Err(XmlSheetError::Persistence(_))));
        assert!(store.get_fields("1").is_empty());
    }

    #[test]
    fn test_state_serializes_camel_case() {
        let mut store = OverlayStore::in_memory();
        store.upsert_field("1", CustomField::new("notes", "Notes", "x")).unwrap();

        let json = serde_json::to_value(store.state()).unwrap();
        assert_eq!(json["version"], "1.0.0");
        assert!(json.get("lastSync").is_some());
        assert_eq!(json["customFields"]["1"][0]["name"], "notes");
    }
}
