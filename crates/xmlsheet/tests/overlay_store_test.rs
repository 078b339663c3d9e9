//! Integration tests for the overlay store and its JSON file backend.

use std::fs;

use tempfile::TempDir;

use xmlsheet::overlay::{JsonFileBackend, OVERLAY_VERSION, OverlayStore};
use xmlsheet::{Catalog, CustomField, XmlSheetError};

const ANIMALS: &str = "<CATALOG>\
    <ANIMAL><NAME>Lion</NAME><HABITAT>Savanna</HABITAT></ANIMAL>\
    <ANIMAL><NAME>Owl</NAME><HABITAT>Forest</HABITAT></ANIMAL>\
    </CATALOG>";

// =============================================================================
// Opening
// =============================================================================

#[test]
fn test_first_open_creates_store_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data/xmlsheet.overlay.json");

    let store = OverlayStore::open_file(&path).expect("Failed to open store");
    assert!(path.exists());
    assert_eq!(store.version(), OVERLAY_VERSION);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(json["version"], "1.0.0");
    assert!(json["lastSync"].is_string());
    assert!(json["customFields"].as_object().unwrap().is_empty());
}

#[test]
fn test_corrupt_store_is_not_wiped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    fs::write(&path, "{\"version\": \"1.0.0\", \"customFields\": [").unwrap();

    let err = OverlayStore::open_file(&path).unwrap_err();
    assert!(matches!(err, XmlSheetError::Persistence(_)));
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "{\"version\": \"1.0.0\", \"customFields\": ["
    );
}

// =============================================================================
// Durability
// =============================================================================

#[test]
fn test_edits_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    {
        let mut store = OverlayStore::open_file(&path).unwrap();
        store
            .upsert_field("1", CustomField::new("slot_1", "NAME", "Panthera leo"))
            .unwrap();
        store
            .upsert_field("2", CustomField::new("notes", "Notes", "nocturnal"))
            .unwrap();
    }

    let store = OverlayStore::open_file(&path).unwrap();
    assert_eq!(store.get_fields("1")[0].value, "Panthera leo");
    assert_eq!(store.get_fields("2")[0].name, "notes");
}

#[test]
fn test_replace_by_name_is_persisted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let mut store = OverlayStore::open_file(&path).unwrap();
    store.upsert_field("1", CustomField::new("x", "X", "a")).unwrap();
    store.upsert_field("1", CustomField::new("x", "X", "b")).unwrap();

    let reopened = OverlayStore::open_file(&path).unwrap();
    let fields = reopened.get_fields("1");
    assert_eq!(fields.len(), 1);
    assert_eq!(fields[0].value, "b");
}

#[test]
fn test_catalog_session_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    {
        let mut catalog = Catalog::open(&path).unwrap();
        catalog.load_xml(ANIMALS).unwrap();
        catalog.create_group("Night Hunters", ["2"]).unwrap();
    }

    // A later session with the same source sees the group column again
    let mut catalog = Catalog::open(&path).unwrap();
    catalog.load_xml(ANIMALS).unwrap();

    assert!(catalog.view().has_custom_column("night_hunters"));
    let csv = catalog.export_csv().unwrap();
    assert!(csv.starts_with("\"ID\",\"NAME\",\"HABITAT\",\"Night Hunters\"\n"));
    assert!(csv.contains("\"2\",\"Owl\",\"Forest\",\"Night Hunters\"\n"));
}

#[test]
fn test_clear_with_history_keeps_snapshot() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");
    let backend = JsonFileBackend::new(&path).with_history(true);

    let mut store = OverlayStore::open(Box::new(backend.clone())).unwrap();
    store.upsert_field("1", CustomField::new("notes", "Notes", "x")).unwrap();
    store.clear().unwrap();

    let snapshots = backend.list_history().unwrap();
    assert_eq!(snapshots.len(), 1);
    let snapshot = fs::read_to_string(&snapshots[0]).unwrap();
    assert!(snapshot.contains("\"notes\""));

    let reopened = OverlayStore::open_file(&path).unwrap();
    assert_eq!(reopened.state().field_count(), 0);
    assert_eq!(reopened.version(), OVERLAY_VERSION);
}

#[test]
fn test_restore_persists_empty_overlay() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store.json");

    let mut catalog = Catalog::open(&path).unwrap();
    catalog.load_xml(ANIMALS).unwrap();
    catalog.add_custom_field("1", "slot_1", "NAME", "Leo").unwrap();
    catalog.clear_all_data().unwrap();

    let reopened = OverlayStore::open_file(&path).unwrap();
    assert!(reopened.get_fields("1").is_empty());
    assert_eq!(catalog.merge_with_source_data()[0].get("slot_1"), Some("Lion"));
}
