//! Overlay store: user edits kept apart from the source document.
//!
//! The source XML is never modified. Edits are custom fields keyed by record
//! id and persisted as one JSON document:
//!
//! ```json
//! {
//!   "version": "1.0.0",
//!   "lastSync": "2024-12-30T10:00:00Z",
//!   "customFields": {
//!     "1": [{ "name": "slot_1", "label": "NAME", "value": "Panthera leo" }]
//!   }
//! }
//! ```
//!
//! A field whose name is a slot key overrides that slot; any other name adds a
//! column. Names are unique per record: writing an existing name replaces it
//! in place.

mod field;
mod persistence;
mod store;

pub use field::{CustomColumn, CustomField, normalize_column_name};
pub use persistence::{DEFAULT_STORE_FILE, JsonFileBackend, MemoryBackend, StorageBackend};
pub use store::{OVERLAY_VERSION, OverlayState, OverlayStore};
