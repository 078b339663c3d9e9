//! xmlsheet: a spreadsheet-like editing layer over arbitrary XML catalogs.
//!
//! xmlsheet reads an XML document, guesses which element represents a record,
//! flattens every record into positional slots, and lets the user layer edits
//! on top without ever modifying the source document.
//!
//! # Core Principles
//!
//! - **Shape inference**: No schema is required; records and fields are inferred
//! - **Non-destructive**: Edits live in a separate overlay store
//! - **Restorable**: Clearing the overlay brings back the original document
//!
//! # Example
//!
//! ```
//! use xmlsheet::Catalog;
//!
//! let mut catalog = Catalog::in_memory();
//! catalog
//!     .load_xml("<CATALOG><ANIMAL><NAME>Lion</NAME></ANIMAL><ANIMAL><NAME>Owl</NAME></ANIMAL></CATALOG>")
//!     .unwrap();
//!
//! catalog.add_custom_field("1", "slot_1", "NAME", "Panthera leo").unwrap();
//! catalog.add_custom_field("2", "notes", "Notes", "nocturnal").unwrap();
//!
//! let records = catalog.merge_with_source_data();
//! assert_eq!(records[0].get("slot_1"), Some("Panthera leo"));
//! assert_eq!(records[1].custom_fields[0].value, "nocturnal");
//!
//! let xml = catalog.export_xml().unwrap();
//! assert!(xml.contains("<notes label=\"Notes\">nocturnal</notes>"));
//! ```

pub mod error;
pub mod export;
pub mod inference;
pub mod input;
pub mod merge;
pub mod overlay;
pub mod schema;
pub mod view;

mod catalog;

pub use crate::catalog::{
    Catalog, CatalogConfig, CatalogStatus, ParsedCatalog, parse_catalog, parse_catalog_with,
};
pub use error::{Result, XmlSheetError};
pub use export::{CsvExporter, ExportView, XmlExporter};
pub use input::{LoadedSource, SourceMetadata};
pub use merge::{MergeEngine, WorkingRecord};
pub use overlay::{CustomColumn, CustomField, OverlayStore};
pub use schema::{LabelMap, RecordSchema, SourceRecord};
pub use view::{SortDirection, TableView};
