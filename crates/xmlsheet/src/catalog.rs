//! Catalog: the parsed document, its overlay and the table view, held together.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Result, XmlSheetError};
use crate::export::{CsvExporter, FALLBACK_RECORD_TAG, XmlExporter};
use crate::inference::{InferenceConfig, ShapeInferencer, normalize_records};
use crate::input::{
    LoadedSource, LoaderConfig, Parser, ParserConfig, SourceMetadata, fetch_url, load_file,
};
use crate::merge::WorkingRecord;
use crate::overlay::{CustomColumn, CustomField, OverlayStore};
use crate::schema::{LabelMap, RecordSchema, SourceRecord, is_slot_key};
use crate::view::TableView;

/// Configuration for a catalog.
#[derive(Debug, Clone, Default)]
pub struct CatalogConfig {
    /// XML reader configuration.
    pub parser: ParserConfig,
    /// Record shape inference configuration.
    pub inference: InferenceConfig,
    /// File and URL loading configuration.
    pub loader: LoaderConfig,
}

impl CatalogConfig {
    /// Set the parser configuration.
    pub fn with_parser(mut self, parser: ParserConfig) -> Self {
        self.parser = parser;
        self
    }

    /// Set the inference configuration.
    pub fn with_inference(mut self, inference: InferenceConfig) -> Self {
        self.inference = inference;
        self
    }

    /// Set the loader configuration.
    pub fn with_loader(mut self, loader: LoaderConfig) -> Self {
        self.loader = loader;
        self
    }
}

/// Result of parsing one XML document into records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedCatalog {
    /// Inferred record shape.
    pub schema: RecordSchema,
    /// Normalized records in document order.
    pub records: Vec<SourceRecord>,
    /// Slot key to original tag name.
    pub labels: LabelMap,
}

/// Parse XML text into records with the default configuration.
///
/// # Example
///
/// ```
/// use xmlsheet::parse_catalog;
///
/// let parsed = parse_catalog(
///     "<CATALOG><ANIMAL><NAME>Lion</NAME></ANIMAL><ANIMAL><NAME>Owl</NAME></ANIMAL></CATALOG>",
/// )
/// .unwrap();
///
/// assert_eq!(parsed.schema.record_tag, "ANIMAL");
/// assert_eq!(parsed.records[1].get("slot_1"), Some("Owl"));
/// assert_eq!(parsed.labels.label("slot_1"), Some("NAME"));
/// ```
pub fn parse_catalog(text: &str) -> Result<ParsedCatalog> {
    parse_catalog_with(text, &CatalogConfig::default())
}

/// Parse XML text into records.
pub fn parse_catalog_with(text: &str, config: &CatalogConfig) -> Result<ParsedCatalog> {
    let document = Parser::with_config(config.parser.clone()).parse_str(text)?;
    let inferred = ShapeInferencer::with_config(config.inference.clone()).infer(&document)?;
    let (records, labels) = normalize_records(&inferred.schema, &inferred.elements);

    Ok(ParsedCatalog {
        schema: inferred.schema,
        records,
        labels,
    })
}

/// Summary of a catalog's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogStatus {
    /// Where the current document came from.
    pub source: Option<SourceMetadata>,
    /// Record tag of the current document.
    pub record_tag: Option<String>,
    /// Number of records in the current document.
    pub record_count: usize,
    /// Field tag names in slot order.
    pub field_names: Vec<String>,
    /// Field tag names dropped for exceeding the slot limit.
    pub dropped_fields: Vec<String>,
    /// Overlay store format version.
    pub overlay_version: String,
    /// Last synchronization time of the overlay store.
    pub last_sync: DateTime<Utc>,
    /// Records carrying at least one custom field.
    pub records_with_custom_fields: usize,
    /// Total number of stored custom fields.
    pub custom_field_count: usize,
    /// Where the overlay store lives.
    pub store_location: String,
}

/// The working context of one editing session.
///
/// Owns the overlay store, the current parse, the original XML text used for
/// restore, and the table view. Nothing is global: create as many catalogs as
/// needed, each with its own store.
#[derive(Debug)]
pub struct Catalog {
    config: CatalogConfig,
    store: OverlayStore,
    parsed: Option<ParsedCatalog>,
    source: Option<LoadedSource>,
    view: TableView,
}

impl Catalog {
    /// Create a catalog over an opened store.
    pub fn new(store: OverlayStore) -> Self {
        Self::with_config(store, CatalogConfig::default())
    }

    /// Create a catalog with custom configuration.
    pub fn with_config(store: OverlayStore, config: CatalogConfig) -> Self {
        Self {
            config,
            store,
            parsed: None,
            source: None,
            view: TableView::new(),
        }
    }

    /// Create a catalog whose overlay is stored in a JSON file.
    pub fn open(store_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(OverlayStore::open_file(store_path)?))
    }

    /// Create a catalog whose overlay lives only in memory.
    pub fn in_memory() -> Self {
        Self::new(OverlayStore::in_memory())
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Parse and install a loaded document.
    ///
    /// The previous document stays in place if parsing fails. Loading a
    /// document with a different content hash starts from a fresh view.
    pub fn load(&mut self, source: LoadedSource) -> Result<&ParsedCatalog> {
        let parsed = parse_catalog_with(&source.text, &self.config)?;
        self.install(parsed, source)
    }

    /// Parse and install XML text.
    pub fn load_xml(&mut self, text: impl Into<String>) -> Result<&ParsedCatalog> {
        self.load(LoadedSource::inline(text))
    }

    /// Load, parse and install a local `.xml` file.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<&ParsedCatalog> {
        let source = load_file(path)?;
        self.load(source)
    }

    /// Fetch, parse and install XML from a URL.
    pub fn load_url(&mut self, url: &str) -> Result<&ParsedCatalog> {
        let source = fetch_url(url, &self.config.loader)?;
        self.load(source)
    }

    fn install(&mut self, parsed: ParsedCatalog, source: LoadedSource) -> Result<&ParsedCatalog> {
        self.store.touch_sync()?;

        info!(
            source = %source.metadata.display_name(),
            record_tag = %parsed.schema.record_tag,
            records = parsed.records.len(),
            fields = parsed.schema.slot_count(),
            "loaded catalog"
        );

        let same_document = self
            .source
            .as_ref()
            .is_none_or(|previous| previous.metadata.hash == source.metadata.hash);
        if !same_document {
            debug!("new document, resetting view");
            self.view = TableView::new();
        }

        self.source = Some(source);
        let parsed = self.parsed.insert(parsed);
        register_custom_columns(&mut self.view, &self.store, &parsed.records);
        Ok(&*parsed)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// The current parse, if a document is loaded.
    pub fn parsed(&self) -> Option<&ParsedCatalog> {
        self.parsed.as_ref()
    }

    /// Source records of the current document.
    pub fn records(&self) -> &[SourceRecord] {
        self.parsed
            .as_ref()
            .map(|parsed| parsed.records.as_slice())
            .unwrap_or_default()
    }

    /// Label map of the current document.
    pub fn labels(&self) -> LabelMap {
        self.parsed
            .as_ref()
            .map(|parsed| parsed.labels.clone())
            .unwrap_or_default()
    }

    /// Metadata of the current document.
    pub fn source_metadata(&self) -> Option<&SourceMetadata> {
        self.source.as_ref().map(|source| &source.metadata)
    }

    /// The overlay store.
    pub fn store(&self) -> &OverlayStore {
        &self.store
    }

    /// The table view.
    pub fn view(&self) -> &TableView {
        &self.view
    }

    /// The table view, for changing visibility, filters and sorting.
    pub fn view_mut(&mut self) -> &mut TableView {
        &mut self.view
    }

    /// Summary of the catalog's state.
    pub fn status(&self) -> CatalogStatus {
        let state = self.store.state();
        CatalogStatus {
            source: self.source_metadata().cloned(),
            record_tag: self.parsed.as_ref().map(|p| p.schema.record_tag.clone()),
            record_count: self.records().len(),
            field_names: self
                .parsed
                .as_ref()
                .map(|p| p.schema.field_names.clone())
                .unwrap_or_default(),
            dropped_fields: self
                .parsed
                .as_ref()
                .map(|p| p.schema.dropped_fields.clone())
                .unwrap_or_default(),
            overlay_version: state.version.clone(),
            last_sync: state.last_sync,
            records_with_custom_fields: state.custom_fields.len(),
            custom_field_count: state.field_count(),
            store_location: self.store.location(),
        }
    }

    // =========================================================================
    // Working records
    // =========================================================================

    /// Source records with the overlay applied, in document order.
    pub fn merge_with_source_data(&self) -> Vec<WorkingRecord> {
        self.store.merge_with_source(self.records())
    }

    /// Working records sorted and filtered by the table view.
    pub fn visible_records(&self) -> Vec<WorkingRecord> {
        self.view.apply(&self.merge_with_source_data())
    }

    /// Working record by id.
    pub fn record(&self, record_id: &str) -> Option<WorkingRecord> {
        self.records()
            .iter()
            .find(|record| record.id() == record_id)
            .map(|record| self.store.merge_with_source(std::slice::from_ref(record)))
            .and_then(|mut merged| merged.pop())
    }

    // =========================================================================
    // Edits
    // =========================================================================

    /// Set a custom field on a record.
    ///
    /// A slot key overrides that slot; any other name adds a column.
    pub fn add_custom_field(
        &mut self,
        record_id: &str,
        name: &str,
        label: &str,
        value: &str,
    ) -> Result<()> {
        self.require_record(record_id)?;

        let field = CustomField::new(name.trim(), label, value);
        self.store.upsert_field(record_id, field.clone())?;

        if !is_slot_key(&field.name) {
            self.view
                .add_custom_column(CustomColumn::new(&field.name, &field.label));
        }
        Ok(())
    }

    /// Remove a custom field from a record. Returns whether one was removed.
    pub fn remove_custom_field(&mut self, record_id: &str, name: &str) -> Result<bool> {
        self.store.remove_field(record_id, name)
    }

    /// Tag records with a new group column.
    ///
    /// The column name is the label lowercased with whitespace runs replaced by
    /// `_`; each record gets the label as value. Returns the column and the
    /// number of distinct records tagged.
    pub fn create_group<I, S>(
        &mut self,
        label: &str,
        record_ids: I,
    ) -> Result<(CustomColumn, usize)>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let record_ids: Vec<S> = record_ids.into_iter().collect();
        for record_id in &record_ids {
            self.require_record(record_id.as_ref())?;
        }

        let mut view = self.view.clone();
        let column = view.add_group_column(label)?;
        let field = CustomField::new(&column.name, &column.label, &column.label);
        let written = self.store.upsert_many(&record_ids, field)?;
        self.view = view;

        info!(group = %column.name, records = written, "created group");
        Ok((column, written))
    }

    /// Delete a custom column from the view and from every record.
    ///
    /// Returns the number of records that carried the column.
    pub fn delete_column(&mut self, name: &str) -> Result<usize> {
        let removed = self.store.remove_field_everywhere(name)?;
        self.view.remove_custom_column(name);
        info!(column = %name, records = removed, "deleted column");
        Ok(removed)
    }

    /// Drop every edit and re-parse the original document.
    pub fn clear_all_data(&mut self) -> Result<()> {
        self.store.clear()?;
        self.view = TableView::new();

        if let Some(source) = self.source.take() {
            match parse_catalog_with(&source.text, &self.config) {
                Ok(parsed) => {
                    self.install(parsed, source)?;
                }
                Err(e) => {
                    self.source = Some(source);
                    return Err(e);
                }
            }
        }

        info!("restored original catalog");
        Ok(())
    }

    // =========================================================================
    // Export
    // =========================================================================

    fn record_tag(&self) -> &str {
        self.parsed
            .as_ref()
            .map(|parsed| parsed.schema.record_tag.as_str())
            .unwrap_or(FALLBACK_RECORD_TAG)
    }

    /// Export the visible records as XML.
    pub fn export_xml(&self) -> Result<String> {
        XmlExporter::new(self.record_tag()).export(
            &self.visible_records(),
            &self.labels(),
            &self.view.export_view(),
        )
    }

    /// Export the visible records as CSV.
    pub fn export_csv(&self) -> Result<String> {
        CsvExporter::new().export(
            &self.visible_records(),
            &self.labels(),
            &self.view.export_view(),
        )
    }

    fn require_record(&self, record_id: &str) -> Result<()> {
        let parsed = self.parsed.as_ref().ok_or_else(|| {
            XmlSheetError::Validation("No catalog loaded".to_string())
        })?;

        if parsed.records.iter().any(|record| record.id() == record_id) {
            Ok(())
        } else {
            Err(XmlSheetError::Validation(format!(
                "Unknown record '{}'",
                record_id
            )))
        }
    }
}

/// Register a column for every non-slot field the overlay holds for the records.
fn register_custom_columns(view: &mut TableView, store: &OverlayStore, records: &[SourceRecord]) {
    for working in store.merge_with_source(records) {
        for field in working.custom_fields {
            view.add_custom_column(CustomColumn::new(field.name, field.label));
        }
    }
}
