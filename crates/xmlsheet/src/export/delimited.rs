//! CSV export.

use std::io::Write;

use ::csv::{QuoteStyle, Terminator, WriterBuilder};
use tracing::info;

use crate::error::{Result, XmlSheetError};
use crate::merge::WorkingRecord;
use crate::schema::LabelMap;

use super::view::ExportView;

/// Serializes working records as comma-separated values.
///
/// Every field is quoted and embedded quotes are doubled. Rows end with `\n`.
/// Deactivated records are exported like any other row.
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl CsvExporter {
    /// Create a CSV exporter.
    pub fn new() -> Self {
        Self
    }

    /// Export to a string.
    pub fn export(
        &self,
        records: &[WorkingRecord],
        labels: &LabelMap,
        view: &ExportView,
    ) -> Result<String> {
        let mut buffer = Vec::new();
        self.write(&mut buffer, records, labels, view)?;
        String::from_utf8(buffer)
            .map_err(|e| XmlSheetError::Export(format!("Failed to write CSV: {}", e)))
    }

    /// Export to a writer.
    pub fn write<W: Write>(
        &self,
        writer: W,
        records: &[WorkingRecord],
        labels: &LabelMap,
        view: &ExportView,
    ) -> Result<()> {
        let columns: Vec<(&str, &str)> = labels
            .iter()
            .filter(|(key, _)| view.is_visible(key))
            .collect();
        let custom_columns: Vec<_> = view.visible_custom_columns().collect();

        let mut csv = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .from_writer(writer);

        let header = columns
            .iter()
            .map(|(_, label)| *label)
            .chain(custom_columns.iter().map(|column| column.label.as_str()));
        csv.write_record(header)?;

        for record in records {
            let row = columns
                .iter()
                .map(|(key, _)| record.get(key).unwrap_or_default())
                .chain(custom_columns.iter().map(|column| {
                    record
                        .custom_field(&column.name)
                        .map(|field| field.value.as_str())
                        .unwrap_or_default()
                }));
            csv.write_record(row)?;
        }

        csv.flush().map_err(|e| XmlSheetError::Export(format!("Failed to write CSV: {}", e)))?;

        info!(
            records = records.len(),
            columns = columns.len() + custom_columns.len(),
            "exported CSV"
        );
        Ok(())
    }
}
