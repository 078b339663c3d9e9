//! XML export.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use tracing::info;

use crate::error::{Result, XmlSheetError};
use crate::merge::WorkingRecord;
use crate::overlay::CustomField;
use crate::schema::LabelMap;

use super::view::ExportView;

/// Tag of the exported document element.
pub const EXPORT_ROOT_TAG: &str = "CATALOG";

/// Record tag used when the source record tag is unknown.
pub const FALLBACK_RECORD_TAG: &str = "record";

/// Whether `name` can be used as an element or attribute name.
pub fn is_valid_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':'))
}

fn check_name(name: &str) -> Result<()> {
    if is_valid_xml_name(name) {
        Ok(())
    } else {
        Err(XmlSheetError::Export(format!(
            "'{}' is not a valid XML element name",
            name
        )))
    }
}

fn write_error(e: impl std::fmt::Display) -> XmlSheetError {
    XmlSheetError::Export(format!("Failed to write XML: {}", e))
}

/// Serializes working records as a pretty-printed XML document.
///
/// ```text
/// <?xml version="1.0" encoding="UTF-8"?>
/// <CATALOG>
///   <ANIMAL deactivated="true">
///     <ID>1</ID>
///     <NAME>Lion</NAME>
///     <notes label="Notes">nocturnal</notes>
///   </ANIMAL>
/// </CATALOG>
/// ```
///
/// A source field tagged `ID` is written after the generated `<ID>` element.
/// Reading the export back keeps the first occurrence, so that source value
/// does not survive a round trip.
#[derive(Debug, Clone)]
pub struct XmlExporter {
    record_tag: String,
}

impl XmlExporter {
    /// Exporter writing records under the given tag; empty falls back to `record`.
    pub fn new(record_tag: impl Into<String>) -> Self {
        let record_tag = record_tag.into();
        let record_tag = if record_tag.trim().is_empty() {
            FALLBACK_RECORD_TAG.to_string()
        } else {
            record_tag
        };
        Self { record_tag }
    }

    /// Tag used for each record element.
    pub fn record_tag(&self) -> &str {
        &self.record_tag
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
        String::from_utf8(buffer).map_err(write_error)
    }

    /// Export to a writer. Nothing is written if a tag name is invalid.
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

        check_name(&self.record_tag)?;
        for (_, label) in &columns {
            check_name(label)?;
        }
        for record in records {
            for field in visible_custom_fields(record, view) {
                check_name(&field.name)?;
            }
        }

        let mut xml = Writer::new_with_indent(writer, b' ', 2);
        xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_error)?;

        if records.is_empty() {
            xml.write_event(Event::Empty(BytesStart::new(EXPORT_ROOT_TAG)))
                .map_err(write_error)?;
        } else {
            xml.write_event(Event::Start(BytesStart::new(EXPORT_ROOT_TAG)))
                .map_err(write_error)?;

            for record in records {
                let mut element = BytesStart::new(self.record_tag.as_str());
                if view.is_deactivated(record.id()) {
                    element.push_attribute(("deactivated", "true"));
                }
                xml.write_event(Event::Start(element)).map_err(write_error)?;

                for (key, label) in &columns {
                    let value = record.get(key).unwrap_or_default();
                    write_text_element(&mut xml, label, None, value)?;
                }

                for field in visible_custom_fields(record, view) {
                    write_text_element(
                        &mut xml,
                        &field.name,
                        Some(("label", field.label.as_str())),
                        &field.value,
                    )?;
                }

                xml.write_event(Event::End(BytesEnd::new(self.record_tag.as_str())))
                    .map_err(write_error)?;
            }

            xml.write_event(Event::End(BytesEnd::new(EXPORT_ROOT_TAG)))
                .map_err(write_error)?;
        }

        let mut inner = xml.into_inner();
        inner.write_all(b"\n").map_err(write_error)?;
        inner.flush().map_err(write_error)?;

        info!(
            records = records.len(),
            columns = columns.len(),
            record_tag = %self.record_tag,
            "exported XML"
        );
        Ok(())
    }
}

fn visible_custom_fields<'a>(
    record: &'a WorkingRecord,
    view: &'a ExportView,
) -> impl Iterator<Item = &'a CustomField> {
    record
        .custom_fields
        .iter()
        .filter(|field| view.is_visible(&field.name))
}

fn write_text_element<W: Write>(
    xml: &mut Writer<W>,
    name: &str,
    attribute: Option<(&str, &str)>,
    text: &str,
) -> Result<()> {
    let mut start = BytesStart::new(name);
    if let Some(attribute) = attribute {
        start.push_attribute(attribute);
    }
    xml.write_event(Event::Start(start)).map_err(write_error)?;
    xml.write_event(Event::Text(BytesText::new(text)))
        .map_err(write_error)?;
    xml.write_event(Event::End(BytesEnd::new(name)))
        .map_err(write_error)?;
    Ok(())
}
