//! Record shape inference: picks the record element type and its field set.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use crate::error::{Result, XmlSheetError};
use crate::input::{Element, XmlDocument};
use crate::schema::{MAX_SLOTS, RecordLayout, RecordSchema};

/// Configuration for shape inference.
#[derive(Debug, Clone)]
pub struct InferenceConfig {
    /// Maximum number of fields kept per record.
    pub max_slots: usize,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_slots: MAX_SLOTS,
        }
    }
}

/// A record schema together with the elements it was inferred from.
#[derive(Debug, Clone)]
pub struct InferredRecords<'a> {
    pub schema: RecordSchema,
    pub elements: Vec<&'a Element>,
}

/// Decides which element type represents a record and which fields it has.
pub struct ShapeInferencer {
    config: InferenceConfig,
}

impl ShapeInferencer {
    /// Create an inferencer with default configuration.
    pub fn new() -> Self {
        Self::with_config(InferenceConfig::default())
    }

    /// Create an inferencer with custom configuration.
    pub fn with_config(config: InferenceConfig) -> Self {
        let max_slots = config.max_slots.clamp(1, MAX_SLOTS);
        Self {
            config: InferenceConfig { max_slots },
        }
    }

    /// Infer the record schema of a document.
    pub fn infer<'a>(&self, document: &'a XmlDocument) -> Result<InferredRecords<'a>> {
        let root = document
            .root
            .as_ref()
            .filter(|root| root.has_child_elements())
            .ok_or_else(|| XmlSheetError::schema("empty document"))?;

        let (record_tag, layout, elements) = if is_flat(root) {
            (root.name.clone(), RecordLayout::SingleRecord, vec![root])
        } else {
            let tag = most_frequent_record_tag(root)
                .ok_or_else(|| XmlSheetError::schema("no records"))?;
            let elements = collect_records(root, &tag);
            (tag, RecordLayout::Repeated, elements)
        };

        if elements.is_empty() {
            return Err(XmlSheetError::schema("no records"));
        }

        let mut field_names = union_field_names(&elements);
        let dropped_fields = if field_names.len() > self.config.max_slots {
            field_names.split_off(self.config.max_slots)
        } else {
            Vec::new()
        };
        if !dropped_fields.is_empty() {
            warn!(
                record_tag = %record_tag,
                dropped = ?dropped_fields,
                "record has more fields than available slots; extra fields are ignored"
            );
        }

        debug!(
            record_tag = %record_tag,
            ?layout,
            records = elements.len(),
            fields = field_names.len(),
            "inferred record schema"
        );

        Ok(InferredRecords {
            schema: RecordSchema {
                record_tag,
                layout,
                field_names,
                dropped_fields,
                record_count: elements.len(),
            },
            elements,
        })
    }
}

impl Default for ShapeInferencer {
    fn default() -> Self {
        Self::new()
    }
}

/// The root's children are all leaves: the root is a single flat record.
fn is_flat(root: &Element) -> bool {
    root.child_elements().all(|child| !child.has_child_elements())
}

/// Most frequent tag among record-shaped elements below the root.
///
/// Ties go to the tag seen first in document order. The root only competes
/// when nothing below it is record-shaped.
fn most_frequent_record_tag(root: &Element) -> Option<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for child in root.child_elements() {
        child.walk(&mut |element| {
            if element.has_child_elements() {
                *counts.entry(element.name.as_str()).or_insert(0) += 1;
            }
        });
    }

    let mut best: Option<(&str, usize)> = None;
    for (tag, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((tag, count));
        }
    }

    best.map(|(tag, _)| tag.to_string())
        .or_else(|| root.has_child_elements().then(|| root.name.clone()))
}

/// All record-shaped elements carrying the tag, in document order.
fn collect_records<'a>(root: &'a Element, tag: &str) -> Vec<&'a Element> {
    let mut records = Vec::new();
    root.walk(&mut |element| {
        if element.name == tag && element.has_child_elements() {
            records.push(element);
        }
    });
    records
}

/// Distinct child tag names across all records, in order of first appearance.
fn union_field_names(records: &[&Element]) -> Vec<String> {
    let mut names: IndexSet<&str> = IndexSet::new();
    for record in records {
        for child in record.child_elements() {
            names.insert(child.name.as_str());
        }
    }
    names.into_iter().map(str::to_string).collect()
}
