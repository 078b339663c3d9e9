//! Merge engine that applies overlay fields to source records.

use crate::overlay::OverlayState;
use crate::schema::{SourceRecord, is_slot_key};

use super::working::WorkingRecord;

/// Applies overlay fields to source records.
///
/// Per record, overlay fields split into slot overrides (the name is a slot
/// key the record carries) and extras (the name is not a slot key). Slot-shaped
/// names for slots the record lacks are dropped. Source records are never
/// modified.
pub struct MergeEngine;

impl MergeEngine {
    /// Create a new merge engine.
    pub fn new() -> Self {
        Self
    }

    /// Merge every record with its overlay fields, preserving record order.
    pub fn merge(&self, overlay: &OverlayState, records: &[SourceRecord]) -> Vec<WorkingRecord> {
        records
            .iter()
            .map(|record| self.merge_record(overlay, record))
            .collect()
    }

    /// Merge one record with its overlay fields.
    pub fn merge_record(&self, overlay: &OverlayState, record: &SourceRecord) -> WorkingRecord {
        let mut working = WorkingRecord::from_source(record.clone());

        for field in overlay.fields_for(record.id()) {
            if is_slot_key(&field.name) {
                working.record.set(&field.name, field.value.as_str());
            } else {
                working.custom_fields.push(field.clone());
            }
        }

        working
    }
}

impl Default for MergeEngine {
    fn default() -> Self {
        Self::new()
    }
}
