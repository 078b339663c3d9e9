//! Schema types for representing the inferred record structure.

mod record;
mod table;
mod types;

pub use record::{LabelMap, RecordId, SourceRecord};
pub use table::{RecordLayout, RecordSchema};
pub use types::{ID_KEY, ID_LABEL, MAX_SLOTS, all_field_keys, is_slot_key, slot_key, slot_position};
