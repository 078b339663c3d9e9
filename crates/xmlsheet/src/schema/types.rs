//! Slot keys: the positional field names every record is keyed by.

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum number of positional slots a record can carry.
pub const MAX_SLOTS: usize = 20;

/// Key of the synthesized ordinal id.
pub const ID_KEY: &str = "id";

/// Label of the synthesized ordinal id.
pub const ID_LABEL: &str = "ID";

// =============================================================================
// LAZY STATIC PATTERNS
// =============================================================================

static SLOT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^slot_([1-9][0-9]*)$").unwrap());

/// Slot key for a 1-based position.
pub fn slot_key(position: usize) -> String {
    format!("slot_{}", position)
}

/// The 1-based position named by a slot key, if it is one of the `MAX_SLOTS` slots.
pub fn slot_position(name: &str) -> Option<usize> {
    let captures = SLOT_PATTERN.captures(name)?;
    let position: usize = captures.get(1)?.as_str().parse().ok()?;
    (position <= MAX_SLOTS).then_some(position)
}

/// Whether a field name addresses a positional slot rather than a new column.
pub fn is_slot_key(name: &str) -> bool {
    slot_position(name).is_some()
}

/// `id` followed by every slot key, in display order.
pub fn all_field_keys() -> Vec<String> {
    std::iter::once(ID_KEY.to_string())
        .chain((1..=MAX_SLOTS).map(slot_key))
        .collect()
}
