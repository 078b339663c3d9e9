//! Record normalization: record elements to flat, slot-keyed records.

use crate::input::Element;
use crate::schema::{LabelMap, RecordSchema, SourceRecord, slot_key};

/// Flatten record elements into source records and build the label map.
///
/// Field order in `schema.field_names` fixes slot assignment for both outputs.
/// A field missing from a record becomes an empty string. Values keep their
/// whitespace exactly as written.
pub fn normalize_records(schema: &RecordSchema, elements: &[&Element]) -> (Vec<SourceRecord>, LabelMap) {
    let records = elements
        .iter()
        .enumerate()
        .map(|(index, element)| normalize_record(index + 1, schema, element))
        .collect();

    (records, LabelMap::from_field_names(&schema.field_names))
}

fn normalize_record(ordinal: usize, schema: &RecordSchema, element: &Element) -> SourceRecord {
    let mut record = SourceRecord::new(ordinal.to_string());
    for (index, field_name) in schema.field_names.iter().enumerate() {
        let value = element
            .first_child(field_name)
            .map(Element::text_content)
            .unwrap_or_default();
        record.insert(slot_key(index + 1), value);
    }
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::ShapeInferencer;
    use crate::input::parse_document;

    fn normalize(xml: &str) -> (Vec<SourceRecord>, LabelMap) {
        let document = parse_document(xml).unwrap();
        let inferred = ShapeInferencer::new().infer(&document).unwrap();
        normalize_records(&inferred.schema, &inferred.elements)
    }

    #[test]
    fn test_ids_are_sequential() {
        let (records, _) = normalize("<C><R><A>x</A></R><R><A>y</A></R><R><A>z</A></R></C>");
        let ids: Vec<_> = records.iter().map(|r| r.id()).collect();
        assert_eq!(ids, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_missing_fields_are_empty() {
        let (records, labels) = normalize("<C><R><A>1</A></R><R><B>2</B></R></C>");

        assert_eq!(records[0].get("slot_1"), Some("1"));
        assert_eq!(records[0].get("slot_2"), Some(""));
        assert_eq!(records[1].get("slot_1"), Some(""));
        assert_eq!(records[1].get("slot_2"), Some("2"));
        assert_eq!(labels.label("slot_2"), Some("B"));
    }

    #[test]
    fn test_first_occurrence_of_repeated_child_wins() {
        let (records, _) = normalize("<C><R><A>first</A><A>second</A></R><R><A>x</A></R></C>");
        assert_eq!(records[0].get("slot_1"), Some("first"));
        assert_eq!(records[0].slot_count(), 1);
    }

    #[test]
    fn test_values_keep_surrounding_whitespace() {
        let (records, _) = normalize(
            "<C>\n  <R>\n    <A>  padded  </A>\n    <B><I>nested</I> text</B>\n  </R>\n  <R><A/></R>\n</C>",
        );
        assert_eq!(records[0].get("slot_1"), Some("  padded  "));
        assert_eq!(records[0].get("slot_2"), Some("nested text"));
        assert_eq!(records[1].get("slot_1"), Some(""));
    }

    #[test]
    fn test_labels_include_id() {
        let (_, labels) = normalize("<C><R><NAME>a</NAME></R></C>");
        assert_eq!(labels.label("id"), Some("ID"));
        assert_eq!(labels.label("slot_1"), Some("NAME"));
        assert_eq!(labels.len(), 2);
    }
}
