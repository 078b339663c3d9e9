//! Export serializers: XML and CSV projections of the working records.
//!
//! Both take the records already filtered and sorted, the label map of the
//! current parse and an [`ExportView`] describing visible columns and
//! deactivated rows. Hidden fields are not exported.

mod delimited;
mod view;
mod xml;

pub use delimited::CsvExporter;
pub use view::ExportView;
pub use xml::{EXPORT_ROOT_TAG, FALLBACK_RECORD_TAG, XmlExporter, is_valid_xml_name};
