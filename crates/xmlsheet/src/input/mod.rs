//! Input parsing and XML source handling.

mod document;
mod parser;
mod source;

pub use document::{Element, Node, XmlDocument};
pub use parser::{Parser, ParserConfig, parse_document};
pub use source::{
    LoadedSource, LoaderConfig, SourceMetadata, SourceOrigin, fetch_url, has_xml_extension,
    load_file,
};
