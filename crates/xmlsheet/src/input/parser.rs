//! Well-formedness parser turning XML text into an element tree.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use tracing::debug;

use crate::error::{Result, XmlSheetError};

use super::document::{Element, Node, XmlDocument};

/// Parser configuration.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum element nesting depth accepted.
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { max_depth: 512 }
    }
}

/// Parses XML text into an [`XmlDocument`].
pub struct Parser {
    config: ParserConfig,
}

impl Parser {
    /// Create a new parser with default configuration.
    pub fn new() -> Self {
        Self {
            config: ParserConfig::default(),
        }
    }

    /// Create a parser with custom configuration.
    pub fn with_config(config: ParserConfig) -> Self {
        Self { config }
    }

    /// Parse a complete document.
    ///
    /// Input without any element yields a document whose `root` is `None`;
    /// deciding whether that is acceptable is left to schema inference.
    pub fn parse_str(&self, text: &str) -> Result<XmlDocument> {
        let mut reader = Reader::from_str(text);
        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| parse_error(reader.error_position(), e.to_string()))?;
            let position = reader.buffer_position();

            match event {
                Event::Start(start) => {
                    if root.is_some() {
                        return Err(parse_error(position, "multiple root elements"));
                    }
                    if stack.len() >= self.config.max_depth {
                        return Err(parse_error(
                            position,
                            format!("nesting deeper than {} elements", self.config.max_depth),
                        ));
                    }
                    stack.push(Element::new(decode_name(start.name().as_ref(), position)?));
                }
                Event::Empty(start) => {
                    let element = Element::new(decode_name(start.name().as_ref(), position)?);
                    attach(element, &mut stack, &mut root, position)?;
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| parse_error(position, "unexpected closing tag"))?;
                    attach(element, &mut stack, &mut root, position)?;
                }
                Event::Text(raw) => {
                    let text = raw
                        .decode()
                        .map_err(|e| parse_error(position, e.to_string()))?;
                    push_text(&text, &mut stack, position)?;
                }
                Event::CData(raw) => {
                    let text = raw
                        .decode()
                        .map_err(|e| parse_error(position, e.to_string()))?;
                    push_text(&text, &mut stack, position)?;
                }
                Event::GeneralRef(reference) => {
                    let name = reference
                        .decode()
                        .map_err(|e| parse_error(position, e.to_string()))?;
                    let resolved = resolve_reference(&name)
                        .ok_or_else(|| parse_error(position, format!("unknown entity '&{};'", name)))?;
                    push_text(&resolved, &mut stack, position)?;
                }
                Event::Eof => break,
                // Declarations, comments, processing instructions and doctypes carry no data.
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(parse_error(
                reader.buffer_position(),
                format!("unclosed element <{}>", open.name),
            ));
        }

        let document = XmlDocument { root };
        debug!(elements = document.element_count(), "parsed XML document");
        Ok(document)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse XML text with the default configuration.
pub fn parse_document(text: &str) -> Result<XmlDocument> {
    Parser::new().parse_str(text)
}

fn parse_error(position: u64, message: impl Into<String>) -> XmlSheetError {
    XmlSheetError::Parse {
        position,
        message: message.into(),
    }
}

fn decode_name(raw: &[u8], position: u64) -> Result<String> {
    std::str::from_utf8(raw)
        .map(str::to_string)
        .map_err(|e| parse_error(position, format!("invalid tag name: {}", e)))
}

/// Hand a finished element to its parent, or make it the document element.
fn attach(
    element: Element,
    stack: &mut [Element],
    root: &mut Option<Element>,
    position: u64,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.nodes.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(parse_error(position, "multiple root elements")),
    }
    Ok(())
}

fn push_text(text: &str, stack: &mut [Element], position: u64) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.push_text(text),
        None if text.trim().is_empty() => {}
        None => return Err(parse_error(position, "text outside the root element")),
    }
    Ok(())
}

/// Resolve a predefined entity or a character reference (`#123`, `#x7B`).
fn resolve_reference(name: &str) -> Option<String> {
    let predefined = match name {
        "amp" => Some("&"),
        "lt" => Some("<"),
        "gt" => Some(">"),
        "quot" => Some("\""),
        "apos" => Some("'"),
        _ => None,
    };
    if let Some(value) = predefined {
        return Some(value.to_string());
    }

    let reference = name.strip_prefix('#')?;
    let code = match reference.strip_prefix('x').or_else(|| reference.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => reference.parse::<u32>().ok()?,
    };
    char::from_u32(code).map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_catalog() {
        let doc = parse_document(
            "<?xml version=\"1.0\"?>\n<CATALOG>\n  <ANIMAL><NAME>Lion</NAME></ANIMAL>\n</CATALOG>",
        )
        .unwrap();

        let root = doc.root.expect("root element");
        assert_eq!(root.name, "CATALOG");
        let animal = root.child_elements().next().unwrap();
        assert_eq!(animal.name, "ANIMAL");
        assert_eq!(animal.first_child("NAME").unwrap().text_content(), "Lion");
    }

    #[test]
    fn test_entities_and_cdata_are_text() {
        let doc = parse_document("<R><N>Tom &amp; Jerry &#65;&#x42;</N><C><![CDATA[<raw>]]></C></R>")
            .unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.first_child("N").unwrap().text_content(), "Tom & Jerry AB");
        assert_eq!(root.first_child("C").unwrap().text_content(), "<raw>");
    }

    #[test]
    fn test_empty_element_has_no_content() {
        let doc = parse_document("<ROOT/>").unwrap();
        let root = doc.root.unwrap();
        assert_eq!(root.name, "ROOT");
        assert!(root.nodes.is_empty());
    }

    #[test]
    fn test_empty_input_has_no_root() {
        assert!(parse_document("").unwrap().root.is_none());
        assert!(parse_document("<?xml version=\"1.0\"?>\n<!-- nothing -->").unwrap().root.is_none());
    }

    #[test]
    fn test_mismatched_tags_rejected() {
        let err = parse_document("<A><B></A></B>").unwrap_err();
        assert!(matches!(err, XmlSheetError::Parse { .. }));
    }

    #[test]
    fn test_unclosed_element_rejected() {
        let err = parse_document("<A><B>text</B>").unwrap_err();
        assert!(matches!(err, XmlSheetError::Parse { .. }));
    }

    #[test]
    fn test_multiple_roots_rejected() {
        let err = parse_document("<A/><B/>").unwrap_err();
        assert!(err.to_string().contains("multiple root elements"));
    }

    #[test]
    fn test_text_outside_root_rejected() {
        assert!(parse_document("<A/>trailing").is_err());
        assert!(parse_document("  <A/>\n").is_ok());
    }

    #[test]
    fn test_max_depth() {
        let parser = Parser::with_config(ParserConfig { max_depth: 2 });
        assert!(parser.parse_str("<A><B/></A>").is_ok());
        assert!(parser.parse_str("<A><B><C></C></B></A>").is_err());
    }

    #[test]
    fn test_resolve_reference() {
        assert_eq!(resolve_reference("lt").as_deref(), Some("<"));
        assert_eq!(resolve_reference("#x263A").as_deref(), Some("\u{263A}"));
        assert_eq!(resolve_reference("nbsp"), None);
    }
}
