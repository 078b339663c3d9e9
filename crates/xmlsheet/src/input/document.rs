//! In-memory element tree for a parsed XML document.

/// A node inside an element: either a child element or a run of text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An XML element with its name and ordered content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Qualified tag name as written in the source.
    pub name: String,
    /// Child nodes in document order.
    pub nodes: Vec<Node>,
}

impl Element {
    /// Create an element without content.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Iterate over direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Element(element) => Some(element),
            Node::Text(_) => None,
        })
    }

    /// Whether this element has at least one child element.
    pub fn has_child_elements(&self) -> bool {
        self.child_elements().next().is_some()
    }

    /// First direct child element with the given tag name.
    pub fn first_child(&self, name: &str) -> Option<&Element> {
        self.child_elements().find(|child| child.name == name)
    }

    /// Concatenated text of this element and all descendants, in document order.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Element(element) => element.collect_text(out),
            }
        }
    }

    /// Visit this element and every descendant element in document (pre-)order.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        visit(self);
        for child in self.child_elements() {
            child.walk(visit);
        }
    }

    pub(crate) fn push_text(&mut self, text: &str) {
        if let Some(Node::Text(existing)) = self.nodes.last_mut() {
            existing.push_str(text);
        } else {
            self.nodes.push(Node::Text(text.to_string()));
        }
    }
}

/// A parsed XML document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlDocument {
    /// The document element, if the input contained one.
    pub root: Option<Element>,
}

impl XmlDocument {
    /// Total number of elements in the document.
    pub fn element_count(&self) -> usize {
        let mut count = 0;
        if let Some(root) = &self.root {
            root.walk(&mut |_| count += 1);
        }
        count
    }
}
