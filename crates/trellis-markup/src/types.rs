/*
 * types.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Node tree and document types.

use crate::encoding::Encoding;

/// Markup flavour of a document. Decides both parsing and serialization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Html,
    Xml,
}

/// The body of a `<!DOCTYPE ...>` declaration, e.g. `html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctype(pub String);

impl Doctype {
    pub fn new(body: impl Into<String>) -> Self {
        Self(body.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A parsed template or rendered output.
///
/// The node list is the document content; a document may have any number of
/// top-level nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub format: DocumentFormat,
    pub encoding: Encoding,
    pub doctype: Option<Doctype>,
    pub content: Vec<Node>,
}

impl Document {
    /// Create a UTF-8 document without a doctype.
    pub fn new(format: DocumentFormat, content: Vec<Node>) -> Self {
        Self {
            format,
            encoding: Encoding::Utf8,
            doctype: None,
            content,
        }
    }

    pub fn html(content: Vec<Node>) -> Self {
        Self::new(DocumentFormat::Html, content)
    }

    pub fn xml(content: Vec<Node>) -> Self {
        Self::new(DocumentFormat::Xml, content)
    }

    pub fn with_doctype(mut self, doctype: Option<Doctype>) -> Self {
        self.doctype = doctype;
        self
    }

    pub fn with_encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }
}

/// A single node of the markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Character data, already entity-decoded.
    Text(String),
    Comment(String),
    Cdata(String),
    /// Processing instruction body, without the `<?` and `?>` delimiters.
    ProcessingInstruction(String),
}

/// An element with ordered attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

/// An attribute; `value` holds the decoded text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

impl Attribute {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl Element {
    /// Create an element with no attributes and no children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute append.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(name, value));
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Get an attribute value by name.
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }

    /// Replace the value of an existing attribute, or append a new one.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|a| a.name == name) {
            Some(attr) => attr.value = value,
            None => self.attributes.push(Attribute { name, value }),
        }
    }

    /// Get child elements by name.
    pub fn get_children(&self, name: &str) -> Vec<&Element> {
        self.children
            .iter()
            .filter_map(|c| match c {
                Node::Element(e) if e.name == name => Some(e),
                _ => None,
            })
            .collect()
    }

    /// Concatenated text of all descendant text and CDATA nodes.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        collect_text(&self.children, &mut out);
        out
    }
}

impl Node {
    pub fn text(content: impl Into<String>) -> Self {
        Node::Text(content.into())
    }

    pub fn element(name: impl Into<String>) -> Self {
        Node::Element(Element::new(name))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    pub fn element_name(&self) -> Option<&str> {
        self.as_element().map(|e| e.name.as_str())
    }

    /// Attribute lookup; `None` for anything but an element.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.as_element().and_then(|e| e.get_attribute(name))
    }

    /// Child nodes; empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(e) => &e.children,
            _ => &[],
        }
    }

    /// The textual content of this node.
    ///
    /// Comments and processing instructions contribute nothing.
    pub fn text_content(&self) -> String {
        match self {
            Node::Text(t) | Node::Cdata(t) => t.clone(),
            Node::Element(e) => e.text_content(),
            Node::Comment(_) | Node::ProcessingInstruction(_) => String::new(),
        }
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

fn collect_text(nodes: &[Node], out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(t) | Node::Cdata(t) => out.push_str(t),
            Node::Element(e) => collect_text(&e.children, out),
            Node::Comment(_) | Node::ProcessingInstruction(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_get_attribute() {
        let element = Element::new("test").with_attribute("name", "value");

        assert_eq!(element.get_attribute("name"), Some("value"));
        assert_eq!(element.get_attribute("missing"), None);
    }

    #[test]
    fn test_set_attribute_replaces_in_place() {
        let mut element = Element::new("a")
            .with_attribute("href", "/old")
            .with_attribute("class", "x");
        element.set_attribute("href", "/new");
        element.set_attribute("id", "y");

        let names: Vec<_> = element.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["href", "class", "id"]);
        assert_eq!(element.get_attribute("href"), Some("/new"));
    }

    #[test]
    fn test_text_content_flattens_markup() {
        let node = Node::Element(Element::new("p").with_children(vec![
            Node::text("Hello, "),
            Node::Element(Element::new("b").with_children(vec![Node::text("world")])),
            Node::Comment("ignored".to_string()),
            Node::Cdata("!".to_string()),
        ]));

        assert_eq!(node.text_content(), "Hello, world!");
    }

    #[test]
    fn test_leaf_helpers() {
        let text = Node::text("x");
        assert_eq!(text.element_name(), None);
        assert_eq!(text.attribute("a"), None);
        assert!(text.children().is_empty());
    }
}
