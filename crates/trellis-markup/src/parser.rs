/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! HTML and XML parsers that build [`Document`] node trees.
//!
//! Both flavours share one event loop over `quick-xml`. XML is strict: a
//! mismatched, stray or missing end tag is an error. HTML is lenient in the
//! ways templates need: void elements, raw-text `script`/`style` bodies,
//! valueless attributes, HTML named entities, and recovery from unbalanced
//! tags.

use crate::encoding::decode;
use crate::{Attribute, Doctype, Document, DocumentFormat, Element, Error, Node, Result};
use quick_xml::Reader;
use quick_xml::escape::{resolve_html5_entity, unescape_with};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

/// HTML elements that never have content or an end tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// HTML elements whose content is raw text, not markup.
pub const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Parse template bytes according to `format`.
pub fn parse(bytes: &[u8], format: DocumentFormat) -> Result<Document> {
    let (encoding, content) = decode(bytes)?;
    let doc = parse_str(&content, format)?;
    Ok(doc.with_encoding(encoding))
}

/// Parse HTML template bytes.
///
/// # Example
///
/// ```rust
/// use trellis_markup::{parse_html, Node};
///
/// let doc = parse_html(b"<!DOCTYPE html><p>Hi<br>there</p>").unwrap();
/// assert_eq!(doc.doctype.unwrap().as_str(), "html");
/// let p = doc.content[0].as_element().unwrap();
/// assert_eq!(p.children.len(), 3);
/// ```
pub fn parse_html(bytes: &[u8]) -> Result<Document> {
    parse(bytes, DocumentFormat::Html)
}

/// Parse XML template bytes.
///
/// # Errors
///
/// Returns an error if the XML is malformed.
pub fn parse_xml(bytes: &[u8]) -> Result<Document> {
    parse(bytes, DocumentFormat::Xml)
}

/// Parse already-decoded markup. The resulting document is tagged UTF-8.
pub fn parse_str(content: &str, format: DocumentFormat) -> Result<Document> {
    let mut parser = MarkupParser::new(content, format);
    parser.parse()?;
    Ok(Document::new(format, parser.top).with_doctype(parser.doctype))
}

/// Internal parser state.
struct MarkupParser<'a> {
    source: &'a str,
    reader: Reader<&'a [u8]>,
    /// Byte offset of the reader's input within `source`.
    offset: usize,
    format: DocumentFormat,

    /// Stack of elements being built.
    stack: Vec<BuildNode>,

    /// Completed top-level nodes.
    top: Vec<Node>,

    doctype: Option<Doctype>,
}

/// An element being constructed during parsing.
struct BuildNode {
    name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl BuildNode {
    fn finish(self) -> Node {
        Node::Element(Element {
            name: self.name,
            attributes: self.attributes,
            children: self.children,
        })
    }
}

impl<'a> MarkupParser<'a> {
    fn new(source: &'a str, format: DocumentFormat) -> Self {
        Self {
            source,
            reader: make_reader(source),
            offset: 0,
            format,
            stack: Vec::new(),
            top: Vec::new(),
            doctype: None,
        }
    }

    fn is_html(&self) -> bool {
        self.format == DocumentFormat::Html
    }

    /// Position in `source` of the reader's next byte.
    fn source_position(&self) -> usize {
        self.offset + self.reader.buffer_position() as usize
    }

    fn error_position(&self) -> u64 {
        self.offset as u64 + self.reader.error_position()
    }

    /// Take the body of a raw-text element verbatim, up to its (ASCII
    /// case-insensitive) end tag, and continue reading after that tag. A
    /// missing end tag takes the rest of the input.
    fn read_raw_text(&mut self, name: &str) -> &'a str {
        let source = self.source;
        let start = self.source_position();
        let rest = &source[start..];

        let (body, resume) = match find_end_tag(rest, name) {
            Some(end) => {
                let close = rest[end..].find('>').map_or(rest.len(), |i| end + i + 1);
                (&rest[..end], start + close)
            }
            None => (rest, source.len()),
        };

        self.reader = make_reader(&source[resume..]);
        self.offset = resume;
        body
    }

    fn parse(&mut self) -> Result<()> {
        loop {
            match self.reader.read_event() {
                Ok(Event::Start(e)) => self.handle_start(e)?,
                Ok(Event::End(e)) => self.handle_end(e)?,
                Ok(Event::Empty(e)) => {
                    let element = self.make_element(&e)?;
                    self.push_node(Node::Element(element));
                }
                Ok(Event::Text(e)) => self.handle_text(e)?,
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    self.push_node(Node::Cdata(text));
                }
                Ok(Event::Comment(e)) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    self.push_node(Node::Comment(text));
                }
                Ok(Event::PI(e)) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    self.push_node(Node::ProcessingInstruction(text));
                }
                Ok(Event::Decl(_)) => {
                    // The output declaration is regenerated from the document encoding.
                }
                Ok(Event::DocType(e)) => {
                    let body = String::from_utf8_lossy(&e).trim().to_string();
                    self.doctype = Some(Doctype(body));
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Syntax {
                        message: e.to_string(),
                        position: Some(self.error_position()),
                    });
                }
            }
        }

        if self.is_html() {
            while let Some(node) = self.stack.pop() {
                tracing::trace!(element = %node.name, "closing element left open at end of input");
                self.push_node(node.finish());
            }
        } else if let Some(node) = self.stack.last() {
            return Err(Error::UnexpectedEof {
                expected: format!("closing tag </{}>", node.name),
            });
        }

        Ok(())
    }

    fn push_node(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.top.push(node),
        }
    }

    fn handle_start(&mut self, e: BytesStart<'_>) -> Result<()> {
        let element = self.make_element(&e)?;

        if self.is_html() && is_void_element(&element.name) {
            self.push_node(Node::Element(element));
            return Ok(());
        }

        if self.is_html() && is_raw_text_element(&element.name) {
            let body = self.read_raw_text(&element.name);
            let mut element = element;
            if !body.is_empty() {
                element.children.push(Node::text(body));
            }
            self.push_node(Node::Element(element));
            return Ok(());
        }

        self.stack.push(BuildNode {
            name: element.name,
            attributes: element.attributes,
            children: Vec::new(),
        });
        Ok(())
    }

    fn handle_end(&mut self, e: BytesEnd<'_>) -> Result<()> {
        let end_name = String::from_utf8_lossy(e.name().as_ref()).into_owned();

        if self.is_html() {
            if is_void_element(&end_name) {
                return Ok(());
            }
            let Some(pos) = self
                .stack
                .iter()
                .rposition(|n| n.name.eq_ignore_ascii_case(&end_name))
            else {
                tracing::trace!(element = %end_name, "dropping stray end tag");
                return Ok(());
            };
            // Elements opened after the matching one are closed implicitly.
            while self.stack.len() > pos + 1 {
                if let Some(node) = self.stack.pop() {
                    self.push_node(node.finish());
                }
            }
            if let Some(node) = self.stack.pop() {
                self.push_node(node.finish());
            }
            return Ok(());
        }

        let node = self
            .stack
            .pop()
            .ok_or_else(|| Error::UnexpectedEndTag(end_name.clone()))?;
        if node.name != end_name {
            return Err(Error::MismatchedEndTag {
                expected: node.name,
                found: end_name,
            });
        }
        self.push_node(node.finish());
        Ok(())
    }

    fn handle_text(&mut self, e: BytesText<'_>) -> Result<()> {
        let text = if self.is_html() {
            let raw = String::from_utf8_lossy(&e);
            // Bare ampersands and unknown entities stay as written.
            match unescape_with(&raw, resolve_html5_entity) {
                Ok(text) => text.into_owned(),
                Err(_) => raw.into_owned(),
            }
        } else {
            e.unescape()
                .map_err(|err| Error::Syntax {
                    message: format!("invalid text content: {}", err),
                    position: Some(self.source_position() as u64),
                })?
                .into_owned()
        };

        // Whitespace before the first node (after a declaration or doctype) is
        // not content; the serializer writes its own line break there.
        let leading = self.stack.is_empty() && self.top.is_empty();
        if text.is_empty() || (leading && text.trim().is_empty()) {
            return Ok(());
        }
        self.push_node(Node::Text(text));
        Ok(())
    }

    fn make_element(&self, e: &BytesStart<'_>) -> Result<Element> {
        let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
        let attributes = self.parse_attributes(e)?;
        Ok(Element {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    fn parse_attributes(&self, e: &BytesStart<'_>) -> Result<Vec<Attribute>> {
        let mut attributes = Vec::new();

        if self.is_html() {
            for attr_result in e.html_attributes() {
                let attr = attr_result?;
                let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let raw = String::from_utf8_lossy(&attr.value);
                let value = match unescape_with(&raw, resolve_html5_entity) {
                    Ok(value) => value.into_owned(),
                    Err(_) => raw.into_owned(),
                };
                attributes.push(Attribute { name, value });
            }
        } else {
            for attr_result in e.attributes() {
                let attr = attr_result?;
                let name = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                let value = attr.unescape_value().map_err(|err| Error::Syntax {
                    message: format!("invalid attribute value: {}", err),
                    position: Some(self.source_position() as u64),
                })?;
                attributes.push(Attribute {
                    name,
                    value: value.into_owned(),
                });
            }
        }

        Ok(attributes)
    }
}

fn make_reader(source: &str) -> Reader<&[u8]> {
    let mut reader = Reader::from_str(source);
    let config = reader.config_mut();
    config.trim_text_start = false;
    config.trim_text_end = false;
    // End tags are matched here, so both flavours get structured errors.
    config.check_end_names = false;
    config.allow_unmatched_ends = true;
    reader
}

/// Byte index in `text` of the first `</name` that ends a tag name.
fn find_end_tag(text: &str, name: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    text.match_indices("</").map(|(i, _)| i).find(|&i| {
        let name_start = i + 2;
        let name_end = name_start + name.len();
        let matches_name = bytes
            .get(name_start..name_end)
            .is_some_and(|candidate| candidate.eq_ignore_ascii_case(name.as_bytes()));
        matches_name
            && bytes
                .get(name_end)
                .is_none_or(|&b| b == b'>' || b == b'/' || b.is_ascii_whitespace())
    })
}
