/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Serialization of node trees back to markup bytes.

use crate::parser::{is_raw_text_element, is_void_element};
use crate::{Document, DocumentFormat, Element, Node};
use quick_xml::escape::{escape, partial_escape};

/// Serialize a document, encoded with the document's own encoding.
///
/// XML output starts with an XML declaration naming the encoding. A doctype,
/// when present, is written on its own line before the content.
pub fn render_document(doc: &Document) -> Vec<u8> {
    let mut out = String::new();

    if doc.format == DocumentFormat::Xml {
        out.push_str(&format!(
            "<?xml version=\"1.0\" encoding=\"{}\"?>\n",
            doc.encoding.declaration_name()
        ));
    }
    if let Some(doctype) = &doc.doctype {
        out.push_str(&format!("<!DOCTYPE {}>\n", doctype.as_str()));
    }
    write_nodes(doc.format, &doc.content, &mut out);

    doc.encoding.encode(&out)
}

/// Serialize a node list to a string, without declaration or doctype.
pub fn render_nodes(format: DocumentFormat, nodes: &[Node]) -> String {
    let mut out = String::new();
    write_nodes(format, nodes, &mut out);
    out
}

/// MIME type of a rendered document, e.g. `text/html;charset=utf-8`.
pub fn mime_type(doc: &Document) -> String {
    let kind = match doc.format {
        DocumentFormat::Html => "text/html",
        DocumentFormat::Xml => "text/xml",
    };
    format!("{};charset={}", kind, doc.encoding.charset())
}

fn write_nodes(format: DocumentFormat, nodes: &[Node], out: &mut String) {
    for node in nodes {
        write_node(format, node, out);
    }
}

fn write_node(format: DocumentFormat, node: &Node, out: &mut String) {
    match node {
        Node::Element(element) => write_element(format, element, out),
        Node::Text(text) => out.push_str(&partial_escape(text.as_str())),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::Cdata(text) => {
            out.push_str("<![CDATA[");
            out.push_str(text);
            out.push_str("]]>");
        }
        Node::ProcessingInstruction(text) => {
            out.push_str("<?");
            out.push_str(text);
            out.push_str("?>");
        }
    }
}

fn write_element(format: DocumentFormat, element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attributes {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape(attr.value.as_str()));
        out.push('"');
    }

    match format {
        DocumentFormat::Xml if element.children.is_empty() => {
            out.push_str("/>");
            return;
        }
        DocumentFormat::Html if is_void_element(&element.name) && element.children.is_empty() => {
            out.push('>');
            return;
        }
        _ => out.push('>'),
    }

    if format == DocumentFormat::Html && is_raw_text_element(&element.name) {
        for child in &element.children {
            out.push_str(&child.text_content());
        }
    } else {
        write_nodes(format, &element.children, out);
    }

    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
