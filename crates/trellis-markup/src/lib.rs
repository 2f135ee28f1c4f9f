//! HTML and XML node trees for trellis templates.
//!
//! This crate is the markup layer underneath the template engine. It wraps
//! [`quick-xml`] to turn template bytes into a [`Document`] (format tag,
//! encoding, optional doctype and a list of [`Node`]s) and to serialize such
//! trees back into bytes.
//!
//! # Example
//!
//! ```rust
//! use trellis_markup::{mime_type, parse_html, render_document};
//!
//! let doc = parse_html(br#"<p class="greeting">Hello</p>"#).unwrap();
//! assert_eq!(doc.content[0].attribute("class"), Some("greeting"));
//!
//! let bytes = render_document(&doc);
//! assert_eq!(bytes, br#"<p class="greeting">Hello</p>"#);
//! assert_eq!(mime_type(&doc), "text/html;charset=utf-8");
//! ```

pub mod encoding;
pub mod error;
pub mod parser;
pub mod render;
pub mod types;

pub use encoding::Encoding;
pub use error::{Error, Result};
pub use parser::{parse, parse_html, parse_str, parse_xml};
pub use render::{mime_type, render_document, render_nodes};
pub use types::{Attribute, Doctype, Document, DocumentFormat, Element, Node};
