/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Splice-based composition of HTML and XML templates.
//!
//! Templates are markup documents stored under directory-like names. Custom
//! tags in a template are bound to *splices*, host-supplied procedures that
//! replace the tag with generated nodes. Rendering a template expands every
//! bound tag (and every `$(name)` placeholder in attribute values) until
//! nothing is left to expand, then serializes the result.
//!
//! - Names resolve by cascading from the current template's directory towards
//!   the root ([`path`]).
//! - Expansion is bounded: a splice's output is re-expanded at most
//!   [`MAX_RECURSION_DEPTH`] times, and a splice can opt out entirely with
//!   [`RenderState::stop_recursion`].
//! - Each render works on its own copy of the [`RenderState`], so a single
//!   state can serve concurrent renders.
//!
//! # Example
//!
//! ```rust
//! use trellis_template::{LoaderConfig, MemorySource, RenderState, load_templates};
//!
//! let source = MemorySource::new()
//!     .with_file("layout.tpl", "<main><content/></main>")
//!     .with_file("hello.tpl", r#"<apply template="layout"><p>Hello <who/></p></apply>"#);
//!
//! let state = load_templates(&source, &LoaderConfig::default(), RenderState::standard())
//!     .unwrap()
//!     .bind_string("who", "World");
//!
//! let rendered = state.render_template("hello").unwrap();
//! assert_eq!(rendered.as_str(), Some("<main><p>Hello World</p></main>"));
//! assert_eq!(rendered.mime_type, "text/html;charset=utf-8");
//! ```

pub mod attr;
pub mod builtins;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod loader;
pub mod path;
pub mod render;
pub mod splice;
pub mod state;

pub use attr::{AttrToken, parse_attribute_value, substitute};
pub use error::{LoadError, SourceError};
pub use hooks::{Hook, HookChain};
pub use loader::{
    DirectorySource, LoaderConfig, MemorySource, SourceFile, TemplateSource, load_templates,
    reload_templates, template_name,
};
pub use path::{TemplateFile, TemplateMap, TemplatePath, is_qualified, resolve};
pub use render::Rendered;
pub use splice::{
    NodesSplice, Splice, SpliceMap, SpliceRef, TextSplice, nodes_splice, splice_fn, text_splice,
};
pub use state::{MAX_RECURSION_DEPTH, RenderState};
