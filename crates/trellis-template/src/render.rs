/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Evaluating and rendering named templates.

use std::sync::Arc;

use trellis_markup::{Document, Node, mime_type, render_document};

use crate::splice::{SpliceRef, text_splice};
use crate::state::RenderState;

/// Serialized output of a render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    /// `text/html;charset=...` or `text/xml;charset=...`.
    pub mime_type: String,
}

impl Rendered {
    /// The output as text, if it is UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

impl RenderState {
    /// Resolve and expand the template `name` without serializing it.
    ///
    /// Records the template's doctype, runs the pre-run hooks on its body,
    /// expands the body with the context set to the directory where the
    /// template was found, restores the context, and runs the post-run hooks.
    /// Returns `None` when the name does not resolve.
    pub fn eval_template(&mut self, name: &str) -> Option<Vec<Node>> {
        let (file, found_at) = self.lookup_template(name)?;
        let document = file.document.clone();

        if let Some(doctype) = document.doctype {
            self.add_doctype(doctype);
        }
        let body = self.pre_run_hooks().apply(document.content);

        let saved = self.snapshot();
        self.set_context(found_at);
        let expanded = self.run_nodes(&body);
        self.restore(saved);

        Some(self.post_run_hooks().apply(expanded))
    }

    /// [`eval_template`](Self::eval_template) with each `(name, value)` bound
    /// as a constant-text splice for the duration of the call.
    pub fn eval_template_with_args<I, K, V>(&mut self, name: &str, args: I) -> Option<Vec<Node>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let bindings: Vec<(String, SpliceRef)> = args
            .into_iter()
            .map(|(k, v)| (k.into(), Arc::new(text_splice(v)) as SpliceRef))
            .collect();
        self.with_local_splices(bindings, |state| state.eval_template(name))
    }

    /// Render the template `name` to bytes.
    ///
    /// Runs on a private copy of this state, so one state can serve any
    /// number of renders, including concurrent ones. The output takes the
    /// resolved template's format and encoding, and the most recently
    /// recorded doctype.
    pub fn render_template(&self, name: &str) -> Option<Rendered> {
        let (file, _) = self.lookup_template(name)?;
        let format = file.document.format;
        let encoding = file.document.encoding;

        let mut state = self.for_render();
        let content = state.eval_template(name)?;
        let doctype = state.doctypes().last().cloned();

        let document = Document::new(format, content)
            .with_encoding(encoding)
            .with_doctype(doctype);

        tracing::debug!(template = name, "rendered");
        Some(Rendered {
            bytes: render_document(&document),
            mime_type: mime_type(&document),
        })
    }

    /// Parameterized render: binds each `(name, value)` as a constant-text
    /// splice, then renders.
    pub fn render_with_args<I, K, V>(&self, name: &str, args: I) -> Option<Rendered>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.clone().bind_strings(args).render_template(name)
    }
}
