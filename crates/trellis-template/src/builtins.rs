/*
 * builtins.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Built-in splices bound by [`RenderState::standard`].
//!
//! - `<apply template="name">...</apply>` renders another template with the
//!   element's expanded children available as `<content/>`.
//! - `<bind tag="name">...</bind>` defines a new tag for the rest of the
//!   render. Uses of the tag expand the bound children, with the caller's
//!   expanded children available as `<content/>`.
//! - `<ignore>...</ignore>` drops its contents.

use std::sync::Arc;

use trellis_markup::Node;

use crate::splice::{SpliceRef, nodes_splice};
use crate::state::RenderState;

/// Tag of the `apply` splice.
pub const APPLY_TAG: &str = "apply";
/// Attribute naming the template to apply.
pub const APPLY_ATTR: &str = "template";
/// Tag of the `bind` splice.
pub const BIND_TAG: &str = "bind";
/// Attribute naming the tag being bound.
pub const BIND_ATTR: &str = "tag";
/// Tag of the `ignore` splice.
pub const IGNORE_TAG: &str = "ignore";
/// Splice name under which `apply` and bound tags expose caller content.
pub const CONTENT_TAG: &str = "content";

/// The built-in splices, keyed by tag.
pub fn standard_splices() -> Vec<(&'static str, SpliceRef)> {
    vec![
        (APPLY_TAG, Arc::new(apply) as SpliceRef),
        (BIND_TAG, Arc::new(bind) as SpliceRef),
        (IGNORE_TAG, Arc::new(ignore) as SpliceRef),
    ]
}

fn content_binding(nodes: Vec<Node>) -> [(&'static str, SpliceRef); 1] {
    [(CONTENT_TAG, Arc::new(nodes_splice(nodes)) as SpliceRef)]
}

/// `<apply template="name">children</apply>`
pub fn apply(node: &Node, state: &mut RenderState) -> Vec<Node> {
    state.stop_recursion();

    let Some(name) = node.attribute(APPLY_ATTR) else {
        tracing::warn!("<apply> without a `{}` attribute", APPLY_ATTR);
        return Vec::new();
    };

    let content = state.run_nodes(node.children());

    let Some((file, found_at)) = state.lookup_template(name) else {
        tracing::warn!(template = name, context = %state.context(), "<apply> template not found");
        return Vec::new();
    };
    let document = file.document.clone();

    if let Some(doctype) = document.doctype {
        state.add_doctype(doctype);
    }
    state.set_context(found_at);
    state.with_local_splices(content_binding(content), |state| {
        state.expand_nested(&document.content)
    })
}

/// `<bind tag="name">children</bind>`
pub fn bind(node: &Node, state: &mut RenderState) -> Vec<Node> {
    state.stop_recursion();

    let Some(tag) = node.attribute(BIND_ATTR) else {
        tracing::warn!("<bind> without a `{}` attribute", BIND_ATTR);
        return Vec::new();
    };

    let body = node.children().to_vec();
    let context = state.context().clone();
    let bound = move |call: &Node, state: &mut RenderState| {
        state.stop_recursion();
        let content = state.run_nodes(call.children());
        state.set_context(context.clone());
        state.with_local_splices(content_binding(content), |state| state.expand_nested(&body))
    };

    tracing::debug!(tag, "binding tag");
    state.add_splice(tag, Arc::new(bound));
    Vec::new()
}

/// `<ignore>...</ignore>`
pub fn ignore(_node: &Node, _state: &mut RenderState) -> Vec<Node> {
    Vec::new()
}
