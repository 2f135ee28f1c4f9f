/*
 * splice.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Splices: named procedures that rewrite a matched element.
//!
//! A splice is bound to a tag name. When the engine meets an element with
//! that name it calls the splice with the element (attributes already
//! substituted) and the render state, and puts the returned nodes in the
//! element's place.

use std::collections::HashMap;
use std::sync::Arc;

use trellis_markup::Node;

use crate::state::RenderState;

/// Trait implemented by every splice.
///
/// Closures of the right shape implement it directly; [`splice_fn`] helps
/// the compiler infer their argument types.
///
/// # Thread Safety
///
/// Splices must be `Send + Sync` so that one set of bindings can serve
/// renders running on several threads.
pub trait Splice: Send + Sync {
    /// Produce the replacement nodes for `node`.
    ///
    /// `node` is the invoking element, or an empty text node when the splice
    /// is called from an attribute placeholder.
    fn splice(&self, node: &Node, state: &mut RenderState) -> Vec<Node>;
}

impl<F> Splice for F
where
    F: Fn(&Node, &mut RenderState) -> Vec<Node> + Send + Sync,
{
    fn splice(&self, node: &Node, state: &mut RenderState) -> Vec<Node> {
        self(node, state)
    }
}

/// Shared handle to a splice.
pub type SpliceRef = Arc<dyn Splice>;

/// Splice registry keyed by tag name.
pub type SpliceMap = HashMap<String, SpliceRef>;

/// Identity helper that pins a closure to the splice signature.
///
/// ```rust
/// use trellis_template::{splice_fn, RenderState};
/// use trellis_markup::Node;
///
/// let state = RenderState::new().bind_splice(
///     "shout",
///     splice_fn(|node, _state| vec![Node::text(node.text_content().to_uppercase())]),
/// );
/// assert!(state.has_splice("shout"));
/// ```
pub fn splice_fn<F>(f: F) -> F
where
    F: Fn(&Node, &mut RenderState) -> Vec<Node> + Send + Sync,
{
    f
}

/// A splice that ignores its input and returns a single text node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextSplice(String);

impl Splice for TextSplice {
    fn splice(&self, _node: &Node, _state: &mut RenderState) -> Vec<Node> {
        vec![Node::Text(self.0.clone())]
    }
}

pub fn text_splice(value: impl Into<String>) -> TextSplice {
    TextSplice(value.into())
}

/// A splice that ignores its input and returns fixed nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodesSplice(Vec<Node>);

impl Splice for NodesSplice {
    fn splice(&self, _node: &Node, _state: &mut RenderState) -> Vec<Node> {
        self.0.clone()
    }
}

pub fn nodes_splice(nodes: Vec<Node>) -> NodesSplice {
    NodesSplice(nodes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn borrowed_title(title: &str) -> SpliceRef {
        Arc::new(text_splice(title))
    }

    #[test]
    fn test_text_splice_from_borrowed_str() {
        let title = String::from("Hello");
        let splice = borrowed_title(&title);
        drop(title);

        let mut state = RenderState::new();
        assert_eq!(
            splice.splice(&Node::text(""), &mut state),
            vec![Node::text("Hello")]
        );
    }

    #[test]
    fn test_nodes_splice_ignores_input() {
        let splice = nodes_splice(vec![Node::text("a"), Node::text("b")]);
        let mut state = RenderState::new();
        assert_eq!(
            splice.splice(&Node::text("ignored"), &mut state),
            vec![Node::text("a"), Node::text("b")]
        );
    }
}
