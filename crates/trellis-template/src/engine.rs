/*
 * engine.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Splice expansion.
//!
//! Expansion walks a node list and rebuilds it. Every element first has its
//! attribute values substituted; then, if its name is bound to a splice, the
//! splice's output replaces it and is itself expanded (unless the splice
//! stopped recursion or the depth guard has been reached). Unbound elements
//! are rebuilt with expanded children. All other nodes pass through.

use trellis_markup::{Attribute, Element, Node};

use crate::attr;
use crate::splice::SpliceRef;
use crate::state::{MAX_RECURSION_DEPTH, RenderState};

impl RenderState {
    /// Expand a node list under the current state.
    ///
    /// The result is the concatenation of expanding each node in order.
    pub fn run_nodes(&mut self, nodes: &[Node]) -> Vec<Node> {
        let mut out = Vec::with_capacity(nodes.len());
        for node in nodes {
            match node {
                Node::Element(element) => out.extend(self.run_element(element)),
                other => out.push(other.clone()),
            }
        }
        out
    }

    /// Expand `nodes` one level deeper, for splices that expand content
    /// themselves and then stop recursion.
    ///
    /// Counts against the same depth limit as engine re-expansion, so a
    /// template that applies itself still terminates. At the limit the nodes
    /// are returned unexpanded.
    pub fn expand_nested(&mut self, nodes: &[Node]) -> Vec<Node> {
        if self.recursion_depth() >= MAX_RECURSION_DEPTH {
            tracing::warn!(
                depth = self.recursion_depth(),
                "recursion limit reached; emitting content unexpanded"
            );
            return nodes.to_vec();
        }
        self.increment_depth();
        let out = self.run_nodes(nodes);
        self.decrement_depth();
        out
    }

    fn run_element(&mut self, element: &Element) -> Vec<Node> {
        let attributes = self.substitute_attributes(&element.attributes);

        match self.lookup_splice(&element.name) {
            Some(splice) => {
                let node = Node::Element(Element {
                    name: element.name.clone(),
                    attributes,
                    children: element.children.clone(),
                });
                self.run_splice(&splice, &node)
            }
            None => {
                let children = self.run_nodes(&element.children);
                vec![Node::Element(Element {
                    name: element.name.clone(),
                    attributes,
                    children,
                })]
            }
        }
    }

    fn run_splice(&mut self, splice: &SpliceRef, node: &Node) -> Vec<Node> {
        let saved = self.snapshot();
        self.begin_invocation();

        tracing::debug!(
            splice = node.element_name().unwrap_or_default(),
            depth = self.recursion_depth(),
            "invoking splice"
        );
        let result = splice.splice(node, self);

        let out = if !self.is_recursing() {
            result
        } else if self.recursion_depth() >= MAX_RECURSION_DEPTH {
            tracing::warn!(
                splice = node.element_name().unwrap_or_default(),
                depth = self.recursion_depth(),
                "recursion limit reached; emitting splice output unexpanded"
            );
            result
        } else {
            self.increment_depth();
            self.run_nodes(&result)
        };

        self.restore(saved);
        out
    }

    fn substitute_attributes(&mut self, attributes: &[Attribute]) -> Vec<Attribute> {
        attributes
            .iter()
            .map(|attribute| Attribute {
                name: attribute.name.clone(),
                value: self.substitute_attribute(&attribute.value),
            })
            .collect()
    }

    /// Substitute `$(name)` placeholders in one attribute value.
    ///
    /// Each placeholder invokes the named splice with an empty text node; its
    /// output is flattened to text and not expanded further.
    pub fn substitute_attribute(&mut self, raw: &str) -> String {
        attr::substitute(raw, |name| {
            let splice = self.lookup_splice(name)?;
            let saved = self.snapshot();
            self.begin_invocation();
            let nodes = splice.splice(&Node::text(""), self);
            self.restore(saved);
            Some(nodes)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::splice::splice_fn;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn el(name: &str, children: Vec<Node>) -> Node {
        Node::Element(Element::new(name).with_children(children))
    }

    #[test]
    fn test_plain_tree_is_unchanged() {
        let tree = vec![
            Node::Comment(" c ".to_string()),
            Node::Element(
                Element::new("div")
                    .with_attribute("class", "x")
                    .with_children(vec![Node::text("hi"), el("br", vec![])]),
            ),
        ];
        let mut state = RenderState::new().bind_string("other", "o");
        assert_eq!(state.run_nodes(&tree), tree);
    }

    #[test]
    fn test_bound_element_is_replaced() {
        let mut state = RenderState::new().bind_string("name", "World");
        let out = state.run_nodes(&[el("p", vec![Node::text("Hello "), el("name", vec![])])]);
        assert_eq!(out, vec![el("p", vec![Node::text("Hello "), Node::text("World")])]);
    }

    #[test]
    fn test_splice_output_is_expanded() {
        let mut state = RenderState::new()
            .bind_string("inner", "deep")
            .bind_splice("outer", splice_fn(|_, _| vec![el("b", vec![el("inner", vec![])])]));

        assert_eq!(
            state.run_nodes(&[el("outer", vec![])]),
            vec![el("b", vec![Node::text("deep")])]
        );
    }

    #[test]
    fn test_stop_recursion_returns_output_verbatim() {
        let mut state = RenderState::new()
            .bind_string("inner", "deep")
            .bind_splice(
                "outer",
                splice_fn(|_, state| {
                    state.stop_recursion();
                    vec![el("inner", vec![])]
                }),
            );

        assert_eq!(state.run_nodes(&[el("outer", vec![])]), vec![el("inner", vec![])]);
        // The flag does not leak to siblings.
        assert!(state.is_recursing());
    }

    #[test]
    fn test_depth_guard() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let mut state = RenderState::new().bind_splice(
            "loop",
            splice_fn(move |_, _| {
                let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                vec![Node::Element(
                    Element::new("loop").with_attribute("n", n.to_string()),
                )]
            }),
        );

        let out = state.run_nodes(&[el("loop", vec![])]);

        assert_eq!(calls.load(Ordering::SeqCst), MAX_RECURSION_DEPTH + 1);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].attribute("n"), Some("51"));
        assert_eq!(state.recursion_depth(), 0);
    }

    #[test]
    fn test_context_restored_after_splice() {
        use crate::path::TemplatePath;

        let mut state = RenderState::new().bind_splice(
            "move",
            splice_fn(|_, state| {
                state.set_context(TemplatePath::parse("elsewhere"));
                vec![]
            }),
        );
        state.run_nodes(&[el("move", vec![])]);
        assert!(state.context().is_empty());
    }

    #[test]
    fn test_attributes_substituted_on_unbound_elements() {
        let mut state = RenderState::new().bind_string("id", "42");
        let tree = [Node::Element(
            Element::new("a").with_attribute("href", "/item/$(id)"),
        )];
        assert_eq!(state.run_nodes(&tree)[0].attribute("href"), Some("/item/42"));
    }

    #[test]
    fn test_splice_sees_substituted_attributes() {
        let mut state = RenderState::new()
            .bind_string("who", "you")
            .bind_splice(
                "greet",
                splice_fn(|node, _| {
                    vec![Node::text(format!("hi {}", node.attribute("to").unwrap_or("?")))]
                }),
            );
        let tree = [Node::Element(Element::new("greet").with_attribute("to", "$(who)"))];
        assert_eq!(state.run_nodes(&tree), vec![Node::text("hi you")]);
    }

    #[test]
    fn test_attribute_placeholder_flattens_markup() {
        let mut state = RenderState::new().bind_splice(
            "title",
            splice_fn(|node, _| {
                assert_eq!(node, &Node::text(""));
                vec![el("em", vec![Node::text("Big")]), Node::text(" Title")]
            }),
        );
        assert_eq!(state.substitute_attribute("[$(title)]"), "[Big Title]");
    }

    #[test]
    fn test_expand_nested_respects_limit() {
        let mut state = RenderState::new().bind_string("x", "y");
        for _ in 0..MAX_RECURSION_DEPTH {
            state.increment_depth();
        }
        let nodes = [el("x", vec![])];
        assert_eq!(state.expand_nested(&nodes), nodes.to_vec());
    }
}
