/*
 * hooks.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Whole-tree transforms run around loading and rendering.
//!
//! There are three hook slots on a [`RenderState`](crate::RenderState):
//! on-load (once per document, when it is loaded), and pre-run / post-run
//! (once per top-level render, before and after expansion). Each slot is a
//! [`HookChain`] whose hooks run in registration order.

use std::fmt;
use std::sync::Arc;

use trellis_markup::Node;

/// A single transform over a node list.
pub type Hook = Arc<dyn Fn(Vec<Node>) -> Vec<Node> + Send + Sync>;

/// Ordered sequence of hooks, equivalent to their composition.
#[derive(Clone, Default)]
pub struct HookChain {
    hooks: Vec<Hook>,
}

impl HookChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hook; it runs after all hooks added before it.
    pub fn push<F>(&mut self, hook: F)
    where
        F: Fn(Vec<Node>) -> Vec<Node> + Send + Sync + 'static,
    {
        self.hooks.push(Arc::new(hook));
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Run every hook over `nodes`, in registration order.
    pub fn apply(&self, nodes: Vec<Node>) -> Vec<Node> {
        self.hooks.iter().fold(nodes, |nodes, hook| hook(nodes))
    }
}

impl fmt::Debug for HookChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookChain")
            .field("len", &self.hooks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_chain_is_identity() {
        let chain = HookChain::new();
        assert_eq!(chain.apply(vec![Node::text("a")]), vec![Node::text("a")]);
    }

    #[test]
    fn test_hooks_run_in_registration_order() {
        let mut chain = HookChain::new();
        chain.push(|mut nodes| {
            nodes.push(Node::text("1"));
            nodes
        });
        chain.push(|nodes| {
            nodes
                .into_iter()
                .map(|n| Node::text(format!("[{}]", n.text_content())))
                .collect()
        });

        assert_eq!(chain.len(), 2);
        assert_eq!(
            chain.apply(vec![Node::text("0")]),
            vec![Node::text("[0]"), Node::text("[1]")]
        );
    }
}
