/*
 * state.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! The render state threaded through template expansion.
//!
//! A [`RenderState`] carries the template registry, the splice registry, the
//! hook chains, and the per-render context: the directory of the template
//! being expanded, the recursion controls, and the doctypes seen so far.
//!
//! Registries sit behind `Arc`s and are copied on write, so binding a splice
//! or adding a template produces a new state without disturbing clones that
//! are already rendering. Each top-level render works on its own clone.

use std::fmt;
use std::sync::Arc;

use trellis_markup::{Doctype, Document, Node};

use crate::builtins;
use crate::hooks::HookChain;
use crate::path::{TemplateFile, TemplateMap, TemplatePath, resolve};
use crate::splice::{Splice, SpliceMap, SpliceRef, text_splice};

/// Maximum number of times a splice's output is re-expanded.
pub const MAX_RECURSION_DEPTH: usize = 50;

/// Everything a render needs.
#[derive(Clone)]
pub struct RenderState {
    templates: Arc<TemplateMap>,
    splices: Arc<SpliceMap>,

    /// Directory of the template being expanded; root of relative lookups.
    context: TemplatePath,

    /// Cleared by a splice that wants its output left as returned.
    recurse: bool,
    recursion_depth: usize,

    /// Doctypes of every template entered during this render, oldest first.
    doctypes: Vec<Doctype>,

    on_load: HookChain,
    pre_run: HookChain,
    post_run: HookChain,
}

/// Recursion controls and context saved around a splice invocation.
pub(crate) struct Snapshot {
    context: TemplatePath,
    recurse: bool,
    recursion_depth: usize,
}

impl RenderState {
    /// A state with no templates, no splices and no hooks.
    pub fn new() -> Self {
        Self {
            templates: Arc::new(TemplateMap::new()),
            splices: Arc::new(SpliceMap::new()),
            context: TemplatePath::root(),
            recurse: true,
            recursion_depth: 0,
            doctypes: Vec::new(),
            on_load: HookChain::new(),
            pre_run: HookChain::new(),
            post_run: HookChain::new(),
        }
    }

    /// A state with the built-in `apply`, `bind` and `ignore` splices bound.
    pub fn standard() -> Self {
        Self::new().bind_splices(builtins::standard_splices())
    }

    // Splice registry

    /// Bind `splice` to elements named `name`, replacing any earlier binding.
    pub fn bind_splice(mut self, name: impl Into<String>, splice: impl Splice + 'static) -> Self {
        self.add_splice(name, Arc::new(splice));
        self
    }

    /// Bind several splices at once.
    pub fn bind_splices<I, K>(mut self, splices: I) -> Self
    where
        I: IntoIterator<Item = (K, SpliceRef)>,
        K: Into<String>,
    {
        let map = Arc::make_mut(&mut self.splices);
        for (name, splice) in splices {
            map.insert(name.into(), splice);
        }
        self
    }

    /// Bind `name` to a splice that always produces the text `value`.
    pub fn bind_string(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.bind_splice(name, text_splice(value))
    }

    /// Bind each `(name, value)` pair as a constant-text splice.
    pub fn bind_strings<I, K, V>(self, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .fold(self, |state, (name, value)| state.bind_string(name, value))
    }

    /// In-place binding, for splices that bind other splices while rendering.
    pub fn add_splice(&mut self, name: impl Into<String>, splice: SpliceRef) {
        Arc::make_mut(&mut self.splices).insert(name.into(), splice);
    }

    pub fn has_splice(&self, name: &str) -> bool {
        self.splices.contains_key(name)
    }

    pub fn lookup_splice(&self, name: &str) -> Option<SpliceRef> {
        self.splices.get(name).cloned()
    }

    /// Sorted names of all bound splices.
    pub fn splice_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.splices.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run `f` with extra splice bindings; the previous registry is restored
    /// afterwards, discarding anything bound inside `f`.
    pub fn with_local_splices<I, K, R>(&mut self, bindings: I, f: impl FnOnce(&mut Self) -> R) -> R
    where
        I: IntoIterator<Item = (K, SpliceRef)>,
        K: Into<String>,
    {
        let saved = Arc::clone(&self.splices);
        {
            let map = Arc::make_mut(&mut self.splices);
            for (name, splice) in bindings {
                map.insert(name.into(), splice);
            }
        }
        let result = f(self);
        self.splices = saved;
        result
    }

    // Template registry

    /// Add (or replace) a template under `name`.
    pub fn add_template(mut self, name: &str, document: Document) -> Self {
        self.insert_template(TemplatePath::parse(name), TemplateFile::new(document));
        self
    }

    pub(crate) fn insert_template(&mut self, path: TemplatePath, file: TemplateFile) {
        Arc::make_mut(&mut self.templates).insert(path, file);
    }

    /// Replace the whole template set.
    pub fn with_templates(mut self, templates: TemplateMap) -> Self {
        self.templates = Arc::new(templates);
        self
    }

    /// In-place replacement of the whole template set.
    pub fn set_templates(&mut self, templates: TemplateMap) {
        self.templates = Arc::new(templates);
    }

    pub fn templates(&self) -> Arc<TemplateMap> {
        Arc::clone(&self.templates)
    }

    /// Resolve `name` from the current context.
    pub fn lookup_template(&self, name: &str) -> Option<(&TemplateFile, TemplatePath)> {
        resolve(&self.templates, &self.context, name)
    }

    pub fn has_template(&self, name: &str) -> bool {
        self.lookup_template(name).is_some()
    }

    /// Full names of all templates, sorted.
    pub fn template_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.templates.keys().map(ToString::to_string).collect();
        names.sort();
        names
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }

    // Hooks

    pub fn add_on_load_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Vec<Node>) -> Vec<Node> + Send + Sync + 'static,
    {
        self.on_load.push(hook);
        self
    }

    pub fn add_pre_run_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Vec<Node>) -> Vec<Node> + Send + Sync + 'static,
    {
        self.pre_run.push(hook);
        self
    }

    pub fn add_post_run_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(Vec<Node>) -> Vec<Node> + Send + Sync + 'static,
    {
        self.post_run.push(hook);
        self
    }

    pub fn on_load_hooks(&self) -> &HookChain {
        &self.on_load
    }

    pub fn pre_run_hooks(&self) -> &HookChain {
        &self.pre_run
    }

    pub fn post_run_hooks(&self) -> &HookChain {
        &self.post_run
    }

    // Per-render context

    pub fn context(&self) -> &TemplatePath {
        &self.context
    }

    pub fn set_context(&mut self, context: TemplatePath) {
        self.context = context;
    }

    /// Leave the current splice's output as returned: no further expansion.
    pub fn stop_recursion(&mut self) {
        self.recurse = false;
    }

    pub fn is_recursing(&self) -> bool {
        self.recurse
    }

    pub fn recursion_depth(&self) -> usize {
        self.recursion_depth
    }

    pub fn add_doctype(&mut self, doctype: Doctype) {
        self.doctypes.push(doctype);
    }

    pub fn doctypes(&self) -> &[Doctype] {
        &self.doctypes
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            context: self.context.clone(),
            recurse: self.recurse,
            recursion_depth: self.recursion_depth,
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.context = snapshot.context;
        self.recurse = snapshot.recurse;
        self.recursion_depth = snapshot.recursion_depth;
    }

    pub(crate) fn begin_invocation(&mut self) {
        self.recurse = true;
    }

    pub(crate) fn increment_depth(&mut self) {
        self.recursion_depth += 1;
    }

    pub(crate) fn decrement_depth(&mut self) {
        self.recursion_depth = self.recursion_depth.saturating_sub(1);
    }

    /// A fresh copy for one top-level render: shared registries and hooks,
    /// default recursion controls, no doctypes.
    pub(crate) fn for_render(&self) -> Self {
        let mut state = self.clone();
        state.recurse = true;
        state.recursion_depth = 0;
        state.doctypes.clear();
        state
    }
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RenderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderState")
            .field("templates", &self.template_names())
            .field("splices", &self.splice_names())
            .field("context", &self.context)
            .field("recurse", &self.recurse)
            .field("recursion_depth", &self.recursion_depth)
            .field("doctypes", &self.doctypes)
            .finish()
    }
}
