/*
 * path.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template paths and cascading name resolution.
//!
//! A [`TemplatePath`] identifies a template by directory-like segments. The
//! segments are stored in reverse (`admin/users/list` is kept as
//! `["list", "users", "admin"]`) so that dropping the innermost directory is
//! removing the first element.
//!
//! Resolution of a bare name cascades from the current context towards the
//! root, so a template can override a shared one by living deeper in the
//! tree. A name that contains the separator is looked up exactly once.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use trellis_markup::Document;

/// Separator between template path segments.
pub const SEPARATOR: char = '/';

/// A loaded template: the parsed document and, when loaded from disk, its file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFile {
    pub document: Document,
    pub file: Option<PathBuf>,
}

impl TemplateFile {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            file: None,
        }
    }

    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }
}

/// Registry of templates keyed by their full path (directory plus name).
pub type TemplateMap = BTreeMap<TemplatePath, TemplateFile>;

/// An ordered sequence of path segments, stored innermost-first.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TemplatePath(Vec<String>);

impl TemplatePath {
    /// The empty path (template root).
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// Split a template name into a path.
    ///
    /// A leading separator is stripped; empty segments are dropped, so the
    /// empty string (or `/`) yields the root path.
    ///
    /// ```rust
    /// use trellis_template::TemplatePath;
    ///
    /// let path = TemplatePath::parse("/admin/users/list");
    /// assert_eq!(path.to_string(), "admin/users/list");
    /// assert_eq!(path.reversed_segments(), ["list", "users", "admin"]);
    /// ```
    pub fn parse(name: &str) -> Self {
        let name = name.strip_prefix(SEPARATOR).unwrap_or(name);
        let mut segments: Vec<String> = name
            .split(SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        segments.reverse();
        Self(segments)
    }

    /// Build a path from segments given outermost-first.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        segments.reverse();
        Self(segments)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Segments innermost-first, as stored.
    pub fn reversed_segments(&self) -> &[String] {
        &self.0
    }

    /// Segments outermost-first.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.iter().rev().map(String::as_str)
    }

    /// The path of `name` inside this directory.
    pub fn child(&self, name: &str) -> TemplatePath {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.push(name.to_string());
        segments.extend(self.0.iter().cloned());
        Self(segments)
    }

    /// This path with its innermost segment removed. The root is its own parent.
    pub fn parent(&self) -> TemplatePath {
        Self(self.0.iter().skip(1).cloned().collect())
    }

    /// `inner` nested under `self`: `inner`'s segments followed by this path's.
    pub fn nest(&self, inner: &TemplatePath) -> TemplatePath {
        Self(inner.0.iter().chain(self.0.iter()).cloned().collect())
    }

    /// Split into the innermost segment and the directory that contains it.
    pub fn split_name(&self) -> Option<(&str, TemplatePath)> {
        let (name, dir) = self.0.split_first()?;
        Some((name.as_str(), Self(dir.to_vec())))
    }
}

impl fmt::Display for TemplatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let forward: Vec<&str> = self.segments().collect();
        write!(f, "{}", forward.join("/"))
    }
}

/// Whether a template name is path-qualified (resolved by exact lookup).
pub fn is_qualified(name: &str) -> bool {
    name.contains(SEPARATOR)
}

/// The directories tried when resolving `name` under `context`, in order,
/// together with the bare name looked up in each of them.
///
/// A qualified name yields exactly one directory: the name's own directories
/// nested under the unchanged context. A bare name yields the context and
/// then each of its ancestors, ending with the root.
pub fn lookup_candidates(context: &TemplatePath, name: &str) -> (String, Vec<TemplatePath>) {
    let parsed = TemplatePath::parse(name);
    let (leaf, dirs) = parsed
        .split_name()
        .map(|(leaf, dirs)| (leaf.to_string(), dirs))
        .unwrap_or_default();
    let start = context.nest(&dirs);

    if is_qualified(name) {
        return (leaf, vec![start]);
    }

    let mut candidates = Vec::with_capacity(start.len() + 1);
    let mut dir = start;
    loop {
        let at_root = dir.is_empty();
        candidates.push(dir.clone());
        if at_root {
            break;
        }
        dir = dir.parent();
    }
    (leaf, candidates)
}

/// Resolve `name` against the registry.
///
/// Returns the template and the directory in which it was found; that
/// directory becomes the resolution context while the template is expanded.
pub fn resolve<'a>(
    templates: &'a TemplateMap,
    context: &TemplatePath,
    name: &str,
) -> Option<(&'a TemplateFile, TemplatePath)> {
    let (leaf, candidates) = lookup_candidates(context, name);

    for dir in candidates {
        let key = dir.child(&leaf);
        tracing::trace!(template = %key, "probing");
        if let Some(file) = templates.get(&key) {
            tracing::debug!(name, found = %key, "resolved template");
            return Some((file, dir));
        }
    }

    tracing::debug!(name, context = %context, "template not found");
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use trellis_markup::Node;

    fn path(forward: &[&str]) -> TemplatePath {
        TemplatePath::from_segments(forward.iter().copied())
    }

    fn registry(entries: &[(&str, &str)]) -> TemplateMap {
        entries
            .iter()
            .map(|&(name, text)| {
                (
                    TemplatePath::parse(name),
                    TemplateFile::new(Document::html(vec![Node::text(text)])),
                )
            })
            .collect()
    }

    fn text_of(file: &TemplateFile) -> String {
        file.document.content[0].text_content()
    }

    #[test]
    fn test_parse_splits_and_reverses() {
        assert_eq!(
            TemplatePath::parse("a/b/c").reversed_segments(),
            ["c", "b", "a"]
        );
        assert_eq!(TemplatePath::parse("/a/b"), path(&["a", "b"]));
    }

    #[test]
    fn test_parse_empty_and_degenerate() {
        assert!(TemplatePath::parse("").is_empty());
        assert!(TemplatePath::parse("/").is_empty());
        assert_eq!(TemplatePath::parse("a//b/"), path(&["a", "b"]));
    }

    #[test]
    fn test_display_is_forward() {
        assert_eq!(path(&["admin", "users", "list"]).to_string(), "admin/users/list");
        assert_eq!(TemplatePath::root().to_string(), "");
    }

    #[test]
    fn test_parent_and_child() {
        let p = path(&["a", "b"]);
        assert_eq!(p.parent(), path(&["a"]));
        assert_eq!(p.child("c"), path(&["a", "b", "c"]));
        assert_eq!(TemplatePath::root().parent(), TemplatePath::root());
    }

    #[test]
    fn test_cascade_candidates_order() {
        let context = path(&["x", "y", "z"]);
        let (leaf, candidates) = lookup_candidates(&context, "page");

        assert_eq!(leaf, "page");
        assert_eq!(
            candidates,
            vec![
                path(&["x", "y", "z"]),
                path(&["x", "y"]),
                path(&["x"]),
                TemplatePath::root(),
            ]
        );
    }

    #[test]
    fn test_qualified_name_single_lookup() {
        let context = path(&["x", "y"]);
        let (leaf, candidates) = lookup_candidates(&context, "inc/header");

        assert_eq!(leaf, "header");
        assert_eq!(candidates, vec![path(&["x", "y", "inc"])]);
    }

    #[test]
    fn test_absolute_name_keeps_context() {
        // The leading separator is stripped but the context is still prepended.
        let context = path(&["x"]);
        let (_, candidates) = lookup_candidates(&context, "/a/b");
        assert_eq!(candidates, vec![path(&["x", "a"])]);
    }

    #[test]
    fn test_hit_at_full_context_wins() {
        let templates = registry(&[("a/b", "X"), ("b", "root")]);
        let (file, found_at) = resolve(&templates, &path(&["a"]), "b").unwrap();

        assert_eq!(text_of(file), "X");
        assert_eq!(found_at, path(&["a"]));
    }

    #[test]
    fn test_falls_back_to_root() {
        let templates = registry(&[("b", "root")]);
        let (file, found_at) = resolve(&templates, &path(&["a"]), "b").unwrap();

        assert_eq!(text_of(file), "root");
        assert_eq!(found_at, TemplatePath::root());
    }

    #[test]
    fn test_qualified_name_does_not_cascade() {
        let templates = registry(&[("inc/header", "h")]);

        assert!(resolve(&templates, &path(&["a"]), "inc/header").is_none());
        assert!(resolve(&templates, &TemplatePath::root(), "inc/header").is_some());
    }

    #[test]
    fn test_not_found() {
        let templates = registry(&[("other", "o")]);
        assert!(resolve(&templates, &path(&["a", "b"]), "missing").is_none());
    }
}
