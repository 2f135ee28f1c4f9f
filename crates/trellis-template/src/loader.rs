/*
 * loader.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Building the template registry from files.
//!
//! A [`TemplateSource`] enumerates candidate files as relative paths with
//! their bytes. [`load_templates`] parses every file whose extension marks it
//! as a template, runs the on-load hooks, and keys the result by its path
//! without the extension (`blog/post.tpl` becomes `blog/post`).
//!
//! Loading is all-or-nothing: if any file fails to read or parse, every
//! failure is collected and the load reports them together instead of
//! producing a partial registry.

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use trellis_markup::{DocumentFormat, parse};
use walkdir::WalkDir;

use crate::error::{LoadError, SourceError};
use crate::path::{TemplateFile, TemplateMap, TemplatePath};
use crate::state::RenderState;

/// File extensions recognised as templates, without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub html: String,
    pub xml: String,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            html: "tpl".to_string(),
            xml: "xtpl".to_string(),
        }
    }
}

impl LoaderConfig {
    /// The format a file is loaded as, or `None` if it is not a template.
    pub fn format_for(&self, path: &Path) -> Option<DocumentFormat> {
        let ext = path.extension()?.to_str()?;
        if ext == self.html {
            Some(DocumentFormat::Html)
        } else if ext == self.xml {
            Some(DocumentFormat::Xml)
        } else {
            None
        }
    }
}

/// One enumerated file: its path relative to the source root and its bytes,
/// or the reason they could not be read.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub contents: Result<Vec<u8>, SourceError>,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: Ok(contents.into()),
        }
    }

    pub fn unreadable(path: impl Into<PathBuf>, error: impl Into<SourceError>) -> Self {
        Self {
            path: path.into(),
            contents: Err(error.into()),
        }
    }
}

/// Anything that can list template files.
pub trait TemplateSource {
    /// Every template file (per `config`) under this source, in a stable order.
    ///
    /// Failures to list or read are returned as unreadable entries whatever
    /// their path looks like; the loader reports them all.
    fn enumerate(&self, config: &LoaderConfig) -> Vec<SourceFile>;
}

/// Templates in a directory tree on disk.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl TemplateSource for DirectorySource {
    fn enumerate(&self, config: &LoaderConfig) -> Vec<SourceFile> {
        let mut files = Vec::new();

        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    // The root itself has an empty relative path.
                    let path = err
                        .path()
                        .map(|p| self.relative(p))
                        .filter(|p| !p.as_os_str().is_empty())
                        .unwrap_or_else(|| self.root.clone());
                    files.push(SourceFile::unreadable(path, err));
                    continue;
                }
            };
            if !entry.file_type().is_file() || config.format_for(entry.path()).is_none() {
                continue;
            }

            let relative = self.relative(entry.path());
            tracing::trace!(path = %relative.display(), "reading template");
            files.push(match std::fs::read(entry.path()) {
                Ok(bytes) => SourceFile::new(relative, bytes),
                Err(err) => SourceFile::unreadable(relative, err),
            });
        }

        files
    }
}

impl DirectorySource {
    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.root).unwrap_or(path).to_path_buf()
    }
}

/// Templates held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    files: Vec<(PathBuf, Vec<u8>)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.files.push((path.into(), contents.into()));
        self
    }
}

impl TemplateSource for MemorySource {
    fn enumerate(&self, config: &LoaderConfig) -> Vec<SourceFile> {
        self.files
            .iter()
            .filter(|(path, _)| config.format_for(path).is_some())
            .map(|(path, bytes)| SourceFile::new(path.clone(), bytes.clone()))
            .collect()
    }
}

/// The template name of a relative file path: its components without the
/// final extension.
pub fn template_name(path: &Path) -> TemplatePath {
    let stem = path.with_extension("");
    TemplatePath::from_segments(stem.components().filter_map(|c| match c {
        Component::Normal(segment) => Some(segment.to_string_lossy().into_owned()),
        _ => None,
    }))
}

fn load_map(
    source: &dyn TemplateSource,
    config: &LoaderConfig,
    state: &RenderState,
) -> Result<TemplateMap, LoadError> {
    let mut templates = TemplateMap::new();
    let mut errors = Vec::new();

    let mut fail = |path: &Path, message: &dyn std::fmt::Display| {
        let entry = format!("{}: {}", path.display(), message);
        tracing::debug!(error = entry.as_str(), "template failed to load");
        errors.push(entry);
    };

    for file in source.enumerate(config) {
        let bytes = match file.contents {
            Ok(bytes) => bytes,
            Err(err) => {
                fail(&file.path, &err);
                continue;
            }
        };
        let Some(format) = config.format_for(&file.path) else {
            continue;
        };

        match parse(&bytes, format) {
            Ok(mut document) => {
                document.content = state.on_load_hooks().apply(document.content);
                let name = template_name(&file.path);
                tracing::debug!(template = %name, "loaded template");
                templates.insert(name, TemplateFile::new(document).with_file(file.path));
            }
            Err(err) => fail(&file.path, &err),
        }
    }

    if !errors.is_empty() {
        return Err(LoadError::Templates(errors));
    }
    tracing::info!(count = templates.len(), "loaded templates");
    Ok(templates)
}

/// Load every template from `source` into `state`.
///
/// Loaded templates are added to those already registered, replacing any
/// with the same name.
pub fn load_templates(
    source: &dyn TemplateSource,
    config: &LoaderConfig,
    state: RenderState,
) -> Result<RenderState, LoadError> {
    let loaded = load_map(source, config, &state)?;
    let mut templates = (*state.templates()).clone();
    templates.extend(loaded);
    Ok(state.with_templates(templates))
}

/// Re-read `source`, replacing `state`'s whole template set.
///
/// On failure `state` keeps its current templates.
pub fn reload_templates(
    source: &dyn TemplateSource,
    config: &LoaderConfig,
    state: &mut RenderState,
) -> Result<(), LoadError> {
    let templates = load_map(source, config, state)?;
    state.set_templates(templates);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io;
    use trellis_markup::Node;

    #[test]
    fn test_template_name_strips_extension() {
        assert_eq!(
            template_name(Path::new("blog/post.tpl")),
            TemplatePath::parse("blog/post")
        );
        assert_eq!(template_name(Path::new("index.xtpl")), TemplatePath::parse("index"));
    }

    #[test]
    fn test_format_for() {
        let config = LoaderConfig::default();
        assert_eq!(config.format_for(Path::new("a.tpl")), Some(DocumentFormat::Html));
        assert_eq!(config.format_for(Path::new("a/b.xtpl")), Some(DocumentFormat::Xml));
        assert_eq!(config.format_for(Path::new("a.html")), None);
        assert_eq!(config.format_for(Path::new("tpl")), None);
    }

    #[test]
    fn test_config_from_yaml() {
        let config: LoaderConfig = serde_yaml::from_str("html: html\n").unwrap();
        assert_eq!(config.html, "html");
        assert_eq!(config.xml, "xtpl");
    }

    #[test]
    fn test_load_from_memory() {
        let source = MemorySource::new()
            .with_file("index.tpl", "<p>home</p>")
            .with_file("feeds/atom.xtpl", "<feed/>")
            .with_file("README.md", "not a template");

        let state = load_templates(&source, &LoaderConfig::default(), RenderState::new()).unwrap();

        assert_eq!(state.template_names(), ["feeds/atom", "index"]);
        let (file, _) = state.lookup_template("feeds/atom").unwrap();
        assert_eq!(file.document.format, DocumentFormat::Xml);
        assert_eq!(file.file.as_deref(), Some(Path::new("feeds/atom.xtpl")));
    }

    #[test]
    fn test_xml_templates_are_parsed_strictly() {
        let source = MemorySource::new().with_file("bad.xtpl", "<a><b></a>");
        let err = load_templates(&source, &LoaderConfig::default(), RenderState::new()).unwrap_err();
        assert_eq!(err.messages().len(), 1);
        assert!(err.messages()[0].starts_with("bad.xtpl: "));

        // The same markup is accepted leniently as HTML.
        let source = MemorySource::new().with_file("ok.tpl", "<a><b></a>");
        assert!(load_templates(&source, &LoaderConfig::default(), RenderState::new()).is_ok());
    }

    #[test]
    fn test_on_load_hooks_run_once_per_file() {
        let source = MemorySource::new().with_file("t.tpl", "<p>x</p>");
        let state = RenderState::new().add_on_load_hook(|mut nodes| {
            nodes.push(Node::text("!"));
            nodes
        });

        let state = load_templates(&source, &LoaderConfig::default(), state).unwrap();
        let rendered = state.render_template("t").unwrap();
        assert_eq!(rendered.as_str(), Some("<p>x</p>!"));
    }

    #[test]
    fn test_unreadable_file_is_collected() {
        struct Broken;
        impl TemplateSource for Broken {
            fn enumerate(&self, _config: &LoaderConfig) -> Vec<SourceFile> {
                let denied = |what: &str| io::Error::new(io::ErrorKind::PermissionDenied, what);
                vec![
                    SourceFile::new("fine.tpl", "<p/>"),
                    SourceFile::unreadable("gone.tpl", denied("permission denied")),
                    // Unreadable directories have no template extension.
                    SourceFile::unreadable("drafts", denied("cannot list")),
                ]
            }
        }

        let err = load_templates(&Broken, &LoaderConfig::default(), RenderState::new()).unwrap_err();
        assert_eq!(
            err.messages(),
            ["gone.tpl: permission denied", "drafts: cannot list"]
        );
    }

    #[test]
    fn test_missing_root_fails_the_load() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("missing");

        let err = load_templates(
            &DirectorySource::new(&root),
            &LoaderConfig::default(),
            RenderState::new(),
        )
        .unwrap_err();

        assert_eq!(err.messages().len(), 1);
        let prefix = format!("{}: ", root.display());
        assert!(err.messages()[0].starts_with(&prefix), "{}", err.messages()[0]);
    }

    #[test]
    fn test_load_merges_and_reload_replaces() {
        let config = LoaderConfig::default();
        let state = RenderState::new().add_template("kept", trellis_markup::Document::html(vec![]));

        let source = MemorySource::new().with_file("new.tpl", "<p/>");
        let mut state = load_templates(&source, &config, state).unwrap();
        assert_eq!(state.template_names(), ["kept", "new"]);

        reload_templates(&source, &config, &mut state).unwrap();
        assert_eq!(state.template_names(), ["new"]);

        let broken = MemorySource::new().with_file("bad.xtpl", "<a>");
        assert!(reload_templates(&broken, &config, &mut state).is_err());
        assert_eq!(state.template_names(), ["new"]);
    }
}
