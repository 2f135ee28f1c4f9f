/*
 * config.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * trellis.yml handling
 */

//! Site configuration.
//!
//! A template root may contain a `trellis.yml`:
//!
//! ```yaml
//! extensions:
//!   html: tpl
//!   xml: xtpl
//! params:
//!   site-name: Example
//! standard-splices: true
//! ```
//!
//! Every key is optional.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;
use trellis_template::{LoaderConfig, RenderState};

/// Name of the configuration file looked up in the template root.
pub const CONFIG_FILE: &str = "trellis.yml";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct TrellisConfig {
    /// Template file extensions.
    pub extensions: LoaderConfig,
    /// Values bound as constant-text splices for every render.
    pub params: BTreeMap<String, String>,
    /// Bind `apply`, `bind` and `ignore`.
    pub standard_splices: bool,
}

impl Default for TrellisConfig {
    fn default() -> Self {
        Self {
            extensions: LoaderConfig::default(),
            params: BTreeMap::new(),
            standard_splices: true,
        }
    }
}

impl TrellisConfig {
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty file deserializes as null.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(text)?)
    }

    /// Read the configuration for `root`.
    ///
    /// An explicit path must exist. Otherwise `<root>/trellis.yml` is used if
    /// present, falling back to the defaults.
    pub fn load(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let path: PathBuf = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let candidate = root.join(CONFIG_FILE);
                if !candidate.is_file() {
                    debug!(root = %root.display(), "no configuration file; using defaults");
                    return Ok(Self::default());
                }
                candidate
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// The initial render state this configuration describes, before
    /// templates are loaded.
    pub fn render_state(&self) -> RenderState {
        let state = if self.standard_splices {
            RenderState::standard()
        } else {
            RenderState::new()
        };
        state.bind_strings(self.params.clone())
    }
}

/// Parse a `KEY=VALUE` command-line parameter.
pub fn parse_param(raw: &str) -> Result<(String, String)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Invalid parameter (expected KEY=VALUE): {}", raw))?;
    if key.is_empty() {
        anyhow::bail!("Invalid parameter (empty key): {}", raw);
    }
    Ok((key.to_string(), value.to_string()))
}
