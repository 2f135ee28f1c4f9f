/*
 * mod.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Command implementations for the trellis CLI.
//!
//! Each command loads the template root through [`load_site`] and then works
//! on the resulting render state.

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use trellis_template::{DirectorySource, RenderState, load_templates};

use crate::config::TrellisConfig;

pub mod check;
pub mod list;
pub mod render;

/// Read the configuration for `root` and load every template under it.
pub fn load_site(root: &Path, config: Option<&Path>) -> Result<RenderState> {
    if !root.is_dir() {
        anyhow::bail!("Template root is not a directory: {}", root.display());
    }

    let config = TrellisConfig::load(root, config)?;
    let source = DirectorySource::new(root);
    let state = load_templates(&source, &config.extensions, config.render_state())
        .with_context(|| format!("Failed to load templates from {}", root.display()))?;

    info!(
        root = %root.display(),
        templates = state.template_count(),
        "loaded site"
    );
    Ok(state)
}
