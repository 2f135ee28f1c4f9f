/*
 * render.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Render command implementation
 */

//! Render command implementation.
//!
//! `trellis render <ROOT> <NAME>` loads every template under `ROOT`, renders
//! the template `NAME` and writes the bytes to stdout or to `--output`.
//! `-P KEY=VALUE` parameters are bound as text splices for this render only.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use trellis_template::Rendered;

use super::load_site;
use crate::config::parse_param;

/// Arguments for the render command
#[derive(Debug)]
pub struct RenderArgs {
    /// Template root directory
    pub root: PathBuf,
    /// Template name, e.g. `blog/post`
    pub name: String,
    /// Output file; stdout when absent
    pub output: Option<PathBuf>,
    /// Raw `KEY=VALUE` parameters
    pub params: Vec<String>,
    /// Explicit configuration file
    pub config: Option<PathBuf>,
}

/// Execute the render command
pub fn execute(args: RenderArgs) -> Result<()> {
    let rendered = render(&args)?;
    info!(template = %args.name, mime_type = %rendered.mime_type, "rendered");

    match &args.output {
        Some(path) => std::fs::write(path, &rendered.bytes)
            .with_context(|| format!("Failed to write output file: {}", path.display()))?,
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&rendered.bytes)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn render(args: &RenderArgs) -> Result<Rendered> {
    let params = args
        .params
        .iter()
        .map(|raw| parse_param(raw))
        .collect::<Result<Vec<_>>>()?;

    let state = load_site(&args.root, args.config.as_deref())?;
    state
        .render_with_args(&args.name, params)
        .with_context(|| format!("Template not found: {}", args.name))
}
