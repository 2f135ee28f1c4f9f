/*
 * check.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Check command implementation
 */

use std::path::PathBuf;

use anyhow::Result;
use tracing::info;

use super::load_site;

/// Arguments for the check command
#[derive(Debug)]
pub struct CheckArgs {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
}

/// Execute the check command.
///
/// Loads every template under the root; a failed load is returned as an
/// error listing each file that could not be read or parsed.
pub fn execute(args: CheckArgs) -> Result<()> {
    let state = load_site(&args.root, args.config.as_deref())?;
    info!(templates = state.template_count(), "all templates parsed");
    println!("{} templates OK", state.template_count());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_template::LoadError;

    #[test]
    fn test_check_reports_every_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("good.tpl"), "<p>ok</p>").unwrap();
        std::fs::write(dir.path().join("a.xtpl"), "<open>").unwrap();
        std::fs::write(dir.path().join("b.xtpl"), "<x></y>").unwrap();

        let err = execute(CheckArgs {
            root: dir.path().to_path_buf(),
            config: None,
        })
        .unwrap_err();

        let load_error = err.downcast_ref::<LoadError>().unwrap();
        assert_eq!(load_error.messages().len(), 2);
    }

    #[test]
    fn test_check_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let result = execute(CheckArgs {
            root: dir.path().join("missing"),
            config: None,
        });
        assert!(result.is_err());
    }
}
