/*
 * list.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * List command implementation
 */

use std::path::PathBuf;

use anyhow::Result;

use super::load_site;

/// Arguments for the list command
#[derive(Debug)]
pub struct ListArgs {
    pub root: PathBuf,
    pub config: Option<PathBuf>,
}

/// Execute the list command: print every template name, sorted.
pub fn execute(args: ListArgs) -> Result<()> {
    for name in template_names(&args)? {
        println!("{}", name);
    }
    Ok(())
}

fn template_names(args: &ListArgs) -> Result<Vec<String>> {
    let state = load_site(&args.root, args.config.as_deref())?;
    Ok(state.template_names())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lists_nested_templates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("blog")).unwrap();
        std::fs::write(dir.path().join("index.tpl"), "<p/>").unwrap();
        std::fs::write(dir.path().join("blog/post.tpl"), "<p/>").unwrap();
        std::fs::write(dir.path().join("trellis.yml"), "params: {}\n").unwrap();

        let args = ListArgs {
            root: dir.path().to_path_buf(),
            config: None,
        };
        assert_eq!(template_names(&args).unwrap(), ["blog/post", "index"]);
    }

    #[test]
    fn test_custom_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<p/>").unwrap();
        std::fs::write(dir.path().join("other.tpl"), "<p/>").unwrap();
        std::fs::write(dir.path().join("trellis.yml"), "extensions:\n  html: html\n").unwrap();

        let args = ListArgs {
            root: dir.path().to_path_buf(),
            config: None,
        };
        assert_eq!(template_names(&args).unwrap(), ["index"]);
    }
}
