/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

use thiserror::Error;

/// Failure to build a template registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// One or more template files could not be read or parsed. Each message
    /// has the form `<path>: <reason>`.
    #[error("failed to load {} template(s):\n  {}", .0.len(), .0.join("\n  "))]
    Templates(Vec<String>),
}

/// Why a template source could not produce a file's bytes.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),
}

impl LoadError {
    /// The individual per-file messages.
    pub fn messages(&self) -> &[String] {
        match self {
            LoadError::Templates(messages) => messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_lists_every_file() {
        let err = LoadError::Templates(vec![
            "a.tpl: syntax error: bad".to_string(),
            "b/c.xtpl: unexpected end of input".to_string(),
        ]);
        assert_eq!(
            err.to_string(),
            "failed to load 2 template(s):\n  a.tpl: syntax error: bad\n  b/c.xtpl: unexpected end of input"
        );
        assert_eq!(err.messages().len(), 2);
    }

    #[test]
    fn test_source_error_displays_the_io_error() {
        let err = SourceError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "permission denied",
        ));
        assert_eq!(err.to_string(), "permission denied");
        assert!(matches!(err, SourceError::Io(_)));
    }
}
