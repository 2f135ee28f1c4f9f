/*
 * error.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Error types for markup parsing.

use thiserror::Error;

/// Result type alias for trellis-markup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing a template file.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Syntax error reported by quick-xml.
    #[error("syntax error: {message}")]
    Syntax {
        message: String,
        /// Byte offset where the error occurred.
        position: Option<u64>,
    },

    /// Unexpected end of input (XML only; HTML closes open elements implicitly).
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: String },

    /// Mismatched end tag (XML only).
    #[error("mismatched end tag: expected </{expected}>, found </{found}>")]
    MismatchedEndTag { expected: String, found: String },

    /// End tag with no open element (XML only).
    #[error("unexpected closing tag </{0}>")]
    UnexpectedEndTag(String),

    /// Input bytes could not be decoded.
    #[error("encoding error: {0}")]
    Encoding(String),
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::Syntax {
            message: err.to_string(),
            position: None,
        }
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::Syntax {
            message: format!("attribute error: {}", err),
            position: None,
        }
    }
}
