/*
 * attr.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `$(name)` substitution inside attribute values.
//!
//! An attribute value is a run of tokens, each either literal text or a
//! placeholder `$(name)`. In literal text `\X` stands for `X`, and a `$` that
//! does not open a placeholder is an ordinary character. A value that fails
//! to parse (an unterminated placeholder, a trailing backslash) substitutes
//! to the empty string instead of failing the render.

use trellis_markup::Node;

/// One token of a parsed attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrToken {
    Literal(String),
    Ident(String),
}

/// Parse an attribute value into tokens.
///
/// Returns `None` on malformed input. The empty string has no tokens and is
/// also malformed.
pub fn parse_attribute_value(raw: &str) -> Option<Vec<AttrToken>> {
    let mut tokens = Vec::new();
    let mut literal = String::new();
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => literal.push(chars.next()?),
            '$' if chars.peek() == Some(&'(') => {
                chars.next();
                let mut ident = String::new();
                loop {
                    match chars.next()? {
                        ')' => break,
                        c => ident.push(c),
                    }
                }
                if !literal.is_empty() {
                    tokens.push(AttrToken::Literal(std::mem::take(&mut literal)));
                }
                tokens.push(AttrToken::Ident(ident));
            }
            c => literal.push(c),
        }
    }

    if !literal.is_empty() {
        tokens.push(AttrToken::Literal(literal));
    }
    if tokens.is_empty() { None } else { Some(tokens) }
}

/// Substitute placeholders in `raw`, resolving each name with `lookup`.
///
/// Each placeholder contributes the text content of the nodes `lookup`
/// returns (markup is flattened, never embedded); an unbound name contributes
/// nothing. Values without a `$(` are returned verbatim.
pub fn substitute<F>(raw: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<Vec<Node>>,
{
    if !raw.contains("$(") {
        return raw.to_string();
    }

    let Some(tokens) = parse_attribute_value(raw) else {
        tracing::warn!(value = raw, "malformed attribute substitution; using empty value");
        return String::new();
    };

    let mut out = String::new();
    for token in tokens {
        match token {
            AttrToken::Literal(text) => out.push_str(&text),
            AttrToken::Ident(name) => {
                if let Some(nodes) = lookup(&name) {
                    for node in &nodes {
                        out.push_str(&node.text_content());
                    }
                }
            }
        }
    }
    out
}
