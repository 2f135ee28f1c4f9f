/*
 * encoding.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Character encodings supported for template input and rendered output.
//!
//! Input encoding is sniffed from a byte-order mark; without one, UTF-8 is
//! assumed. UTF-16 output always starts with a byte-order mark, which is why
//! the charset reported for it carries no endianness.

use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16BE_BOM: &[u8] = &[0xFE, 0xFF];
const UTF16LE_BOM: &[u8] = &[0xFF, 0xFE];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Utf16Be,
    Utf16Le,
}

impl Encoding {
    /// Charset name as used in a MIME type.
    pub fn charset(self) -> &'static str {
        match self {
            Encoding::Utf8 => "utf-8",
            Encoding::Utf16Be | Encoding::Utf16Le => "utf-16",
        }
    }

    /// Name as written in an XML declaration.
    pub fn declaration_name(self) -> &'static str {
        match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Utf16Be | Encoding::Utf16Le => "UTF-16",
        }
    }

    /// Encode a string, prefixing UTF-16 output with its byte-order mark.
    pub fn encode(self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Utf8 => text.as_bytes().to_vec(),
            Encoding::Utf16Be => {
                let mut out = UTF16BE_BOM.to_vec();
                out.extend(text.encode_utf16().flat_map(u16::to_be_bytes));
                out
            }
            Encoding::Utf16Le => {
                let mut out = UTF16LE_BOM.to_vec();
                out.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
                out
            }
        }
    }
}

/// Detect the encoding from a byte-order mark and decode the input.
pub fn decode(bytes: &[u8]) -> Result<(Encoding, String)> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return decode_utf8(rest).map(|s| (Encoding::Utf8, s));
    }
    if let Some(rest) = bytes.strip_prefix(UTF16BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes).map(|s| (Encoding::Utf16Be, s));
    }
    if let Some(rest) = bytes.strip_prefix(UTF16LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes).map(|s| (Encoding::Utf16Le, s));
    }
    decode_utf8(bytes).map(|s| (Encoding::Utf8, s))
}

fn decode_utf8(bytes: &[u8]) -> Result<String> {
    String::from_utf8(bytes.to_vec())
        .map_err(|err| Error::Encoding(format!("invalid UTF-8: {}", err)))
}

fn decode_utf16(bytes: &[u8], unit: fn([u8; 2]) -> u16) -> Result<String> {
    if bytes.len() % 2 != 0 {
        return Err(Error::Encoding(
            "UTF-16 input has an odd number of bytes".to_string(),
        ));
    }
    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<std::result::Result<String, _>>()
        .map_err(|err| Error::Encoding(format!("invalid UTF-16: {}", err)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_defaults_to_utf8() {
        let (enc, text) = decode(b"<p>hi</p>").unwrap();
        assert_eq!(enc, Encoding::Utf8);
        assert_eq!(text, "<p>hi</p>");
    }

    #[test]
    fn test_decode_strips_utf8_bom() {
        let (enc, text) = decode(b"\xEF\xBB\xBFabc").unwrap();
        assert_eq!(enc, Encoding::Utf8);
        assert_eq!(text, "abc");
    }

    #[test]
    fn test_utf16_both_orders() {
        for enc in [Encoding::Utf16Be, Encoding::Utf16Le] {
            let bytes = enc.encode("<a>é</a>");
            let (detected, text) = decode(&bytes).unwrap();
            assert_eq!(detected, enc);
            assert_eq!(text, "<a>é</a>");
        }
    }

    #[test]
    fn test_odd_utf16_is_error() {
        assert!(matches!(decode(&[0xFE, 0xFF, 0x00]), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_charset_has_no_endianness() {
        assert_eq!(Encoding::Utf8.charset(), "utf-8");
        assert_eq!(Encoding::Utf16Be.charset(), "utf-16");
        assert_eq!(Encoding::Utf16Le.charset(), "utf-16");
    }
}
