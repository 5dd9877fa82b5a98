//! Character decoding for document files.
//!
//! Documents are written as UTF-8. Files edited by hand on other platforms are
//! sometimes saved in a legacy single-byte encoding instead, so decoding falls
//! back to a configurable [`Charset`] before giving up.

use std::borrow::Cow;
use std::fmt;

use crate::error::StructuralError;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Windows-1252 code points for bytes 0x80..=0x9F. `None` marks the five
/// bytes the code page leaves undefined.
const WINDOWS_1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

/// A text encoding used when a file is not valid UTF-8.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Charset {
    /// No fallback: anything that is not UTF-8 is rejected.
    Utf8,
    /// The Windows western code page. Rejects its five undefined bytes.
    #[default]
    Windows1252,
    /// ISO-8859-1. Every byte decodes.
    Latin1,
}

impl Charset {
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "utf-8",
            Charset::Windows1252 => "windows-1252",
            Charset::Latin1 => "iso-8859-1",
        }
    }

    /// Decode `bytes` in this charset, failing on any unmappable byte.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            Charset::Utf8 => {
                let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
                std::str::from_utf8(bytes).ok().map(Cow::Borrowed)
            }
            Charset::Windows1252 => bytes
                .iter()
                .map(|&b| match b {
                    0x80..=0x9F => WINDOWS_1252_HIGH[(b - 0x80) as usize],
                    _ => Some(char::from(b)),
                })
                .collect::<Option<String>>()
                .map(Cow::Owned),
            Charset::Latin1 => Some(Cow::Owned(bytes.iter().map(|&b| char::from(b)).collect())),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Decode a whole file: strict UTF-8 first, then `fallback`.
pub fn decode_text(bytes: &[u8], fallback: Charset) -> Result<Cow<'_, str>, StructuralError> {
    if let Some(text) = Charset::Utf8.decode(bytes) {
        return Ok(text);
    }

    log::info!("document is not utf-8 encoded, trying {}", fallback);
    fallback
        .decode(bytes)
        .ok_or(StructuralError::InvalidCharacters { charset: fallback })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_is_borrowed() {
        let text = decode_text("name: Zoë".as_bytes(), Charset::Windows1252).unwrap();
        assert!(matches!(text, Cow::Borrowed(_)));
        assert_eq!(text, "name: Zoë");
    }

    #[test]
    fn bom_is_skipped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(b"a: 1");
        assert_eq!(decode_text(&bytes, Charset::Utf8).unwrap(), "a: 1");
    }

    #[test]
    fn windows_1252_fallback() {
        // "caf\xe9 \x80" is café € in windows-1252 and invalid utf-8.
        let text = decode_text(b"name: caf\xe9 \x80", Charset::Windows1252).unwrap();
        assert_eq!(text, "name: café €");
    }

    #[test]
    fn windows_1252_rejects_undefined_bytes() {
        let err = decode_text(b"name: \x81", Charset::Windows1252).unwrap_err();
        assert_eq!(
            err,
            StructuralError::InvalidCharacters {
                charset: Charset::Windows1252
            }
        );
    }

    #[test]
    fn latin1_accepts_everything() {
        let text = decode_text(b"\x81\x9d\xff", Charset::Latin1).unwrap();
        assert_eq!(text.chars().count(), 3);
        assert_eq!(text.chars().last(), Some('ÿ'));
    }

    #[test]
    fn utf8_only_rejects() {
        assert!(decode_text(b"\xe9", Charset::Utf8).is_err());
    }
}
