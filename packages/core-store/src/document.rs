//! The bytes-to-document pipeline.

use crate::charset::{decode_text, Charset};
use crate::{Codec, Error, Format, Value};

/// A file whose first byte is NUL is treated as definitively broken.
///
/// Such files are typically left behind by a crash mid-write on filesystems
/// that zero-fill preallocated blocks.
pub fn is_corrupt(bytes: &[u8]) -> bool {
    bytes.first() == Some(&0)
}

/// Decode raw file contents into a document root.
///
/// Text decoding tries strict UTF-8 and then `fallback`; both failing is
/// [`StructuralError::InvalidCharacters`](crate::StructuralError). The text is
/// then parsed with `codec`. An empty document is an empty mapping; any other
/// top-level node that is not a mapping is
/// [`StructuralError::MalformedDocument`](crate::StructuralError).
pub fn decode_document(
    bytes: &[u8],
    fallback: Charset,
    codec: &dyn Codec,
    format: &Format,
) -> Result<Value, Error> {
    if !codec.supports(format) {
        return Err(Error::UnsupportedFormat(format.clone()));
    }

    let text = decode_text(bytes, fallback)?;
    if text.trim().is_empty() {
        return Ok(Value::mapping());
    }

    match codec.decode(&text, format)? {
        Value::Null => Ok(Value::mapping()),
        root @ Value::Mapping(_) => Ok(root),
        other => Err(Error::malformed(
            format,
            format!("top level is a {}, not a mapping", other.kind()),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{path, StructuralError};

    /// `key=value` lines; anything else is malformed.
    struct LineCodec;

    impl Codec for LineCodec {
        fn decode(&self, text: &str, format: &Format) -> Result<Value, Error> {
            if text.trim() == "scalar" {
                return Ok(Value::from("scalar"));
            }
            let mut root = Value::mapping();
            for line in text.lines() {
                let (k, v) = line
                    .split_once('=')
                    .ok_or_else(|| Error::malformed(format, "expected key=value"))?;
                root.set(&path!(k), Value::from(v))?;
            }
            Ok(root)
        }

        fn encode(&self, _value: &Value, _format: &Format) -> Result<String, Error> {
            Ok(String::new())
        }

        fn supports(&self, format: &Format) -> bool {
            format.as_str() == "text/x-lines"
        }
    }

    const LINES: Format = Format::from_static("text/x-lines");

    #[test]
    fn corrupt_detection() {
        assert!(is_corrupt(&[0x00, 0x61, 0x62]));
        assert!(!is_corrupt(b"a=b"));
        assert!(!is_corrupt(&[]));
    }

    #[test]
    fn decodes_utf8() {
        let root = decode_document("name=Zoë".as_bytes(), Charset::default(), &LineCodec, &LINES)
            .unwrap();
        assert_eq!(root.get(&path!("name")), Some(&Value::from("Zoë")));
    }

    #[test]
    fn decodes_with_fallback() {
        let root = decode_document(b"name=Zo\xeb", Charset::Windows1252, &LineCodec, &LINES)
            .unwrap();
        assert_eq!(root.get(&path!("name")), Some(&Value::from("Zoë")));
    }

    #[test]
    fn invalid_characters_are_structural() {
        let err = decode_document(b"name=\x8d", Charset::Windows1252, &LineCodec, &LINES)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::InvalidCharacters { .. })
        ));
    }

    #[test]
    fn grammar_errors_are_structural() {
        let err = decode_document(b"no equals sign", Charset::default(), &LineCodec, &LINES)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::MalformedDocument { .. })
        ));
    }

    #[test]
    fn empty_is_empty_mapping() {
        let root = decode_document(b"  \n", Charset::default(), &LineCodec, &LINES).unwrap();
        assert_eq!(root, Value::mapping());
    }

    #[test]
    fn scalar_root_is_malformed() {
        let err = decode_document(b"scalar", Charset::default(), &LineCodec, &LINES).unwrap_err();
        assert!(err.to_string().contains("not a mapping"));
    }

    #[test]
    fn unsupported_format() {
        let err = decode_document(b"a=b", Charset::default(), &LineCodec, &Format::JSON)
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
    }
}
