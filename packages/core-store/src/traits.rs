//! Core traits: Reader, Writer, Codec.

use crate::{Error, Format, Path, Value};

/// Read values from dotted paths.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Reader>`.
pub trait Reader {
    /// Read a value from a path.
    ///
    /// Returns `None` when nothing is stored at the path. The returned value
    /// is an owned copy.
    fn read(&self, from: &Path) -> Option<Value>;
}

/// Write values to dotted paths.
///
/// Writers take `&self`: implementations are expected to synchronize
/// internally so a single handle can be shared between threads.
pub trait Writer {
    /// Write `value` at `to`, creating intermediate mappings.
    ///
    /// Writing [`Value::Null`] removes the path.
    fn write(&self, to: &Path, value: Value) -> Result<(), Error>;
}

impl Reader for Value {
    fn read(&self, from: &Path) -> Option<Value> {
        self.get(from).cloned()
    }
}

/// Codec for converting between [`Value`] and document text.
///
/// Codecs only deal with the grammar. Character decoding happens before
/// `decode` is called (see [`crate::decode_document`]), and the caller writes
/// the encoded text out as UTF-8.
///
/// # Implementing Custom Codecs
///
/// ```rust
/// use dotconf_core::{Codec, Error, Format, Value};
///
/// struct KeyValueCodec;
///
/// impl Codec for KeyValueCodec {
///     fn decode(&self, text: &str, format: &Format) -> Result<Value, Error> {
///         let mut root = Value::mapping();
///         for line in text.lines().filter(|l| !l.trim().is_empty()) {
///             let (key, value) = line
///                 .split_once('=')
///                 .ok_or_else(|| Error::malformed(format, format!("no '=' in {:?}", line)))?;
///             root.set(&key.trim().into(), Value::from(value.trim()))?;
///         }
///         Ok(root)
///     }
///
///     fn encode(&self, value: &Value, _format: &Format) -> Result<String, Error> {
///         Ok(value
///             .values(true)
///             .into_iter()
///             .filter_map(|(k, v)| v.to_text().map(|t| format!("{}={}\n", k, t)))
///             .collect())
///     }
///
///     fn supports(&self, format: &Format) -> bool {
///         format.as_str() == "text/x-properties"
///     }
/// }
/// ```
pub trait Codec: Send + Sync {
    /// Parse document text into a Value.
    ///
    /// Grammar failures must be reported as
    /// [`StructuralError::MalformedDocument`](crate::StructuralError).
    fn decode(&self, text: &str, format: &Format) -> Result<Value, Error>;

    /// Serialize a Value into document text, preserving mapping order.
    fn encode(&self, value: &Value, format: &Format) -> Result<String, Error>;

    /// Check if this codec supports a format.
    fn supports(&self, format: &Format) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn value_is_a_reader() {
        let mut doc = Value::mapping();
        doc.set(&path!("a.b"), Value::from(1i64)).unwrap();
        let reader: &dyn Reader = &doc;
        assert_eq!(reader.read(&path!("a.b")), Some(Value::from(1i64)));
        assert_eq!(reader.read(&path!("a.c")), None);
    }
}
