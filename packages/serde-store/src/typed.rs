//! Typed reader and writer extension traits.

use serde::de::DeserializeOwned;
use serde::Serialize;

use dotconf_core::{Error, Path, Reader, Writer};

use crate::convert::{from_value, to_value};

/// Extension trait for typed reads.
///
/// This trait is automatically implemented for all `Reader` implementations.
/// It replaces hand-written encoders for compound values (locations, item
/// descriptors, ...) with a serde round-trip through the document tree.
///
/// # Example
///
/// ```rust,ignore
/// use dotconf_serde::TypedReader;
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct Spawn {
///     world: String,
///     x: f64,
///     y: f64,
///     z: f64,
/// }
///
/// let spawn: Option<Spawn> = store.read_as(&path!("spawn"))?;
/// ```
pub trait TypedReader: Reader {
    /// Read a value and deserialize it into a Rust type.
    ///
    /// Returns `Ok(None)` when the path is absent and an error when the stored
    /// value has the wrong shape.
    fn read_as<T: DeserializeOwned>(&self, from: &Path) -> Result<Option<T>, Error> {
        let Some(value) = self.read(from) else {
            return Ok(None);
        };

        let typed = from_value(value)?;
        Ok(Some(typed))
    }

    /// Read a value as a serde_json::Value.
    ///
    /// Convenience method when you don't know the exact type.
    fn read_json(&self, from: &Path) -> Result<Option<serde_json::Value>, Error> {
        self.read_as(from)
    }
}

// Blanket implementation for all Readers
impl<R: Reader + ?Sized> TypedReader for R {}

/// Extension trait for typed writes.
///
/// This trait is automatically implemented for all `Writer` implementations.
pub trait TypedWriter: Writer {
    /// Serialize a Rust type and write it at `to`.
    ///
    /// Structs become nested mappings, so individual fields stay addressable
    /// by dotted path afterwards.
    fn write_as<T: Serialize>(&self, to: &Path, data: &T) -> Result<(), Error> {
        let value = to_value(data)?;
        self.write(to, value)
    }

    /// Write a serde_json::Value.
    ///
    /// Convenience method for dynamic JSON data.
    fn write_json(&self, to: &Path, data: serde_json::Value) -> Result<(), Error> {
        self.write_as(to, &data)
    }
}

// Blanket implementation for all Writers
impl<W: Writer + ?Sized> TypedWriter for W {}
