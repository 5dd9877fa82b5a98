//! Serde integration for dotconf
//!
//! This layer provides the concrete document grammars and typed access:
//! - `YamlCodec` / `JsonCodec`: codecs for the on-disk formats
//! - `MultiCodec`: routes by `Format`
//! - `TypedReader` / `TypedWriter`: read and write Rust types at a path
//! - Value <-> serde conversions
//!
//! # Example
//!
//! ```rust
//! use dotconf_serde::YamlCodec;
//! use dotconf_core::{decode_document, path, Charset, Format, Value};
//!
//! let doc = decode_document(b"spawn:\n  world: hub\n", Charset::default(), &YamlCodec, &Format::YAML)
//!     .unwrap();
//! assert_eq!(doc.get(&path!("spawn.world")), Some(&Value::from("hub")));
//! ```

mod codec;
mod convert;
mod typed;

pub use codec::{JsonCodec, MultiCodec, YamlCodec};
pub use convert::{
    first_non_finite, from_value, json_to_value, to_value, value_to_json, value_to_yaml,
    yaml_to_value,
};
pub use typed::{TypedReader, TypedWriter};

// Re-export core types for convenience
pub use dotconf_core::{Codec, Error, Format, Path, Reader, Value, Writer};
