//! dotconf core: the document layer
//!
//! This crate defines what a configuration document *is*, independent of
//! where it is stored:
//! - `Path`: dotted address into a document (`server.motd.lines`)
//! - `Value`: the document tree of mappings, sequences and scalars
//! - `Codec` / `Format`: the grammar a document is written in
//! - `Charset` / `decode_document`: bytes to tree, with encoding fallback
//! - `to_decimal`: exact decimal coercion
//!
//! # Example
//!
//! ```rust
//! use dotconf_core::{path, Value};
//!
//! let mut doc = Value::mapping();
//! doc.set(&path!("economy.currency"), Value::from("$")).unwrap();
//! assert_eq!(doc.get(&path!("economy.currency")).and_then(Value::as_str), Some("$"));
//! ```

pub use bigdecimal::BigDecimal;
pub use indexmap::IndexMap;

mod charset;
mod decimal;
mod document;
mod error;
mod format;
mod path;
mod traits;
mod value;

pub use charset::{decode_text, Charset};
pub use decimal::{to_decimal, DECIMAL128_PRECISION};
pub use document::{decode_document, is_corrupt};
pub use error::{Error, StructuralError};
pub use format::Format;
pub use path::{Path, PathError, SEPARATOR};
pub use traits::{Codec, Reader, Writer};
pub use value::{Mapping, Value};
